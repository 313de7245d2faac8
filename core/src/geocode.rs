use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use api_types::Address;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::location::Coordinates;

pub const DEFAULT_GEOCODING_URL: &str = "https://api-adresse.data.gouv.fr";
pub const DEFAULT_LIMIT: u32 = 5;
pub const MIN_QUERY_LEN: usize = 3;
pub const DEBOUNCE: Duration = Duration::from_millis(300);

const EARTH_RADIUS_KM: f64 = 6371.0;

/// One candidate address returned by the geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressSuggestion {
    pub label: String,
    /// House number and street name, e.g. "8 Boulevard du Port".
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressSuggestion {
    /// Split the leading house number off the street line.
    pub fn to_address(&self) -> Address {
        let (number, street) = match self.street.split_once(' ') {
            Some((number, rest)) => (number.to_string(), rest.to_string()),
            None => (self.street.clone(), String::new()),
        };
        Address {
            number,
            street,
            city: self.city.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Properties {
    label: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    postcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[longitude, latitude]`
    coordinates: [f64; 2],
}

impl From<Feature> for AddressSuggestion {
    fn from(f: Feature) -> Self {
        let [longitude, latitude] = f.geometry.coordinates;
        AddressSuggestion {
            label: f.properties.label,
            street: f.properties.name.unwrap_or_default(),
            city: f.properties.city.unwrap_or_default(),
            postal_code: f.properties.postcode.unwrap_or_default(),
            country: "France".to_string(),
            latitude,
            longitude,
        }
    }
}

/// Client for the public address search service.
#[derive(Clone, Debug)]
pub struct GeocodingClient {
    base_url: String,
    limit: u32,
    http: reqwest::Client,
}

impl GeocodingClient {
    pub fn new(base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
            http: reqwest::Client::new(),
        }
    }

    /// Suggestions for a free-text address, biased towards `near` when known.
    /// Queries too short to be useful return nothing without a request.
    pub async fn search(
        &self,
        query: &str,
        near: Option<Coordinates>,
    ) -> Result<Vec<AddressSuggestion>> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }
        let mut params = vec![
            ("q", query.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(c) = near {
            params.push(("lat", c.latitude.to_string()));
            params.push(("lon", c.longitude.to_string()));
        }
        let url = format!("{}/search/", self.base_url);
        debug!(%url, %query, "geocoding");
        let resp = self.http.get(url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "geocoding failed");
            return Err(ClientError::Http {
                status,
                message: "address search failed".into(),
            });
        }
        let collection: FeatureCollection = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(collection.features.into_iter().map(Into::into).collect())
    }
}

/// Debounced search-as-you-type. Each keystroke calls [`Autocomplete::query`];
/// only the last one within the debounce window reaches the geocoder, and a
/// response that arrives after a newer keystroke is dropped.
pub struct Autocomplete {
    client: GeocodingClient,
    delay: Duration,
    latest: AtomicU64,
}

impl Autocomplete {
    pub fn new(client: GeocodingClient) -> Self {
        Self::with_delay(client, DEBOUNCE)
    }

    pub fn with_delay(client: GeocodingClient, delay: Duration) -> Self {
        Self {
            client,
            delay,
            latest: AtomicU64::new(0),
        }
    }

    /// `Ok(None)` when this keystroke was superseded.
    pub async fn query(
        &self,
        text: &str,
        near: Option<Coordinates>,
    ) -> Result<Option<Vec<AddressSuggestion>>> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            debug!(%text, "superseded before sending");
            return Ok(None);
        }
        let suggestions = self.client.search(text, near).await?;
        if self.latest.load(Ordering::SeqCst) != ticket {
            debug!(%text, "superseded while in flight");
            return Ok(None);
        }
        Ok(Some(suggestions))
    }
}

/// Great-circle distance in kilometres.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
