use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::services::storage::Storage;

const LAST_LOCATION_KEY: &str = "lastLocation";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl std::str::FromStr for Coordinates {
    type Err = String;

    /// `"lat,lon"` in decimal degrees.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
        let axis = |v: &str, max: f64| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.abs() <= max)
                .ok_or_else(|| format!("invalid coordinate {v:?}"))
        };
        Ok(Coordinates {
            latitude: axis(lat, 90.0)?,
            longitude: axis(lon, 180.0)?,
        })
    }
}

/// Remembers the last position reported by the device.
#[derive(Clone)]
pub struct LocationStore {
    storage: Arc<Storage>,
}

impl LocationStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn remember(&self, coords: Coordinates) -> Result<()> {
        self.storage.put(LAST_LOCATION_KEY, coords).await
    }

    pub async fn last_known(&self) -> Option<Coordinates> {
        self.storage.get_as(LAST_LOCATION_KEY).await
    }

    /// A fresh fix when available, otherwise the stored one.
    pub async fn best_effort(&self, fresh: Option<Coordinates>) -> Result<Option<Coordinates>> {
        match fresh {
            Some(c) => {
                self.remember(c).await?;
                Ok(Some(c))
            }
            None => Ok(self.last_known().await),
        }
    }
}
