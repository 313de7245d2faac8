use reqwest::{header, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::session::Session;

/// Thin authenticated wrapper over the backend's JSON API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// A copy of this client that authenticates as `session`.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            token: Some(session.token.clone()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, path: &str) -> (RequestBuilder, String) {
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, %request_id, "api request");
        let mut req = self
            .http
            .request(method, url)
            .header("x-request-id", &request_id);
        if let Some(token) = &self.token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        (req, request_id)
    }

    async fn send(&self, req: RequestBuilder, request_id: &str) -> Result<Response> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        warn!(%status, %request_id, %message, "api request failed");
        Err(ClientError::Http { status, message })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T> {
        let (mut req, request_id) = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = self.send(req, &request_id).await?;
        let bytes = resp.bytes().await?;
        // an empty body reads as `null` so `Option<T>` callers see `None`
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like `call` but ignores whatever the server sends back.
    async fn call_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<()> {
        let (mut req, request_id) = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        self.send(req, &request_id).await?;
        Ok(())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(Method::GET, path, None::<&Value>).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T> {
        self.call(Method::POST, path, Some(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(Method::POST, path, None::<&Value>).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T> {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn post_unit(&self, path: &str, body: Option<&(impl Serialize + ?Sized)>) -> Result<()> {
        self.call_unit(Method::POST, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.call_unit(Method::DELETE, path, None::<&Value>).await
    }
}

/// Pull a human message out of an error body, if the server sent one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Percent-encode a single query value.
pub(crate) fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
