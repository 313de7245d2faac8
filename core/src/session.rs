use std::sync::Arc;

use api_types::Role;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::services::storage::Storage;

const TOKEN_KEY: &str = "token";

/// Identity claims carried by the backend's bearer token.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
}

/// Decode the claims of a token without checking its signature. The client
/// never holds the signing key; the server stays the authority.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// An authenticated caller, passed explicitly to everything that needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub claims: Claims,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self { token, claims })
    }

    pub fn user_id(&self) -> &str {
        &self.claims.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.claims.role == Role::Admin
    }

    /// Tokens without an `exp` claim never expire locally.
    pub fn is_expired(&self) -> bool {
        self.claims.exp > 0 && self.claims.exp <= OffsetDateTime::now_utc().unix_timestamp()
    }

    /// Whether the token expires within the given window.
    pub fn needs_refresh(&self, within: Duration) -> bool {
        match OffsetDateTime::from_unix_timestamp(self.claims.exp) {
            Ok(expire) if self.claims.exp > 0 => expire - OffsetDateTime::now_utc() < within,
            _ => false,
        }
    }
}

/// Persists the bearer token in the local key-value store.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn save_token(&self, token: &str) -> Result<()> {
        self.storage.put(TOKEN_KEY, token).await
    }

    pub async fn load_token(&self) -> Option<String> {
        self.storage
            .get_as::<String>(TOKEN_KEY)
            .await
            .filter(|t| !t.trim().is_empty())
    }

    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(TOKEN_KEY).await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.load_token().await.is_some()
    }

    /// The stored session, decoded. Missing tokens are `Unauthenticated`.
    pub async fn current(&self) -> Result<Session> {
        let token = self.load_token().await.ok_or(ClientError::Unauthenticated)?;
        let session = Session::from_token(token)?;
        if session.is_expired() {
            debug!(user = %session.user_id(), "stored token is expired");
        }
        Ok(session)
    }
}
