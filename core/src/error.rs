use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors surfaced by the client library. Nothing here is retried; callers
/// report the failure and let the user re-submit.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server responded {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("not allowed: {0}")]
    Forbidden(String),
    #[error("not logged in")]
    Unauthenticated,
    #[error("invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("{0} is not configured")]
    NotConfigured(String),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    /// True for server-side 404s and client-side lookup misses alike.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Http { status, .. } => *status == StatusCode::NOT_FOUND,
            ClientError::NotFound(_) => true,
            _ => false,
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        ClientError::Validation(errors)
    }
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
