use api_types::{LoginCredentials, LoginResponse, RegisterCredentials};
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::http::ApiClient;
use crate::session::{Session, SessionStore};
use crate::validation::validate_registration;

/// Log in and persist the returned token.
pub async fn login(
    api: &ApiClient,
    store: &SessionStore,
    credentials: &LoginCredentials,
) -> Result<Session> {
    let resp: LoginResponse = api.post("/auth/login", credentials).await?;
    let session = Session::from_token(resp.token())?;
    store.save_token(&session.token).await?;
    info!(user = %session.user_id(), "logged in");
    Ok(session)
}

/// Create an account. The form is validated locally before any request.
pub async fn register(api: &ApiClient, form: &RegisterCredentials) -> Result<Value> {
    validate_registration(form)?;
    let created: Value = api.post("/auth/register", form).await?;
    info!(email = %form.email, "account registered");
    Ok(created)
}

pub async fn logout(store: &SessionStore) -> Result<()> {
    store.clear().await
}
