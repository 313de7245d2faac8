use api_types::{FriendRequest, User};
use serde_json::json;

use crate::error::Result;
use crate::http::ApiClient;
use crate::session::Session;

/// The caller's own profile, located through the token's user id.
pub async fn profile(api: &ApiClient, session: &Session) -> Result<User> {
    get(api, session.user_id()).await
}

pub async fn get(api: &ApiClient, id: &str) -> Result<User> {
    api.get(&format!("/users/{id}")).await
}

pub async fn friends(api: &ApiClient) -> Result<Vec<User>> {
    api.get("/users/friends").await
}

pub async fn remove_friend(api: &ApiClient, friend_id: &str) -> Result<()> {
    api.delete(&format!("/users/friends/{friend_id}")).await
}

pub async fn send_request(api: &ApiClient, friend_id: &str) -> Result<()> {
    api.post_unit(
        "/users/friend-requests/send",
        Some(&json!({ "friendId": friend_id })),
    )
    .await
}

/// Requests other users sent to the caller.
pub async fn received_requests(api: &ApiClient) -> Result<Vec<FriendRequest>> {
    api.get("/users/friend-requests/received").await
}

/// Requests the caller sent that are still pending.
pub async fn sent_requests(api: &ApiClient) -> Result<Vec<FriendRequest>> {
    api.get("/users/friend-requests/sent").await
}

pub async fn accept_request(api: &ApiClient, request_id: &str) -> Result<()> {
    request_action(api, "accept", request_id).await
}

pub async fn decline_request(api: &ApiClient, request_id: &str) -> Result<()> {
    request_action(api, "decline", request_id).await
}

pub async fn cancel_request(api: &ApiClient, request_id: &str) -> Result<()> {
    request_action(api, "cancel", request_id).await
}

async fn request_action(api: &ApiClient, action: &str, request_id: &str) -> Result<()> {
    api.post_unit(
        &format!("/users/friend-requests/{action}"),
        Some(&json!({ "requestId": request_id })),
    )
    .await
}
