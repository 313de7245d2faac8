use api_types::{Event, EventRequest, EventType};

use crate::error::Result;
use crate::http::ApiClient;

pub async fn list(api: &ApiClient) -> Result<Vec<Event>> {
    api.get("/events").await
}

pub async fn get(api: &ApiClient, id: &str) -> Result<Event> {
    api.get(&format!("/events/{id}")).await
}

pub async fn create(api: &ApiClient, event: &EventRequest) -> Result<Event> {
    api.post("/events", event).await
}

pub async fn update(api: &ApiClient, id: &str, event: &EventRequest) -> Result<Event> {
    api.put(&format!("/events/{id}"), event).await
}

pub async fn delete(api: &ApiClient, id: &str) -> Result<()> {
    api.delete(&format!("/events/{id}")).await
}

pub async fn participate(api: &ApiClient, event_id: &str, user_id: &str) -> Result<()> {
    api.post_unit(
        &format!("/events/{user_id}/participate/{event_id}"),
        None::<&()>,
    )
    .await
}

pub async fn leave(api: &ApiClient, event_id: &str, user_id: &str) -> Result<()> {
    api.delete(&format!("/events/{user_id}/participate/{event_id}"))
        .await
}

/// Events whose category is one of `types`. An empty selection matches
/// nothing, so no request is made.
pub async fn list_by_types(api: &ApiClient, types: &[EventType]) -> Result<Vec<Event>> {
    if types.is_empty() {
        return Ok(Vec::new());
    }
    Ok(of_types(list(api).await?, types))
}

pub fn of_types(events: Vec<Event>, types: &[EventType]) -> Vec<Event> {
    events
        .into_iter()
        .filter(|e| types.contains(&e.kind))
        .collect()
}
