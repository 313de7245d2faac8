use api_types::{Message, MessageReaction, MessageRequest, ReactionRequest, ReactionType};
use serde_json::json;

use crate::error::Result;
use crate::http::ApiClient;

pub async fn get(api: &ApiClient, id: &str) -> Result<Message> {
    api.get(&format!("/messages/{id}")).await
}

/// Messages of an event's chat, in whatever order the server returns them.
pub async fn for_event(api: &ApiClient, event_id: &str) -> Result<Vec<Message>> {
    api.get(&format!("/messages/event/{event_id}")).await
}

pub async fn create(api: &ApiClient, message: &MessageRequest) -> Result<Message> {
    api.post("/messages", message).await
}

pub async fn update(api: &ApiClient, id: &str, content: &str) -> Result<Message> {
    api.put(&format!("/messages/{id}"), &json!({ "content": content }))
        .await
}

pub async fn add_reaction(
    api: &ApiClient,
    message_id: &str,
    user_id: &str,
    kind: ReactionType,
) -> Result<MessageReaction> {
    let body = ReactionRequest {
        message_id: message_id.into(),
        user_id: user_id.into(),
        kind,
    };
    api.post("/message-reactions", &body).await
}

pub async fn update_reaction(
    api: &ApiClient,
    reaction_id: &str,
    kind: ReactionType,
) -> Result<MessageReaction> {
    api.put(
        &format!("/message-reactions/{reaction_id}"),
        &json!({ "type": kind }),
    )
    .await
}

pub async fn remove_reaction(api: &ApiClient, reaction_id: &str) -> Result<()> {
    api.delete(&format!("/message-reactions/{reaction_id}"))
        .await
}
