use api_types::{Conversation, MessageReaction, PrivateMessage, ReactionRequest, ReactionType};
use serde_json::json;

use crate::error::Result;
use crate::http::{encode_query, ApiClient};

pub async fn get(api: &ApiClient, id: &str) -> Result<Conversation> {
    api.get(&format!("/conversations/{id}")).await
}

/// The conversation shared with `friend_id`, if one exists.
pub async fn find_with(api: &ApiClient, friend_id: &str) -> Result<Option<Conversation>> {
    let path = format!("/conversations?friendId={}", encode_query(friend_id));
    match api.get::<Option<Conversation>>(&path).await {
        Err(e) if e.is_not_found() => Ok(None),
        other => other,
    }
}

pub async fn create_with(api: &ApiClient, friend_id: &str) -> Result<Conversation> {
    api.post_empty(&format!(
        "/conversations?friendId={}",
        encode_query(friend_id)
    ))
    .await
}

pub async fn push_message(
    api: &ApiClient,
    conversation_id: &str,
    message: &str,
) -> Result<PrivateMessage> {
    api.post(
        &format!("/conversations/{conversation_id}/messages"),
        &json!({ "message": message }),
    )
    .await
}

pub async fn update_message(api: &ApiClient, message_id: &str, content: &str) -> Result<PrivateMessage> {
    api.put(
        &format!("/conversations/messages/{message_id}"),
        &json!({ "content": content }),
    )
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
    api.post("/private-message-reactions", &body).await
}

pub async fn update_reaction(
    api: &ApiClient,
    reaction_id: &str,
    kind: ReactionType,
) -> Result<MessageReaction> {
    api.put(
        &format!("/private-message-reactions/{reaction_id}"),
        &json!({ "type": kind }),
    )
    .await
}

pub async fn remove_reaction(api: &ApiClient, reaction_id: &str) -> Result<()> {
    api.delete(&format!("/private-message-reactions/{reaction_id}"))
        .await
}
