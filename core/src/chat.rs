use std::fmt;

use api_types::{
    Conversation, Message, MessageReaction, MessageRequest, PrivateMessage, ReactionType,
    UserSummary,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::api::{conversations, messages};
use crate::cache::{QueryCache, QueryKey};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::session::Session;

/// Common view over event messages and private messages.
pub trait ChatEntry {
    fn id(&self) -> &str;
    fn author_id(&self) -> &str;
    fn content(&self) -> &str;
    fn created_at(&self) -> OffsetDateTime;
    fn reactions(&self) -> &[MessageReaction];

    fn is_from(&self, session: &Session) -> bool {
        self.author_id() == session.user_id()
    }

    fn reaction_summary(&self) -> ReactionSummary {
        ReactionSummary::of(self.reactions())
    }
}

impl ChatEntry for Message {
    fn id(&self) -> &str {
        &self.id
    }
    fn author_id(&self) -> &str {
        &self.user_id
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
    fn reactions(&self) -> &[MessageReaction] {
        &self.reactions
    }
}

impl ChatEntry for PrivateMessage {
    fn id(&self) -> &str {
        &self.id
    }
    fn author_id(&self) -> &str {
        &self.sender_id
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
    fn reactions(&self) -> &[MessageReaction] {
        &self.reactions
    }
}

/// Oldest first. The server's order is never trusted; ties keep their
/// relative order.
pub fn sort_chronologically<M: ChatEntry>(thread: &mut [M]) {
    thread.sort_by_key(|m| m.created_at());
}

/// Compact reaction display: one glyph per distinct type, in order of first
/// appearance, plus the number of reactions those glyphs do not account for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReactionSummary {
    pub kinds: Vec<ReactionType>,
    pub overflow: usize,
}

impl ReactionSummary {
    pub fn of(reactions: &[MessageReaction]) -> Self {
        let mut kinds = Vec::with_capacity(ReactionType::ALL.len());
        for r in reactions {
            if !kinds.contains(&r.kind) {
                kinds.push(r.kind);
            }
        }
        let overflow = reactions.len() - kinds.len();
        Self { kinds, overflow }
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn total(&self) -> usize {
        self.kinds.len() + self.overflow
    }
}

impl fmt::Display for ReactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in &self.kinds {
            f.write_str(kind.glyph())?;
        }
        if self.overflow > 0 {
            write!(f, " +{}", self.overflow)?;
        }
        Ok(())
    }
}

/// One line per reactor, as listed when the summary is tapped.
pub fn reaction_details(reactions: &[MessageReaction]) -> Vec<(String, &'static str)> {
    reactions
        .iter()
        .map(|r| {
            let who = r
                .sender
                .as_ref()
                .map(|s| s.short_name())
                .unwrap_or_else(|| r.user_id.clone());
            (who, r.kind.glyph())
        })
        .collect()
}

/// Text being typed. It is only cleared once the server accepted it, so a
/// failed send leaves it in place for another attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    text: String,
}

impl Draft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn clear(&mut self) {
        self.text.clear();
    }
}

fn ensure_author<M: ChatEntry>(message: &M, session: &Session) -> Result<()> {
    if message.is_from(session) {
        Ok(())
    } else {
        Err(ClientError::Forbidden(format!(
            "message {} belongs to another user",
            message.id()
        )))
    }
}

fn ensure_sendable(draft: &Draft) -> Result<()> {
    if draft.is_blank() {
        let mut errors = crate::validation::ValidationErrors::new();
        errors.add("content", "is required");
        return Err(errors.into());
    }
    Ok(())
}

/// Group chat attached to an event.
pub struct EventChat<'a> {
    api: &'a ApiClient,
    cache: &'a QueryCache,
    session: &'a Session,
    event_id: String,
}

impl<'a> EventChat<'a> {
    pub fn new(
        api: &'a ApiClient,
        cache: &'a QueryCache,
        session: &'a Session,
        event_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            cache,
            session,
            event_id: event_id.into(),
        }
    }

    fn key(&self) -> QueryKey {
        QueryKey::EventMessages(self.event_id.clone())
    }

    /// The thread, oldest first.
    pub async fn thread(&self) -> Result<Vec<Message>> {
        let mut thread = self
            .cache
            .fetch(self.key(), || messages::for_event(self.api, &self.event_id))
            .await?;
        sort_chronologically(&mut thread);
        Ok(thread)
    }

    pub async fn send(&self, draft: &mut Draft) -> Result<Message> {
        ensure_sendable(draft)?;
        let request = MessageRequest {
            event_id: self.event_id.clone(),
            user_id: self.session.user_id().to_string(),
            content: draft.text().to_string(),
        };
        let sent = messages::create(self.api, &request).await.map_err(|e| {
            warn!(event_id = %self.event_id, error = %e, "message not sent, keeping draft");
            e
        })?;
        draft.clear();
        self.cache.invalidate(&[self.key()]);
        Ok(sent)
    }

    /// Replace the content of one of the caller's own messages.
    pub async fn edit(&self, message: &Message, content: &str) -> Result<Message> {
        ensure_author(message, self.session)?;
        let updated = messages::update(self.api, &message.id, content).await?;
        info!(message_id = %message.id, "message edited");
        self.cache.invalidate(&[self.key()]);
        Ok(updated)
    }

    /// Add a reaction; the server replaces any previous one by the caller.
    pub async fn react(&self, message_id: &str, kind: ReactionType) -> Result<MessageReaction> {
        let reaction =
            messages::add_reaction(self.api, message_id, self.session.user_id(), kind).await?;
        self.cache.invalidate(&[self.key()]);
        Ok(reaction)
    }

    pub async fn change_reaction(&self, reaction_id: &str, kind: ReactionType) -> Result<MessageReaction> {
        let reaction = messages::update_reaction(self.api, reaction_id, kind).await?;
        self.cache.invalidate(&[self.key()]);
        Ok(reaction)
    }

    pub async fn remove_reaction(&self, reaction_id: &str) -> Result<()> {
        messages::remove_reaction(self.api, reaction_id).await?;
        self.cache.invalidate(&[self.key()]);
        Ok(())
    }
}

/// Two-party conversation with a friend, keyed by the friend's id.
pub struct PrivateChat<'a> {
    api: &'a ApiClient,
    cache: &'a QueryCache,
    session: &'a Session,
    friend_id: String,
}

impl<'a> PrivateChat<'a> {
    pub fn new(
        api: &'a ApiClient,
        cache: &'a QueryCache,
        session: &'a Session,
        friend_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            cache,
            session,
            friend_id: friend_id.into(),
        }
    }

    fn key(&self) -> QueryKey {
        QueryKey::Conversation(self.friend_id.clone())
    }

    /// Look the conversation up, creating it on first contact.
    pub async fn open(&self) -> Result<Conversation> {
        let mut conversation = self
            .cache
            .fetch(self.key(), || self.find_or_create())
            .await?;
        sort_chronologically(&mut conversation.private_messages);
        Ok(conversation)
    }

    async fn find_or_create(&self) -> Result<Conversation> {
        match conversations::find_with(self.api, &self.friend_id).await? {
            Some(c) => Ok(c),
            None => {
                info!(friend_id = %self.friend_id, "starting conversation");
                conversations::create_with(self.api, &self.friend_id).await
            }
        }
    }

    /// The participant who is not the caller.
    pub fn other_participant<'c>(&self, conversation: &'c Conversation) -> Option<&'c UserSummary> {
        conversation
            .participants
            .iter()
            .find(|p| p.id != self.session.user_id())
    }

    pub async fn send(&self, draft: &mut Draft) -> Result<PrivateMessage> {
        ensure_sendable(draft)?;
        let conversation = self.open().await?;
        let sent = conversations::push_message(self.api, &conversation.id, draft.text())
            .await
            .map_err(|e| {
                warn!(friend_id = %self.friend_id, error = %e, "message not sent, keeping draft");
                e
            })?;
        draft.clear();
        self.cache.invalidate(&[self.key()]);
        Ok(sent)
    }

    pub async fn edit(&self, message: &PrivateMessage, content: &str) -> Result<PrivateMessage> {
        ensure_author(message, self.session)?;
        let updated = conversations::update_message(self.api, &message.id, content).await?;
        info!(message_id = %message.id, "private message edited");
        self.cache.invalidate(&[self.key()]);
        Ok(updated)
    }

    pub async fn react(&self, message_id: &str, kind: ReactionType) -> Result<MessageReaction> {
        let reaction =
            conversations::add_reaction(self.api, message_id, self.session.user_id(), kind)
                .await?;
        self.cache.invalidate(&[self.key()]);
        Ok(reaction)
    }

    pub async fn change_reaction(&self, reaction_id: &str, kind: ReactionType) -> Result<MessageReaction> {
        let reaction = conversations::update_reaction(self.api, reaction_id, kind).await?;
        self.cache.invalidate(&[self.key()]);
        Ok(reaction)
    }

    pub async fn remove_reaction(&self, reaction_id: &str) -> Result<()> {
        conversations::remove_reaction(self.api, reaction_id).await?;
        self.cache.invalidate(&[self.key()]);
        Ok(())
    }
}
