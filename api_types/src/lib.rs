use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Account role carried by users and token claims.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Full user projection returned by `/users/{id}` and `/users/friends`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub birthdate: Option<OffsetDateTime>,
    #[serde(default)]
    pub nationality: Option<String>,
}

/// Denormalized display fields embedded in other resources.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl UserSummary {
    /// "Firstname L." as shown next to avatars.
    pub fn short_name(&self) -> String {
        short_name(&self.firstname, &self.lastname)
    }
}

fn short_name(first: &str, last: &str) -> String {
    match last.chars().next() {
        Some(initial) => format!("{} {}.", first, initial.to_uppercase()),
        None => first.to_string(),
    }
}

/// An outstanding friend request. Terminal transitions delete it server-side.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub sender: Option<UserSummary>,
    #[serde(default)]
    pub receiver: Option<UserSummary>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Music,
    Dance,
    Theatre,
    VisualArt,
    Literature,
    Cinema,
    Sports,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Music,
        EventType::Dance,
        EventType::Theatre,
        EventType::VisualArt,
        EventType::Literature,
        EventType::Cinema,
        EventType::Sports,
        EventType::Other,
    ];

    /// Wire name, e.g. `VISUAL_ART`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Music => "MUSIC",
            EventType::Dance => "DANCE",
            EventType::Theatre => "THEATRE",
            EventType::VisualArt => "VISUAL_ART",
            EventType::Literature => "LITERATURE",
            EventType::Cinema => "CINEMA",
            EventType::Sports => "SPORTS",
            EventType::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown event type {s}"))
    }
}

/// Structured postal address with coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Address {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {} {}, {}",
            self.number, self.street, self.postal_code, self.city, self.country
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(rename = "type", default)]
    pub kind: EventType,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub cover_image: String,
    pub owner_id: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub participants: Vec<UserSummary>,
}

/// Payload for creating or updating an event.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub slug: String,
    pub status: EventStatus,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub owner_id: String,
    pub cover_image: String,
    pub address: Address,
}

/// The three reactions a user can leave on a message.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionType {
    Like,
    Dislike,
    Love,
}

impl ReactionType {
    pub const ALL: [ReactionType; 3] = [ReactionType::Like, ReactionType::Dislike, ReactionType::Love];

    /// Fixed glyph for each reaction type.
    pub fn glyph(&self) -> &'static str {
        match self {
            ReactionType::Like => "👍",
            ReactionType::Dislike => "👎",
            ReactionType::Love => "💖",
        }
    }
}

impl std::str::FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LIKE" => Ok(ReactionType::Like),
            "DISLIKE" => Ok(ReactionType::Dislike),
            "LOVE" => Ok(ReactionType::Love),
            other => Err(format!("unknown reaction {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ReactionSender {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl ReactionSender {
    pub fn short_name(&self) -> String {
        short_name(&self.firstname, &self.lastname)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageReaction {
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ReactionType,
    #[serde(default)]
    pub sender: Option<ReactionSender>,
}

/// Author projection embedded in event messages.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageAuthor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// A message in an event's group chat.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub user: Option<MessageAuthor>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub reactions: Vec<MessageReaction>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    pub event_id: String,
    pub user_id: String,
    pub content: String,
}

/// Body of the add-reaction calls for both message kinds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub message_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessage {
    pub id: String,
    pub content: String,
    pub conversation_id: String,
    pub sender_id: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub reactions: Vec<MessageReaction>,
}

/// A two-party private conversation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(default)]
    pub participants: Vec<UserSummary>,
    #[serde(default)]
    pub private_messages: Vec<PrivateMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredentials {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub firstname: String,
    pub lastname: String,
    pub bio: String,
    pub nationality: String,
    #[serde(with = "time::serde::rfc3339")]
    pub birthdate: OffsetDateTime,
    pub avatar: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

/// The login endpoint answers either with the bare token or a full object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoginResponse {
    Token(String),
    Full(AuthResponse),
}

impl LoginResponse {
    pub fn token(&self) -> &str {
        match self {
            LoginResponse::Token(t) => t,
            LoginResponse::Full(r) => &r.token,
        }
    }
}
