#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::TcpListener,
    sync::{Arc, Mutex},
};

use api_types::{
    Conversation, Event, EventRequest, EventStatus, EventType, FriendRequest, LoginCredentials,
    Message, MessageReaction, MessageRequest, PrivateMessage, ReactionRequest, ReactionType, Role,
    User, UserSummary,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use kifekoi::session::{decode_claims, Claims, Session};
use serde_json::{json, Value};
use time::{Duration, OffsetDateTime};

pub type Shared = Arc<Mutex<Backend>>;
type Reply<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

/// In-memory stand-in for the events backend and the third-party services.
#[derive(Default)]
pub struct Backend {
    pub users: Vec<User>,
    pub friendships: Vec<(String, String)>,
    pub requests: Vec<FriendRequest>,
    pub events: Vec<Event>,
    pub messages: Vec<Message>,
    pub conversations: Vec<Conversation>,
    pub issues: Vec<Value>,
    /// Raw bodies of `POST /events`, `PUT /events/:id` and `POST /auth/register`.
    pub event_payloads: Vec<Value>,
    pub registrations: Vec<Value>,
    pub fail_message_posts: bool,
    hits: HashMap<String, usize>,
    next_id: usize,
}

impl Backend {
    pub fn seeded() -> Self {
        let mut b = Backend {
            users: vec![
                user("me", "Ada", "Lovelace"),
                user("u2", "Grace", "Hopper"),
                user("u3", "Alan", "Turing"),
            ],
            ..Default::default()
        };
        b.events.push(event("e1", "Jazz Night", "u2"));
        b
    }

    pub fn hits(&self, route: &str) -> usize {
        self.hits.get(route).copied().unwrap_or(0)
    }

    fn hit(&mut self, route: &str) {
        *self.hits.entry(route.to_string()).or_insert(0) += 1;
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn summary(&self, id: &str) -> UserSummary {
        let u = self.users.iter().find(|u| u.id == id);
        UserSummary {
            id: id.to_string(),
            firstname: u.map(|u| u.firstname.clone()).unwrap_or_default(),
            lastname: u.map(|u| u.lastname.clone()).unwrap_or_default(),
            avatar: None,
        }
    }

    fn private_message_mut(&mut self, id: &str) -> Option<&mut PrivateMessage> {
        self.conversations
            .iter_mut()
            .flat_map(|c| c.private_messages.iter_mut())
            .find(|m| m.id == id)
    }

    fn are_friends(&self, a: &str, b: &str) -> bool {
        self.friendships
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

pub fn user(id: &str, firstname: &str, lastname: &str) -> User {
    User {
        id: id.into(),
        firstname: firstname.into(),
        lastname: lastname.into(),
        email: format!("{id}@example.com"),
        role: Role::User,
        avatar: None,
        bio: None,
        birthdate: None,
        nationality: None,
    }
}

pub fn event(id: &str, title: &str, owner: &str) -> Event {
    let start = OffsetDateTime::now_utc() + Duration::days(7);
    Event {
        id: id.into(),
        slug: title.to_lowercase().replace(' ', "-"),
        title: title.into(),
        description: "Live music by the river".into(),
        start_date: start,
        end_date: start + Duration::hours(4),
        status: EventStatus::Confirmed,
        kind: EventType::Music,
        is_public: true,
        is_featured: false,
        cover_image: "https://img/jazz.png".into(),
        owner_id: owner.into(),
        latitude: Some(49.894),
        longitude: Some(2.295),
        address: None,
        participants: vec![UserSummary {
            id: owner.into(),
            firstname: String::new(),
            lastname: String::new(),
            avatar: None,
        }],
    }
}

pub fn token_for(user_id: &str) -> String {
    let claims = Claims {
        user_id: user_id.into(),
        email: format!("{user_id}@example.com"),
        role: Role::User,
        iat: OffsetDateTime::now_utc().unix_timestamp(),
        exp: (OffsetDateTime::now_utc() + Duration::days(1)).unix_timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"backend-secret")).unwrap()
}

pub fn session_for(user_id: &str) -> Session {
    Session::from_token(token_for(user_id)).unwrap()
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn caller(headers: &HeaderMap) -> Result<String, (StatusCode, Json<Value>)> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|t| decode_claims(t).ok())
        .map(|c| c.user_id)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

async fn login(State(s): State<Shared>, Json(creds): Json<LoginCredentials>) -> Reply<Value> {
    let b = s.lock().unwrap();
    let user = b
        .users
        .iter()
        .find(|u| u.email == creds.email)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
    let token = token_for(&user.id);
    if creds.password == "bare" {
        return Ok(Json(json!(token)));
    }
    Ok(Json(json!({
        "token": token,
        "user": { "id": user.id, "email": user.email, "role": "USER" }
    })))
}

async fn register(State(s): State<Shared>, Json(body): Json<Value>) -> Reply<Value> {
    let mut b = s.lock().unwrap();
    b.hit("POST /auth/register");
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if b.users.iter().any(|u| u.email == email) {
        return Err(error(StatusCode::CONFLICT, "Email already in use"));
    }
    let id = b.next_id("u");
    b.registrations.push(body);
    Ok(Json(json!({ "id": id, "email": email })))
}

async fn get_user(State(s): State<Shared>, Path(id): Path<String>) -> Reply<User> {
    let b = s.lock().unwrap();
    b.users
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))
}

async fn friends(State(s): State<Shared>, headers: HeaderMap) -> Reply<Vec<User>> {
    let me = caller(&headers)?;
    let mut b = s.lock().unwrap();
    b.hit("GET /users/friends");
    let list = b
        .users
        .iter()
        .filter(|u| b.are_friends(&me, &u.id))
        .cloned()
        .collect();
    Ok(Json(list))
}

async fn remove_friend(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    let me = caller(&headers)?;
    let mut b = s.lock().unwrap();
    b.friendships
        .retain(|(x, y)| !((x == &me && y == &id) || (x == &id && y == &me)));
    Ok(Json(json!({ "message": "removed" })))
}

async fn send_request(
    State(s): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply<Value> {
    let me = caller(&headers)?;
    let friend = body["friendId"].as_str().unwrap_or_default().to_string();
    let mut b = s.lock().unwrap();
    let id = b.next_id("fr");
    let request = FriendRequest {
        id,
        sender_id: me.clone(),
        receiver_id: friend.clone(),
        status: "PENDING".into(),
        sender: Some(b.summary(&me)),
        receiver: Some(b.summary(&friend)),
    };
    b.requests.push(request);
    Ok(Json(json!({ "message": "sent" })))
}

async fn received(State(s): State<Shared>, headers: HeaderMap) -> Reply<Vec<FriendRequest>> {
    let me = caller(&headers)?;
    let mut b = s.lock().unwrap();
    b.hit("GET received");
    let list = b
        .requests
        .iter()
        .filter(|r| r.receiver_id == me)
        .cloned()
        .collect();
    Ok(Json(list))
}

async fn sent(State(s): State<Shared>, headers: HeaderMap) -> Reply<Vec<FriendRequest>> {
    let me = caller(&headers)?;
    let mut b = s.lock().unwrap();
    b.hit("GET sent");
    let list = b
        .requests
        .iter()
        .filter(|r| r.sender_id == me)
        .cloned()
        .collect();
    Ok(Json(list))
}

async fn request_action(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(action): Path<String>,
    Json(body): Json<Value>,
) -> Reply<Value> {
    let me = caller(&headers)?;
    let request_id = body["requestId"].as_str().unwrap_or_default();
    let mut b = s.lock().unwrap();
    b.hit(&format!("POST {action}"));
    let pos = b
        .requests
        .iter()
        .position(|r| {
            r.id == request_id
                && match action.as_str() {
                    "cancel" => r.sender_id == me,
                    _ => r.receiver_id == me,
                }
        })
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Request ID not found"))?;
    let request = b.requests.remove(pos);
    if action == "accept" {
        b.friendships.push((request.sender_id, request.receiver_id));
    }
    Ok(Json(json!({ "message": action })))
}

async fn list_events(State(s): State<Shared>) -> Json<Vec<Event>> {
    let mut b = s.lock().unwrap();
    b.hit("GET /events");
    Json(b.events.clone())
}

async fn get_event(State(s): State<Shared>, Path(id): Path<String>) -> Reply<Event> {
    let mut b = s.lock().unwrap();
    b.hit("GET /events/:id");
    b.events
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Event not found"))
}

fn event_from(id: String, req: EventRequest, owner: UserSummary) -> Event {
    Event {
        id,
        slug: req.slug,
        title: req.title,
        description: req.description,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status,
        kind: req.kind,
        is_public: true,
        is_featured: false,
        cover_image: req.cover_image,
        owner_id: req.owner_id,
        latitude: None,
        longitude: None,
        address: Some(req.address),
        participants: vec![owner],
    }
}

fn event_request(body: &Value) -> Result<EventRequest, (StatusCode, Json<Value>)> {
    serde_json::from_value(body.clone())
        .map_err(|e| error(StatusCode::BAD_REQUEST, &e.to_string()))
}

async fn create_event(
    State(s): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply<Event> {
    caller(&headers)?;
    let req = event_request(&body)?;
    let mut b = s.lock().unwrap();
    b.hit("POST /events");
    b.event_payloads.push(body);
    let id = b.next_id("e");
    let owner = b.summary(&req.owner_id);
    let event = event_from(id, req, owner);
    b.events.push(event.clone());
    Ok(Json(event))
}

async fn update_event(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<Event> {
    let me = caller(&headers)?;
    let req = event_request(&body)?;
    let mut b = s.lock().unwrap();
    b.hit("PUT /events/:id");
    b.event_payloads.push(body);
    let pos = b
        .events
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Event not found"))?;
    if b.events[pos].owner_id != me {
        return Err(error(StatusCode::FORBIDDEN, "Not the event owner"));
    }
    let participants = b.events[pos].participants.clone();
    let mut updated = event_from(id, req, b.summary(&me));
    updated.participants = participants;
    b.events[pos] = updated.clone();
    Ok(Json(updated))
}

async fn delete_event(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    let me = caller(&headers)?;
    let mut b = s.lock().unwrap();
    b.hit("DELETE /events/:id");
    let pos = b
        .events
        .iter()
        .position(|e| e.id == id && e.owner_id == me)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Event not found"))?;
    b.events.remove(pos);
    Ok(Json(json!({ "message": "deleted" })))
}

async fn participate(
    State(s): State<Shared>,
    Path((user_id, event_id)): Path<(String, String)>,
) -> Reply<Value> {
    let mut b = s.lock().unwrap();
    let summary = b.summary(&user_id);
    let event = b
        .events
        .iter_mut()
        .find(|e| e.id == event_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Event not found"))?;
    if !event.participants.iter().any(|p| p.id == user_id) {
        event.participants.push(summary);
    }
    Ok(Json(json!({ "message": "joined" })))
}

async fn leave(
    State(s): State<Shared>,
    Path((user_id, event_id)): Path<(String, String)>,
) -> Reply<Value> {
    let mut b = s.lock().unwrap();
    let event = b
        .events
        .iter_mut()
        .find(|e| e.id == event_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Event not found"))?;
    event.participants.retain(|p| p.id != user_id);
    Ok(Json(json!({ "message": "left" })))
}

async fn event_messages(State(s): State<Shared>, Path(event_id): Path<String>) -> Json<Vec<Message>> {
    let mut b = s.lock().unwrap();
    b.hit("GET /messages/event");
    Json(
        b.messages
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect(),
    )
}

async fn post_message(State(s): State<Shared>, Json(req): Json<MessageRequest>) -> Reply<Message> {
    let mut b = s.lock().unwrap();
    b.hit("POST /messages");
    if b.fail_message_posts {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"));
    }
    let now = OffsetDateTime::now_utc();
    let message = Message {
        id: b.next_id("m"),
        event_id: req.event_id,
        user_id: req.user_id,
        content: req.content,
        user: None,
        created_at: now,
        updated_at: now,
        reactions: Vec::new(),
    };
    b.messages.push(message.clone());
    Ok(Json(message))
}

async fn put_message(
    State(s): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<Message> {
    let content = content_of(&body)?;
    let mut b = s.lock().unwrap();
    b.hit("PUT /messages");
    let message = b
        .messages
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Message not found"))?;
    message.content = content;
    Ok(Json(message.clone()))
}

async fn add_reaction(
    State(s): State<Shared>,
    Json(req): Json<ReactionRequest>,
) -> Reply<MessageReaction> {
    let mut b = s.lock().unwrap();
    let id = b.next_id("r");
    let message = b
        .messages
        .iter_mut()
        .find(|m| m.id == req.message_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Message not found"))?;
    message.reactions.retain(|r| r.user_id != req.user_id);
    let reaction = MessageReaction {
        id,
        message_id: req.message_id,
        user_id: req.user_id,
        kind: req.kind,
        sender: None,
    };
    message.reactions.push(reaction.clone());
    Ok(Json(reaction))
}

fn reaction_kind(body: &Value) -> Result<ReactionType, (StatusCode, Json<Value>)> {
    serde_json::from_value(body["type"].clone())
        .map_err(|_| error(StatusCode::BAD_REQUEST, "type is required"))
}

fn content_of(body: &Value) -> Result<String, (StatusCode, Json<Value>)> {
    body["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "content is required"))
}

async fn update_reaction(
    State(s): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<MessageReaction> {
    let kind = reaction_kind(&body)?;
    let mut b = s.lock().unwrap();
    b.hit("PUT /message-reactions");
    let reaction = b
        .messages
        .iter_mut()
        .flat_map(|m| m.reactions.iter_mut())
        .find(|r| r.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Reaction not found"))?;
    reaction.kind = kind;
    Ok(Json(reaction.clone()))
}

async fn delete_reaction(State(s): State<Shared>, Path(id): Path<String>) -> Reply<Value> {
    let mut b = s.lock().unwrap();
    b.hit("DELETE /message-reactions");
    let mut found = false;
    for m in b.messages.iter_mut() {
        let before = m.reactions.len();
        m.reactions.retain(|r| r.id != id);
        found |= m.reactions.len() != before;
    }
    if !found {
        return Err(error(StatusCode::NOT_FOUND, "Reaction not found"));
    }
    Ok(Json(json!({ "message": "deleted" })))
}

async fn put_private_message(
    State(s): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<PrivateMessage> {
    let content = content_of(&body)?;
    let mut b = s.lock().unwrap();
    b.hit("PUT /conversations/messages");
    let message = b
        .private_message_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Message not found"))?;
    message.content = content;
    Ok(Json(message.clone()))
}

async fn add_private_reaction(
    State(s): State<Shared>,
    Json(req): Json<ReactionRequest>,
) -> Reply<MessageReaction> {
    let mut b = s.lock().unwrap();
    b.hit("POST /private-message-reactions");
    let id = b.next_id("pr");
    let message = b
        .private_message_mut(&req.message_id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Message not found"))?;
    message.reactions.retain(|r| r.user_id != req.user_id);
    let reaction = MessageReaction {
        id,
        message_id: req.message_id,
        user_id: req.user_id,
        kind: req.kind,
        sender: None,
    };
    message.reactions.push(reaction.clone());
    Ok(Json(reaction))
}

async fn update_private_reaction(
    State(s): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<MessageReaction> {
    let kind = reaction_kind(&body)?;
    let mut b = s.lock().unwrap();
    b.hit("PUT /private-message-reactions");
    let reaction = b
        .conversations
        .iter_mut()
        .flat_map(|c| c.private_messages.iter_mut())
        .flat_map(|m| m.reactions.iter_mut())
        .find(|r| r.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Reaction not found"))?;
    reaction.kind = kind;
    Ok(Json(reaction.clone()))
}

async fn delete_private_reaction(State(s): State<Shared>, Path(id): Path<String>) -> Reply<Value> {
    let mut b = s.lock().unwrap();
    b.hit("DELETE /private-message-reactions");
    let mut found = false;
    for m in b
        .conversations
        .iter_mut()
        .flat_map(|c| c.private_messages.iter_mut())
    {
        let before = m.reactions.len();
        m.reactions.retain(|r| r.id != id);
        found |= m.reactions.len() != before;
    }
    if !found {
        return Err(error(StatusCode::NOT_FOUND, "Reaction not found"));
    }
    Ok(Json(json!({ "message": "deleted" })))
}

fn conversation_between<'b>(b: &'b Backend, a: &str, c: &str) -> Option<&'b Conversation> {
    b.conversations.iter().find(|conv| {
        conv.participants.iter().any(|p| p.id == a) && conv.participants.iter().any(|p| p.id == c)
    })
}

async fn find_conversation(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Reply<Conversation> {
    let me = caller(&headers)?;
    let friend = q.get("friendId").cloned().unwrap_or_default();
    let mut b = s.lock().unwrap();
    b.hit("GET /conversations");
    conversation_between(&b, &me, &friend)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Conversation not found"))
}

async fn create_conversation(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Reply<Conversation> {
    let me = caller(&headers)?;
    let friend = q.get("friendId").cloned().unwrap_or_default();
    let mut b = s.lock().unwrap();
    b.hit("POST /conversations");
    let now = OffsetDateTime::now_utc();
    let conversation = Conversation {
        id: b.next_id("c"),
        created_at: now,
        updated_at: now,
        participants: vec![b.summary(&me), b.summary(&friend)],
        private_messages: Vec::new(),
    };
    b.conversations.push(conversation.clone());
    Ok(Json(conversation))
}

async fn push_private_message(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply<PrivateMessage> {
    let me = caller(&headers)?;
    let mut b = s.lock().unwrap();
    let message_id = b.next_id("pm");
    let conversation = b
        .conversations
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Conversation not found"))?;
    let now = OffsetDateTime::now_utc();
    let message = PrivateMessage {
        id: message_id,
        content: body["message"].as_str().unwrap_or_default().to_string(),
        conversation_id: id,
        sender_id: me,
        is_read: false,
        created_at: now,
        updated_at: now,
        reactions: Vec::new(),
    };
    conversation.private_messages.push(message.clone());
    Ok(Json(message))
}

async fn geocode(State(s): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let mut b = s.lock().unwrap();
    b.hit("GET /search/");
    if q.contains_key("lat") && q.contains_key("lon") {
        b.hit("GET /search/ near");
    }
    Json(json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [2.2957, 49.8941] },
            "properties": {
                "label": "8 Boulevard du Port 80000 Amiens",
                "name": "8 Boulevard du Port",
                "postcode": "80000",
                "city": "Amiens"
            }
        }]
    }))
}

async fn create_issue(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path((owner, repo)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply<Value> {
    let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
    if auth != Some("Bearer ghp_test") {
        return Err(error(StatusCode::UNAUTHORIZED, "Bad credentials"));
    }
    let accept = headers.get("accept").and_then(|v| v.to_str().ok());
    if accept != Some("application/vnd.github.v3+json") {
        return Err(error(StatusCode::NOT_ACCEPTABLE, "wrong media type"));
    }
    let mut b = s.lock().unwrap();
    b.issues.push(body);
    let number = b.issues.len();
    Ok(Json(json!({
        "number": number,
        "html_url": format!("https://github.com/{owner}/{repo}/issues/{number}")
    })))
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/users/friends", get(friends))
        .route("/users/friends/:id", axum::routing::delete(remove_friend))
        .route("/users/friend-requests/send", post(send_request))
        .route("/users/friend-requests/received", get(received))
        .route("/users/friend-requests/sent", get(sent))
        .route("/users/friend-requests/:action", post(request_action))
        .route("/users/:id", get(get_user))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/participate/:event_id", post(participate).delete(leave))
        .route("/messages", post(post_message))
        .route("/messages/event/:event_id", get(event_messages))
        .route("/messages/:id", put(put_message))
        .route("/message-reactions", post(add_reaction))
        .route(
            "/message-reactions/:id",
            put(update_reaction).delete(delete_reaction),
        )
        .route("/conversations", get(find_conversation).post(create_conversation))
        .route("/conversations/:id/messages", post(push_private_message))
        .route("/conversations/messages/:id", put(put_private_message))
        .route("/private-message-reactions", post(add_private_reaction))
        .route(
            "/private-message-reactions/:id",
            put(update_private_reaction).delete(delete_private_reaction),
        )
        .route("/search/", get(geocode))
        .route("/repos/:owner/:repo/issues", post(create_issue))
        .with_state(state)
}

/// Serve `backend` on an ephemeral port, returning its base URL.
pub async fn spawn(backend: Backend) -> (String, Shared) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    let state: Shared = Arc::new(Mutex::new(backend));
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    (format!("http://{addr}"), state)
}
