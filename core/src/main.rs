use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use tracing::{debug, warn};

use api_types::{LoginCredentials, RegisterCredentials};
use kifekoi::{
    api::{auth, users},
    bug_report::{BugReport, DeviceInfo},
    chat::{ChatEntry, Draft, EventChat, PrivateChat},
    cli::{
        BugReportArgs, ChatCommand, Cli, Command, CreateEventArgs, EventsCommand, FriendsCommand,
        RegisterArgs,
    },
    config::Config,
    events::{self, EventService, Participation},
    friends::{available_actions, FriendService},
    location::LocationStore,
    services::{self, storage::Storage},
    validation::EventForm,
    ApiClient, QueryCache, Session, SessionStore,
};

/// Everything a command needs, built once from the resolved config.
struct App {
    config: Config,
    api: ApiClient,
    sessions: SessionStore,
    locations: LocationStore,
    cache: QueryCache,
}

impl App {
    async fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(
            Storage::open(&config.data_dir)
                .await
                .with_context(|| format!("cannot open {}", config.data_dir.display()))?,
        );
        Ok(Self {
            api: config.api_client(),
            sessions: SessionStore::new(storage.clone()),
            locations: LocationStore::new(storage),
            cache: QueryCache::new(),
            config,
        })
    }

    /// The stored session and a client that authenticates with it.
    async fn authed(&self) -> Result<(Session, ApiClient)> {
        let session = self
            .sessions
            .current()
            .await
            .context("log in first with `kifekoi login`")?;
        if session.is_expired() {
            warn!("session token has expired, requests may be rejected");
        }
        let api = self.api.with_session(&session);
        Ok((session, api))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.global)?;
    services::log::init(config.logging_enabled);
    debug!(?config, "configuration resolved");
    let app = App::new(config).await?;

    match cli.command {
        Command::Login { email, password } => {
            let session =
                auth::login(&app.api, &app.sessions, &LoginCredentials { email, password }).await?;
            println!("logged in as {}", session.claims.email);
        }
        Command::Register(args) => register(&app, args).await?,
        Command::Logout => {
            auth::logout(&app.sessions).await?;
            app.cache.clear();
            println!("logged out");
        }
        Command::Whoami => {
            let (session, api) = app.authed().await?;
            let me = users::profile(&api, &session).await?;
            println!("{} {} <{}> {:?}", me.firstname, me.lastname, me.email, me.role);
        }
        Command::Events { command } => events_cmd(&app, command).await?,
        Command::Friends { command } => friends_cmd(&app, command).await?,
        Command::Chat { event_id, command } => event_chat_cmd(&app, event_id, command).await?,
        Command::Dm { friend_id, command } => private_chat_cmd(&app, friend_id, command).await?,
        Command::Address { query, near_me, at } => {
            let near = if near_me || at.is_some() {
                app.locations.best_effort(at).await?
            } else {
                None
            };
            let suggestions = app.config.geocoding_client().search(&query, near).await?;
            if suggestions.is_empty() {
                println!("no suggestions");
            }
            for s in suggestions {
                println!("{}  ({:.5}, {:.5})", s.label, s.latitude, s.longitude);
            }
        }
        Command::BugReport(args) => bug_report(&app, args).await?,
    }
    Ok(())
}

async fn register(app: &App, args: RegisterArgs) -> Result<()> {
    let birthdate = Date::parse(&args.birthdate, format_description!("[year]-[month]-[day]"))
        .context("birthdate must be YYYY-MM-DD")?
        .midnight()
        .assume_utc();
    let form = RegisterCredentials {
        email: args.email,
        password: args.password,
        confirm_password: args.confirm_password,
        firstname: args.firstname,
        lastname: args.lastname,
        bio: args.bio,
        nationality: args.nationality,
        birthdate,
        avatar: args.avatar,
    };
    auth::register(&app.api, &form).await?;
    println!("account created, you can now log in");
    Ok(())
}

async fn events_cmd(app: &App, command: EventsCommand) -> Result<()> {
    let (session, api) = app.authed().await?;
    let service = EventService::new(&api, &app.cache, &session);
    match command {
        EventsCommand::List {
            search,
            filter,
            types,
            mappable,
        } => {
            let all = if types.is_empty() {
                service.list().await?
            } else {
                service.by_types(&types).await?
            };
            let found = events::search(&all, search.as_deref().unwrap_or(""));
            let shown: Vec<_> = found
                .into_iter()
                .filter(|e| filter.matches(e, session.user_id()))
                .filter(|e| !mappable || events::coordinates(e).is_some())
                .collect();
            if shown.is_empty() {
                println!("no events");
            }
            for e in shown {
                println!(
                    "{}  {:<30} {:<11} {}",
                    e.id,
                    e.title,
                    e.kind.as_str(),
                    e.start_date.format(&Rfc3339)?
                );
            }
        }
        EventsCommand::Show { id } => {
            let e = service.get(&id).await?;
            println!("{} [{}] {:?}", e.title, e.kind.as_str(), e.status);
            println!("{}", e.description);
            println!(
                "{} -> {}",
                e.start_date.format(&Rfc3339)?,
                e.end_date.format(&Rfc3339)?
            );
            if let Some(address) = &e.address {
                println!("at {address}");
            }
            let (preview, more) = events::participant_preview(&e, 3);
            let names: Vec<_> = preview.iter().map(|p| p.short_name()).collect();
            match more {
                0 => println!("participants ({}): {}", e.participants.len(), names.join(", ")),
                n => println!(
                    "participants ({}): {} +{n}",
                    e.participants.len(),
                    names.join(", ")
                ),
            }
            let role = match Participation::of(&e, session.user_id()) {
                Participation::Owner => "you organise this event",
                Participation::Participant => "you are going",
                Participation::Visitor => "you are not going",
            };
            println!("{role}");
        }
        EventsCommand::Join { id } => {
            service.join(&id).await?;
            println!("joined {id}");
        }
        EventsCommand::Leave { id } => {
            service.leave(&id).await?;
            println!("left {id}");
        }
        EventsCommand::Create(args) => create_event(app, &service, args).await?,
    }
    Ok(())
}

async fn create_event(app: &App, service: &EventService<'_>, args: CreateEventArgs) -> Result<()> {
    let near = app.locations.best_effort(args.at).await?;
    let suggestion = app
        .config
        .geocoding_client()
        .search(&args.address, near)
        .await?
        .into_iter()
        .next()
        .with_context(|| format!("no address matches {:?}", args.address))?;
    let form = EventForm {
        title: args.title,
        description: args.description,
        kind: args.kind,
        start_date: OffsetDateTime::parse(&args.start, &Rfc3339).context("invalid --start")?,
        end_date: OffsetDateTime::parse(&args.end, &Rfc3339).context("invalid --end")?,
        cover_image: args.cover_image,
        address: suggestion.to_address(),
    };
    let event = service.create(&form).await?;
    println!("created {} ({})", event.id, event.slug);
    Ok(())
}

async fn friends_cmd(app: &App, command: FriendsCommand) -> Result<()> {
    let (_session, api) = app.authed().await?;
    let friends = FriendService::new(&api, &app.cache);
    match command {
        FriendsCommand::List => {
            for f in friends.friends().await? {
                println!("{}  {} {}", f.id, f.firstname, f.lastname);
            }
        }
        FriendsCommand::Requests => {
            let lists = friends.lists().await?;
            for r in &lists.received {
                let from = r.sender.as_ref().map(|s| s.short_name());
                println!("from {}  {}", r.sender_id, from.unwrap_or_default());
            }
            for r in &lists.sent {
                let to = r.receiver.as_ref().map(|s| s.short_name());
                println!("to   {}  {}", r.receiver_id, to.unwrap_or_default());
            }
        }
        FriendsCommand::Status { user_id } => {
            let state = friends.relationship(&user_id).await?;
            let actions: Vec<_> = available_actions(state)
                .iter()
                .map(|a| format!("{a:?}").to_lowercase())
                .collect();
            println!("{state:?} (can: {})", actions.join(", "));
        }
        FriendsCommand::Add { user_id } => {
            friends.send(&user_id).await?;
            println!("request sent to {user_id}");
        }
        FriendsCommand::Accept { user_id } => {
            friends.accept_from(&user_id).await?;
            println!("you are now friends with {user_id}");
        }
        FriendsCommand::Reject { user_id } => {
            friends.reject_from(&user_id).await?;
            println!("request from {user_id} rejected");
        }
        FriendsCommand::Cancel { user_id } => {
            friends.cancel_to(&user_id).await?;
            println!("request to {user_id} cancelled");
        }
        FriendsCommand::Remove { user_id } => {
            friends.remove(&user_id).await?;
            println!("{user_id} removed from friends");
        }
    }
    Ok(())
}

fn print_entry(entry: &impl ChatEntry, author: &str, session: &Session) -> Result<()> {
    let mine = if entry.is_from(session) { "*" } else { " " };
    let summary = entry.reaction_summary();
    println!(
        "{mine}{} [{}] {}: {}  {}",
        entry.id(),
        entry.created_at().format(&Rfc3339)?,
        author,
        entry.content(),
        summary
    );
    Ok(())
}

async fn event_chat_cmd(app: &App, event_id: String, command: ChatCommand) -> Result<()> {
    let (session, api) = app.authed().await?;
    let chat = EventChat::new(&api, &app.cache, &session, event_id);
    match command {
        ChatCommand::Show => {
            for m in chat.thread().await? {
                let author = m
                    .user
                    .as_ref()
                    .map(|u| format!("{} {}", u.first_name, u.last_name))
                    .unwrap_or_else(|| m.user_id.clone());
                print_entry(&m, &author, &session)?;
            }
        }
        ChatCommand::Send { text } => {
            let mut draft = Draft::new(text);
            let sent = chat.send(&mut draft).await?;
            println!("sent {}", sent.id);
        }
        ChatCommand::Edit { message_id, text } => {
            let thread = chat.thread().await?;
            let Some(message) = thread.iter().find(|m| m.id == message_id) else {
                bail!("no message {message_id} in this chat");
            };
            chat.edit(message, &text).await?;
            println!("edited {message_id}");
        }
        ChatCommand::React { message_id, kind } => {
            chat.react(&message_id, kind).await?;
            println!("{} on {message_id}", kind.glyph());
        }
    }
    Ok(())
}

async fn private_chat_cmd(app: &App, friend_id: String, command: ChatCommand) -> Result<()> {
    let (session, api) = app.authed().await?;
    let chat = PrivateChat::new(&api, &app.cache, &session, friend_id);
    match command {
        ChatCommand::Show => {
            let conversation = chat.open().await?;
            let other = chat.other_participant(&conversation);
            if let Some(other) = other {
                println!("conversation with {} {}", other.firstname, other.lastname);
            }
            for m in &conversation.private_messages {
                let author = if m.is_from(&session) {
                    "you".to_string()
                } else {
                    other.map(|o| o.short_name()).unwrap_or_else(|| m.sender_id.clone())
                };
                print_entry(m, &author, &session)?;
            }
        }
        ChatCommand::Send { text } => {
            let mut draft = Draft::new(text);
            let sent = chat.send(&mut draft).await?;
            println!("sent {}", sent.id);
        }
        ChatCommand::Edit { message_id, text } => {
            let conversation = chat.open().await?;
            let Some(message) = conversation
                .private_messages
                .iter()
                .find(|m| m.id == message_id)
            else {
                bail!("no message {message_id} in this conversation");
            };
            chat.edit(message, &text).await?;
            println!("edited {message_id}");
        }
        ChatCommand::React { message_id, kind } => {
            chat.react(&message_id, kind).await?;
            println!("{} on {message_id}", kind.glyph());
        }
    }
    Ok(())
}

async fn bug_report(app: &App, args: BugReportArgs) -> Result<()> {
    let report = BugReport {
        title: args.title,
        description: args.description,
        steps: args.steps,
        expected_behavior: args.expected,
        actual_behavior: args.actual,
        device_info: DeviceInfo::current(),
        priority: args.priority,
        category: args.category,
        user_email: args.email,
    };
    let url = app.config.bug_reporter().submit(&report).await?;
    println!("thanks, the report is at {url}");
    Ok(())
}
