use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use api_types::{EventType, ReactionType};

use crate::bug_report::{Category, Priority};
use crate::events::EventFilter;
use crate::location::Coordinates;

/// Command line client for the Kifekoi events backend.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Backend base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Enable or disable logging (true/false).
    #[arg(long, global = true)]
    pub logging: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Browse and manage events.
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
    /// Friends and friend requests.
    Friends {
        #[command(subcommand)]
        command: FriendsCommand,
    },
    /// An event's group chat.
    Chat {
        event_id: String,
        #[command(subcommand)]
        command: ChatCommand,
    },
    /// Private messages with a friend.
    Dm {
        friend_id: String,
        #[command(subcommand)]
        command: ChatCommand,
    },
    /// Look up address suggestions.
    Address {
        query: String,
        /// Bias results towards the last known location.
        #[arg(long)]
        near_me: bool,
        /// Current position as LAT,LON; remembered for later lookups.
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Coordinates>,
    },
    /// File a bug report.
    BugReport(BugReportArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    #[arg(long)]
    pub firstname: String,
    #[arg(long)]
    pub lastname: String,
    #[arg(long, default_value = "")]
    pub bio: String,
    #[arg(long, default_value = "")]
    pub nationality: String,
    /// Birth date as YYYY-MM-DD.
    #[arg(long)]
    pub birthdate: String,
    #[arg(long, default_value = "")]
    pub avatar: String,
}

#[derive(Subcommand, Debug)]
pub enum EventsCommand {
    /// List events, optionally searched and filtered.
    List {
        #[arg(long)]
        search: Option<String>,
        /// all, mine or going.
        #[arg(long, default_value = "all")]
        filter: EventFilter,
        /// Only events of these categories.
        #[arg(long = "type")]
        types: Vec<EventType>,
        /// Only events with a map position.
        #[arg(long)]
        mappable: bool,
    },
    Show {
        id: String,
    },
    Join {
        id: String,
    },
    Leave {
        id: String,
    },
    Create(CreateEventArgs),
}

#[derive(Args, Debug)]
pub struct CreateEventArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long = "type", default_value = "OTHER")]
    pub kind: EventType,
    /// RFC 3339 start time.
    #[arg(long)]
    pub start: String,
    /// RFC 3339 end time.
    #[arg(long)]
    pub end: String,
    #[arg(long)]
    pub cover_image: String,
    /// Free-text address, resolved through the geocoder.
    #[arg(long)]
    pub address: String,
    /// Current position as LAT,LON, used to rank address matches.
    #[arg(long, allow_hyphen_values = true)]
    pub at: Option<Coordinates>,
}

#[derive(Subcommand, Debug)]
pub enum FriendsCommand {
    List,
    /// Pending requests in both directions.
    Requests,
    /// How you relate to a user.
    Status {
        user_id: String,
    },
    Add {
        user_id: String,
    },
    Accept {
        user_id: String,
    },
    Reject {
        user_id: String,
    },
    Cancel {
        user_id: String,
    },
    Remove {
        user_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChatCommand {
    Show,
    Send {
        text: String,
    },
    Edit {
        message_id: String,
        text: String,
    },
    React {
        message_id: String,
        /// LIKE, DISLIKE or LOVE.
        kind: ReactionType,
    },
}

#[derive(Args, Debug)]
pub struct BugReportArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    /// One per step, in order.
    #[arg(long = "step")]
    pub steps: Vec<String>,
    #[arg(long)]
    pub expected: String,
    #[arg(long)]
    pub actual: String,
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    #[arg(long, default_value = "other")]
    pub category: Category,
    #[arg(long)]
    pub email: Option<String>,
}
