pub mod api;
pub mod bug_report;
pub mod cache;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod friends;
pub mod geocode;
pub mod http;
pub mod location;
pub mod services;
pub mod session;
pub mod validation;

pub use cache::{QueryCache, QueryKey};
pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use session::{Session, SessionStore};
