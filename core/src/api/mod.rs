//! One module per backend resource. Each function is a single request;
//! caching and invalidation live in the services built on top.

pub mod auth;
pub mod conversations;
pub mod events;
pub mod messages;
pub mod users;
