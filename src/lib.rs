pub mod api;
pub mod auth;
pub mod cli;
pub mod events;
pub mod sessions;
pub mod users;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
