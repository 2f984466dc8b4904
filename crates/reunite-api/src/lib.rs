pub mod auth;
pub mod chat;
pub mod claims;
pub mod error;
pub mod items;
pub mod messages;
pub mod middleware;
pub mod rewards;
pub mod schools;
