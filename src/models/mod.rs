//! Data models: the user record, request payloads, and the response envelope.

pub mod dto;
pub mod response;
pub mod user;

pub use dto::*;
pub use user::User;
