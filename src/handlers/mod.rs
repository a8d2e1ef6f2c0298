//! HTTP request handlers.

pub mod admin;
pub mod http;

pub use http::AppState;
