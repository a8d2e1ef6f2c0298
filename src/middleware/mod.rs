//! Request middleware: the session guard and the admin gate.

pub mod auth;

pub use auth::{authenticate, require_admin, AuthContext};
