//! Authentication: password hashing and JWT session tokens.

mod jwt;
mod password;

pub use jwt::{Claims, TokenService};
pub use password::{hash_password, verify_password};
