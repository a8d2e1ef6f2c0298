//! Business logic: user orchestration and payload validation.

pub mod user;
pub mod validation;

pub use user::UserService;
pub use validation::UserValidator;
