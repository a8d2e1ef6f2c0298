//! Inbound request payloads.
//!
//! Each write payload is a concrete type implementing [`UserPayload`]: expose
//! the login for the advisory uniqueness check, then convert into a [`User`]
//! for the service layer.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::user::User;

/// Two-operation contract shared by all user write payloads.
pub trait UserPayload {
    fn login(&self) -> &str;
    fn into_user(self) -> User;
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 20, message = "login must be between 3 and 20 characters"))]
    pub login: String,
    #[validate(length(min = 8, max = 20, message = "password must be between 8 and 20 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 2, message = "gender must be one of: 0 1 2"))]
    pub gender: i32,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl UserPayload for RegisterRequest {
    fn login(&self) -> &str {
        &self.login
    }

    fn into_user(self) -> User {
        User::new(
            Uuid::new_v4(),
            self.login,
            self.password,
            self.name,
            self.gender,
            self.birthday,
            false,
        )
    }
}

/// Register payload for `/admin/register`: same fields plus the admin flag.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminRegisterRequest {
    #[validate(length(min = 3, max = 20, message = "login must be between 3 and 20 characters"))]
    pub login: String,
    #[validate(length(min = 8, max = 20, message = "password must be between 8 and 20 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 2, message = "gender must be one of: 0 1 2"))]
    pub gender: i32,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub admin: bool,
}

impl UserPayload for AdminRegisterRequest {
    fn login(&self) -> &str {
        &self.login
    }

    fn into_user(self) -> User {
        User::new(
            Uuid::new_v4(),
            self.login,
            self.password,
            self.name,
            self.gender,
            self.birthday,
            self.admin,
        )
    }
}

/// Self-service profile update: the admin flag is always forced off.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRequest {
    pub id: Uuid,
    #[validate(length(min = 3, max = 20, message = "login must be between 3 and 20 characters"))]
    pub login: String,
    #[validate(length(min = 8, max = 20, message = "password must be between 8 and 20 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 2, message = "gender must be one of: 0 1 2"))]
    pub gender: i32,
}

impl UserPayload for UpdateRequest {
    fn login(&self) -> &str {
        &self.login
    }

    fn into_user(self) -> User {
        User::new(self.id, self.login, self.password, self.name, self.gender, None, false)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateRequest {
    pub id: Uuid,
    #[validate(length(min = 3, max = 20, message = "login must be between 3 and 20 characters"))]
    pub login: String,
    #[validate(length(min = 8, max = 20, message = "password must be between 8 and 20 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 2, message = "gender must be one of: 0 1 2"))]
    pub gender: i32,
    #[serde(default)]
    pub admin: bool,
}

impl UserPayload for AdminUpdateRequest {
    fn login(&self) -> &str {
        &self.login
    }

    fn into_user(self) -> User {
        User::new(
            self.id,
            self.login,
            self.password,
            self.name,
            self.gender,
            None,
            self.admin,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}
