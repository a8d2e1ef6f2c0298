//! Validation layer: field rules plus the advisory login uniqueness check.

use std::collections::HashMap;

use validator::Validate;

use crate::db::{user_exists_by_login, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, UserPayload};

#[derive(Clone)]
pub struct UserValidator {
    db: DbPool,
}

impl UserValidator {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Field-level rules shared by all user write payloads. Produces a
    /// field -> message map; an empty map means valid.
    pub fn check_fields<T: Validate + UserPayload>(&self, payload: &T) -> AppResult<()> {
        let mut errors = HashMap::new();

        if let Err(validation) = payload.validate() {
            for (field, field_errors) in validation.field_errors() {
                if let Some(err) = field_errors.first() {
                    let message = err
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"));
                    errors.insert(field.to_string(), message);
                }
            }
        }

        let login = payload.login();
        if !login.is_empty() && !login.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.insert(
                "login".to_string(),
                "login must contain only letters and digits".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Registration check: field rules, then the advisory uniqueness lookup.
    /// The lookup is not transactional; the authoritative re-check runs inside
    /// the registration transaction in the user service.
    pub async fn check_registration<T: Validate + UserPayload>(
        &self,
        payload: &T,
    ) -> AppResult<()> {
        self.check_fields(payload)?;

        if user_exists_by_login(&self.db, payload.login()).await? {
            return Err(AppError::Conflict {
                field: "login",
                value: payload.login().to_string(),
            });
        }
        Ok(())
    }

    /// Presence-only check for login payloads.
    pub fn check_login_request(&self, req: &LoginRequest) -> AppResult<()> {
        let mut errors = HashMap::new();
        if req.login.is_empty() {
            errors.insert("login".to_string(), "login is required".to_string());
        }
        if req.password.is_empty() {
            errors.insert("password".to_string(), "password is required".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}
