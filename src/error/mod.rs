//! Application error types for robust error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found ({field} = {value})")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{field} already exists ({value})")]
    Conflict { field: &'static str, value: String },

    #[error("validation error")]
    Validation(HashMap<String, String>),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Status code the variant maps to; also used by handlers that override
    /// the envelope message but keep the status.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Redis(_)
            | AppError::Db(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            // Validation carries the whole field -> message map as the errors object.
            AppError::Validation(fields) => json!({ "errors": fields }),
            err @ (AppError::NotFound { .. }
            | AppError::Conflict { .. }
            | AppError::Unauthorized(_)
            | AppError::Forbidden(_)
            | AppError::Jwt(_)) => json!({ "errors": { "error": err.to_string() } }),
            // Storage/transport details are logged by the caller, never sent out.
            _ => json!({ "errors": { "error": "internal error" } }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::not_found("User", "login", "alice1").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict {
                field: "login",
                value: "alice1".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Validation(HashMap::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("invalid credentials".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("admin only".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message() {
        let err = AppError::not_found("User", "id", "42");
        assert_eq!(err.to_string(), "User not found (id = 42)");
    }
}
