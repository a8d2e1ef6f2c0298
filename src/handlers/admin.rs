//! Admin HTTP handlers: directory CRUD behind the admin gate.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::http::{
    handle_register, handle_update, invalid_json, AppState, ERR_DELETE_FAILED, ERR_UUID,
    MSG_USER_DELETED,
};
use crate::middleware::AuthContext;
use crate::models::response::{json_error_msg, json_message, json_ok};
use crate::models::{AdminRegisterRequest, AdminUpdateRequest};

/// POST /admin/register — like /register, but may set the admin flag.
pub async fn register(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<AdminRegisterRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(e),
    };
    handle_register(&state, body, ctx.login).await
}

/// GET /admin/users
pub async fn get_all(State(state): State<AppState>) -> Response {
    match state.users.get_all().await {
        Ok(users) => json_ok(users).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to get all users");
            e.into_response()
        }
    }
}

/// GET /admin/users/:login
pub async fn get_by_login(State(state): State<AppState>, Path(login): Path<String>) -> Response {
    match state.users.get_by_login(&login).await {
        Ok(user) => json_ok(user).into_response(),
        Err(e) => {
            // Unknown login maps to a descriptive 404; storage failures stay
            // generic and only the log carries the detail.
            warn!(error = %e, login = %login, "failed to get user by login");
            e.into_response()
        }
    }
}

/// PUT /admin/users/:login
pub async fn update(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<AdminUpdateRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(e),
    };
    handle_update(&state, body, ctx.login).await
}

/// DELETE /admin/users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "delete: bad id");
            return json_error_msg(StatusCode::BAD_REQUEST, ERR_UUID);
        }
    };

    match state.users.delete(id).await {
        Ok(()) => json_message(MSG_USER_DELETED).into_response(),
        Err(e @ AppError::NotFound { .. }) => {
            warn!(error = %e, "delete: user not found");
            e.into_response()
        }
        Err(e) => {
            warn!(error = %e, "delete: service failed");
            json_error_msg(StatusCode::INTERNAL_SERVER_ERROR, ERR_DELETE_FAILED)
        }
    }
}
