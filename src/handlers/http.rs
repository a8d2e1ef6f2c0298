//! Public HTTP handlers: register, login, logout, profile update, health.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;
use validator::Validate;

use crate::auth::TokenService;
use crate::error::AppError;
use crate::events::{EventPublisher, UserRegisteredEvent};
use crate::middleware::AuthContext;
use crate::models::response::{json_created, json_error_msg, json_message, json_ok};
use crate::models::{LoginRequest, RegisterRequest, UpdateRequest, UserPayload};
use crate::repositories::RedisRepository;
use crate::services::{UserService, UserValidator};

pub const MSG_USER_REGISTERED: &str = "user registered";
pub const MSG_USER_UPDATED: &str = "user updated";
pub const MSG_USER_DELETED: &str = "user deleted";
pub const MSG_AUTHORIZED: &str = "authorization successful";
pub const MSG_LOGGED_OUT: &str = "logged out";
pub const ERR_INVALID_JSON: &str = "invalid JSON";
pub const ERR_REGISTRATION_FAILED: &str = "registration failed";
pub const ERR_LOGIN_FAILED: &str = "invalid login or password";
pub const ERR_UPDATE_FAILED: &str = "update failed";
pub const ERR_DELETE_FAILED: &str = "failed to delete user";
pub const ERR_LOGOUT_FAILED: &str = "logout failed";
pub const ERR_UUID: &str = "invalid UUID";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub validator: UserValidator,
    pub redis: RedisRepository,
    pub tokens: TokenService,
    pub events: EventPublisher,
}

impl AppState {
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
    pub fn redis(&self) -> &RedisRepository {
        &self.redis
    }
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(e),
    };
    handle_register(&state, body, "self".to_string()).await
}

/// Shared register path for the public and admin endpoints: validate, stamp
/// the creator, write, then queue the registration event.
pub(crate) async fn handle_register<T: Validate + UserPayload>(
    state: &AppState,
    payload: T,
    created_by: String,
) -> Response {
    if let Err(e) = state.validator.check_registration(&payload).await {
        return register_error(e);
    }

    let mut user = payload.into_user();
    user.created_by = created_by;
    let (id, login) = (user.id, user.login.clone());

    if let Err(e) = state.users.register(user).await {
        return register_error(e);
    }

    state.events.submit(UserRegisteredEvent::new(id, &login));

    json_created(json!({ "message": MSG_USER_REGISTERED })).into_response()
}

fn register_error(e: AppError) -> Response {
    match e {
        AppError::Validation(_) => {
            warn!("register: validation failed");
            e.into_response()
        }
        AppError::Conflict { ref value, .. } => {
            warn!(login = %value, "register: login already taken");
            json_error_msg(StatusCode::CONFLICT, ERR_REGISTRATION_FAILED)
        }
        other => {
            warn!(error = %other, "register: service failed");
            json_error_msg(StatusCode::INTERNAL_SERVER_ERROR, ERR_REGISTRATION_FAILED)
        }
    }
}

/// POST /login — on success the token travels in the Authorization header.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(e),
    };

    if let Err(e) = state.validator.check_login_request(&body) {
        warn!("login: validation failed");
        return e.into_response();
    }

    match state.users.login(&body.login, &body.password).await {
        Ok(token) => {
            let mut response = json_ok(json!({ "message": MSG_AUTHORIZED })).into_response();
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                response.headers_mut().insert(AUTHORIZATION, value);
            }
            response
        }
        Err(e) => {
            warn!(error = %e, login = %body.login, "login failed");
            json_error_msg(StatusCode::UNAUTHORIZED, ERR_LOGIN_FAILED)
        }
    }
}

/// POST /logout — blacklist the token's jti for its remaining lifetime.
pub async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Response {
    let remaining = (ctx.exp - chrono::Utc::now().timestamp()).max(1) as u64;
    let ttl = std::time::Duration::from_secs(remaining);

    match state.redis.revoke(&ctx.jti.to_string(), ttl).await {
        Ok(()) => json_message(MSG_LOGGED_OUT).into_response(),
        Err(e) => {
            warn!(error = %e, "logout failed");
            json_error_msg(StatusCode::INTERNAL_SERVER_ERROR, ERR_LOGOUT_FAILED)
        }
    }
}

/// PUT /users/:login — self-service profile update; cannot grant admin.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return invalid_json(e),
    };
    handle_update(&state, body, ctx.login).await
}

/// Shared update path: validate fields, stamp the modifier, row-locked write.
pub(crate) async fn handle_update<T: Validate + UserPayload>(
    state: &AppState,
    payload: T,
    modified_by: String,
) -> Response {
    if let Err(e) = state.validator.check_fields(&payload) {
        warn!("update: validation failed");
        return e.into_response();
    }

    let mut user = payload.into_user();
    user.modified_by = modified_by;

    match state.users.update(user).await {
        Ok(()) => json_message(MSG_USER_UPDATED).into_response(),
        Err(e @ AppError::NotFound { .. }) => {
            warn!(error = %e, "update: user not found");
            e.into_response()
        }
        Err(e) => {
            warn!(error = %e, "update: service failed");
            json_error_msg(StatusCode::INTERNAL_SERVER_ERROR, ERR_UPDATE_FAILED)
        }
    }
}

pub(crate) fn invalid_json(e: JsonRejection) -> Response {
    warn!(error = %e, "request body rejected");
    json_error_msg(StatusCode::BAD_REQUEST, ERR_INVALID_JSON)
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "userapi" })),
    )
}
