//! Session guard: bearer-token authentication plus the admin-only gate.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::handlers::http::AppState;
use crate::models::response::json_error_msg;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity attached to the request after the guard passes.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub login: String,
    pub admin: bool,
    pub jti: Uuid,
    /// Token expiry (unix seconds); logout derives the revocation TTL from it.
    pub exp: i64,
}

/// Authentication gate, terminal on the first failing step: header shape,
/// signature/expiry, jti presence, revocation list.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX));

    let token = match token {
        Some(t) => t,
        None => {
            return json_error_msg(StatusCode::UNAUTHORIZED, "missing or malformed token");
        }
    };

    let claims = match state.tokens().verify(token) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "token verification failed");
            return json_error_msg(StatusCode::UNAUTHORIZED, "invalid or expired token");
        }
    };

    let jti = match claims.jti {
        Some(jti) => jti,
        None => {
            return json_error_msg(StatusCode::UNAUTHORIZED, "token missing jti");
        }
    };

    match state.redis().is_revoked(&jti.to_string()).await {
        Ok(true) => {
            return json_error_msg(StatusCode::UNAUTHORIZED, "token revoked");
        }
        Ok(false) => {}
        Err(e) => {
            warn!(error = %e, "revocation check failed");
            return json_error_msg(StatusCode::INTERNAL_SERVER_ERROR, "internal redis error");
        }
    }

    request.extensions_mut().insert(AuthContext {
        user_id: claims.user_id,
        login: claims.login,
        admin: claims.role,
        jti,
        exp: claims.exp,
    });

    next.run(request).await
}

/// Admin gate; runs after `authenticate` on the admin routes.
pub async fn require_admin(request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<AuthContext>()
        .map(|ctx| ctx.admin)
        .unwrap_or(false);

    if !is_admin {
        return json_error_msg(StatusCode::FORBIDDEN, "admin only");
    }

    next.run(request).await
}
