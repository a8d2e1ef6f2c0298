//! User account management service built with Rust.
//!
//! Registration, JWT login with Redis-backed token revocation, profile
//! updates, admin CRUD, and a best-effort registration event published to a
//! Redis topic.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;
pub use services::{UserService, UserValidator};

use axum::routing::{get, post, put};
use handlers::{admin, http};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let public = axum::Router::new()
        .route("/register", post(http::register))
        .route("/login", post(http::login));

    let authed = axum::Router::new()
        .route("/logout", post(http::logout))
        .route("/users/:login", put(http::update_profile))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    let admin_routes = axum::Router::new()
        .route("/register", post(admin::register))
        .route("/users", get(admin::get_all))
        .route(
            "/users/:login",
            get(admin::get_by_login)
                .put(admin::update)
                .delete(admin::delete),
        )
        .route_layer(axum::middleware::from_fn(middleware::require_admin))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    axum::Router::new()
        .route("/health", get(http::health))
        .merge(public)
        .merge(authed)
        .nest("/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
