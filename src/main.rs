//! Entry point: load config, wire dependencies, bootstrap the admin, serve.

use chrono::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use userapi::auth::TokenService;
use userapi::config::Config;
use userapi::db;
use userapi::events::EventPublisher;
use userapi::repositories::RedisRepository;
use userapi::services::{UserService, UserValidator};
use userapi::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    let redis = RedisRepository::new(&config.redis_url)?;
    let tokens = TokenService::new(
        config.jwt_secret.clone(),
        Duration::minutes(config.jwt_exp_minutes),
    );
    let users = UserService::new(db_pool.clone(), redis.clone(), tokens.clone());
    let validator = UserValidator::new(db_pool.clone());
    let events = EventPublisher::spawn(redis.clone(), config.events_topic.clone());

    // Must hold before any traffic: at least one admin exists.
    users
        .ensure_default_admin()
        .await
        .map_err(|e| anyhow::anyhow!("default admin bootstrap: {}", e))?;

    let state = AppState {
        users,
        validator,
        redis,
        tokens,
        events,
    };

    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
