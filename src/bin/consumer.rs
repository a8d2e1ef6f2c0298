//! Registration event consumer: subscribes to the events topic and logs
//! every payload it receives.

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use userapi::config::Config;
use userapi::repositories::RedisRepository;

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

    let repo = RedisRepository::new(&config.redis_url)?;
    let mut rx = repo.subscribe(&config.events_topic).await?;

    tracing::info!(topic = %config.events_topic, "consumer listening");

    loop {
        match rx.recv().await {
            Ok(payload) => tracing::info!(payload = %payload, "received registration event"),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "consumer lagged, events dropped");
            }
            Err(RecvError::Closed) => break,
        }
    }

    Ok(())
}
