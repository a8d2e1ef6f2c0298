//! Redis-backed side stores: the token revocation list, the advisory users
//! cache, and the pub/sub topic carrying registration events.

use crate::error::AppError;
use crate::models::User;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info};

use futures::StreamExt;

const BLACKLIST_PREFIX: &str = "blacklist:";
const USERS_CACHE_KEY: &str = "users";
const USERS_CACHE_TTL_SECS: u64 = 30 * 60;

fn blacklist_key(jti: &str) -> String {
    format!("{}{}", BLACKLIST_PREFIX, jti)
}

/// Redis repository: revocation entries, users cache snapshot, event topic.
#[derive(Clone)]
pub struct RedisRepository {
    client: Arc<redis::Client>,
}

impl RedisRepository {
    /// Create repository from Redis URL.
    pub fn new(redis_url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Get a multiplexed connection for commands (set, get, publish).
    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        let conn = self.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }

    /// Record a revoked jti. The entry carries the remaining token lifetime as
    /// its TTL, so it expires together with the token it guards.
    pub async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(blacklist_key(jti), "true", secs).await?;
        debug!(jti = %jti, ttl_secs = secs, "token revoked");
        Ok(())
    }

    /// Check a jti against the revocation list. A missing key means not revoked.
    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(blacklist_key(jti)).await?;
        Ok(value.as_deref() == Some("true"))
    }

    /// Store a snapshot of all users. Advisory only; no read path consumes it.
    pub async fn cache_users(&self, users: &[User]) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        let data = serde_json::to_string(users)?;
        conn.set_ex::<_, _, ()>(USERS_CACHE_KEY, data, USERS_CACHE_TTL_SECS)
            .await?;
        Ok(())
    }

    /// Publish a message to a topic (Redis PUBLISH).
    pub async fn publish(&self, topic: &str, message: &str) -> Result<u64, AppError> {
        let mut conn = self.connection().await?;
        let count: u64 = conn.publish(topic, message).await?;
        debug!(topic = %topic, count, "published");
        Ok(count)
    }

    /// Subscribe to a topic; returns a receiver that gets every message
    /// published to it. Uses a dedicated Redis connection, forwarding messages
    /// to a broadcast channel.
    pub async fn subscribe(&self, topic: &str) -> Result<broadcast::Receiver<String>, AppError> {
        let conn = self.client.get_async_connection().await?;
        let mut pubsub = conn.into_pubsub();
        pubsub.subscribe(topic).await?;
        info!(topic = %topic, "subscribed to redis topic");

        let (tx, rx) = broadcast::channel(64);
        let mut stream = pubsub.into_on_message();

        tokio::spawn(async move {
            while let Some(msg) = stream.next().await {
                if let Ok(payload) = msg.get_payload::<String>() {
                    let _ = tx.send(payload);
                }
            }
        });

        Ok(rx)
    }
}
