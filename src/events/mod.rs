//! Registration events: best-effort publish to the Redis topic.
//!
//! Handlers never publish inline. They submit to a bounded queue drained by a
//! single worker task; a full queue or a failed publish is logged and the
//! event is dropped. Delivery is at-most-once by design.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::repositories::RedisRepository;

const QUEUE_CAPACITY: usize = 64;

/// Emitted once per successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegisteredEvent {
    pub user_id: String,
    pub login: String,
    pub time: String,
}

impl UserRegisteredEvent {
    pub fn new(user_id: Uuid, login: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            login: login.to_string(),
            time: Utc::now().to_rfc3339(),
        }
    }
}

/// Handle to the event queue. Cheap to clone; shared through `AppState`.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<UserRegisteredEvent>,
}

impl EventPublisher {
    /// Spawn the worker draining the queue into the Redis topic.
    pub fn spawn(repo: RedisRepository, topic: String) -> Self {
        let (tx, mut rx) = mpsc::channel::<UserRegisteredEvent>(QUEUE_CAPACITY);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let payload = match serde_json::to_string(&event) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, login = %event.login, "failed to encode registration event");
                        continue;
                    }
                };
                if let Err(e) = repo.publish(&topic, &payload).await {
                    warn!(error = %e, login = %event.login, "registration event publish failed, dropped");
                }
            }
        });
        Self { tx }
    }

    /// Submit without blocking the request path; a full queue drops the event.
    pub fn submit(&self, event: UserRegisteredEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "registration event queue full, dropped");
        }
    }
}
