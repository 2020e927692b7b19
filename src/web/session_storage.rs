//! Per-session key/value storage
//!
//! Server-side counterpart of the browser's `sessionStorage`: values are
//! scoped to one launcher session (`launcher_sid` cookie) and disappear when
//! the user signs out. Sessions that stay idle longer than `max_idle` are
//! pruned on the next write.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// Key under which a tenant's assigned catalog ids are stored
pub fn assigned_apps_key(tenant_id: &str) -> String {
    format!("assignedApps_{}", tenant_id)
}

struct SessionBucket {
    items: HashMap<String, String>,
    touched_at: Instant,
}

pub struct SessionStorage {
    sessions: RwLock<HashMap<String, SessionBucket>>,
    max_idle: Duration,
}

impl SessionStorage {
    pub fn new(max_idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_idle,
        }
    }

    pub async fn get_item(&self, session_id: &str, key: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let bucket = sessions.get_mut(session_id)?;
        bucket.touched_at = Instant::now();
        bucket.items.get(key).cloned()
    }

    pub async fn set_item(&self, session_id: &str, key: &str, value: &str) {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, bucket| now.duration_since(bucket.touched_at) < self.max_idle);
        if sessions.len() < before {
            tracing::debug!(pruned = before - sessions.len(), "Pruned idle sessions");
        }

        let bucket = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionBucket {
                items: HashMap::new(),
                touched_at: now,
            });
        bucket.touched_at = now;
        bucket.items.insert(key.to_string(), value.to_string());
    }

    pub async fn remove_item(&self, session_id: &str, key: &str) {
        if let Some(bucket) = self.sessions.write().await.get_mut(session_id) {
            bucket.items.remove(key);
        }
    }

    /// Drop everything stored for a session (sign-out)
    pub async fn clear_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
