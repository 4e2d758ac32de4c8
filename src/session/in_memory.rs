use crate::error::Result;
use crate::session::SessionConfig;
use crate::traits::session::{SessionData, SessionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// In-memory session backend
///
/// Suitable for development, tests and single-instance deployments: sessions
/// are lost on restart and not shared across instances.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
    default_ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    pub fn with_config(config: &SessionConfig) -> Self {
        Self::new(config.default_ttl())
    }

    /// TTL given to sessions opened against this store.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Number of stored sessions, expired ones included until cleaned up.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                None => return Ok(None),
                Some(session) if !session.is_expired() => return Ok(Some(session.clone())),
                Some(_) => {}
            }
        }

        self.sessions.write().await.remove(session_id);
        tracing::debug!(
            target: "impersonate.session",
            session_id = %session_id,
            "Dropped expired session on load"
        );
        Ok(None)
    }

    async fn save(&self, session_id: &str, data: SessionData) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::debug!(
                target: "impersonate.session",
                removed,
                "Cleaned up expired sessions"
            );
        }
        Ok(removed)
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_config(&SessionConfig::default())
    }
}
