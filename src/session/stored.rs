use crate::error::Result;
use crate::session::SessionConfig;
use crate::traits::session::{Session, SessionData, SessionStore};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// A caller's view of one session held by a [`SessionStore`] backend.
///
/// The session is loaded once when opened; reads are served from that copy
/// and every write goes through to the backend immediately, so a request
/// always observes its own writes.
pub struct StoredSession<S: SessionStore> {
    store: S,
    session_id: String,
    data: Mutex<SessionData>,
    config: SessionConfig,
}

impl<S: SessionStore> StoredSession<S> {
    /// Open the session `session_id`, starting an empty one if the backend
    /// has no live session under that id.
    pub async fn open(store: S, session_id: impl Into<String>, config: SessionConfig) -> Result<Self> {
        let session_id = session_id.into();
        let data = match store.load(&session_id).await? {
            Some(data) => data,
            None => {
                tracing::debug!(
                    target: "impersonate.session",
                    session_id = %session_id,
                    "Starting new session"
                );
                SessionData::new(config.default_ttl())
            }
        };

        Ok(Self {
            store,
            session_id,
            data: Mutex::new(data),
            config,
        })
    }

    /// Start a brand new session under a random id.
    pub async fn start(store: S, config: SessionConfig) -> Result<Self> {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        Self::open(store, session_id, config).await
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Remove the whole session from the backend.
    pub async fn destroy(&self) -> Result<()> {
        let mut data = self.data.lock().await;
        *data = SessionData::new(self.config.default_ttl());
        self.store.delete(&self.session_id).await
    }

    /// Save `staged` to the backend, then make it the cached copy.
    ///
    /// The cache is left untouched when the backend rejects the write.
    async fn write_through(&self, cached: &mut SessionData, mut staged: SessionData) -> Result<()> {
        if self.config.sliding_expiration {
            staged.extend(self.config.default_ttl());
        }
        self.store.save(&self.session_id, staged.clone()).await?;
        *cached = staged;
        Ok(())
    }
}

#[async_trait]
impl<S: SessionStore> Session for StoredSession<S> {
    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.data.lock().await.contains(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let mut data = self.data.lock().await;
        let mut staged = data.clone();
        staged.set(key.to_string(), value);
        self.write_through(&mut data, staged).await
    }

    async fn forget(&self, key: &str) -> Result<()> {
        let mut data = self.data.lock().await;
        if !data.contains(key) {
            return Ok(());
        }
        let mut staged = data.clone();
        staged.remove(key);
        self.write_through(&mut data, staged).await
    }
}
