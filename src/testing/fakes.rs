use crate::error::{ImpersonateError, Result};
use crate::traits::events::{EventSink, ImpersonationEvent};
use crate::traits::identity::{AuthToken, Identity, IdentityProvider, UserDirectory};
use crate::traits::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read_lock<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ImpersonateError::internal("Test fake lock poisoned"))
}

fn write_lock<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ImpersonateError::internal("Test fake lock poisoned"))
}

/// Session held entirely in memory, for a single simulated caller.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: RwLock<HashMap<String, String>>,
    fail_next_forget: AtomicBool,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next `forget` call fail with a session error, leaving the key.
    pub fn fail_next_forget(&self) {
        self.fail_next_forget.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn has(&self, key: &str) -> Result<bool> {
        Ok(read_lock(&self.values)?.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read_lock(&self.values)?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        write_lock(&self.values)?.insert(key.to_string(), value);
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        if self.fail_next_forget.swap(false, Ordering::SeqCst) {
            return Err(ImpersonateError::session("Simulated session write failure"));
        }
        write_lock(&self.values)?.remove(key);
        Ok(())
    }
}

/// User directory backed by a map.
pub struct InMemoryUserDirectory<U> {
    users: RwLock<HashMap<String, U>>,
}

impl<U: Identity> InMemoryUserDirectory<U> {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_users(users: impl IntoIterator<Item = U>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    pub fn insert(&self, user: U) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id().to_string(), user);
    }

    /// Delete a user, e.g. to simulate an impersonator removed mid-session.
    pub fn remove(&self, id: &str) -> Option<U> {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }
}

impl<U: Identity> Default for InMemoryUserDirectory<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<U: Identity> UserDirectory for InMemoryUserDirectory<U> {
    type User = U;

    async fn find_by_id(&self, id: &str) -> Result<Option<U>> {
        Ok(read_lock(&self.users)?.get(id).cloned())
    }
}

/// Authentication guard that tracks the logged-in user and issued tokens.
pub struct InMemoryIdentityProvider<U> {
    current: RwLock<Option<U>>,
    tokens: RwLock<HashMap<String, String>>,
    logins: AtomicUsize,
    logouts: AtomicUsize,
    fail_next_login: AtomicBool,
}

impl<U: Identity> InMemoryIdentityProvider<U> {
    /// A guard with nobody logged in.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            tokens: RwLock::new(HashMap::new()),
            logins: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            fail_next_login: AtomicBool::new(false),
        }
    }

    /// A guard with `user` already logged in.
    pub fn logged_in(user: U) -> Self {
        let provider = Self::new();
        *provider
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(user);
        provider
    }

    /// Id of the logged-in user.
    pub fn current_id(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|u| u.id().to_string())
    }

    /// Id of the user a token was issued to.
    pub fn token_owner(&self, token: &AuthToken) -> Option<String> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token.as_str())
            .cloned()
    }

    /// Make the next `login` call fail with an internal error.
    pub fn fail_next_login(&self) {
        self.fail_next_login.store(true, Ordering::SeqCst);
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl<U: Identity> Default for InMemoryIdentityProvider<U> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<U: Identity> IdentityProvider for InMemoryIdentityProvider<U> {
    type User = U;

    async fn current_user(&self) -> Result<Option<U>> {
        Ok(read_lock(&self.current)?.clone())
    }

    async fn logout(&self) -> Result<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        *write_lock(&self.current)? = None;
        Ok(())
    }

    async fn login(&self, user: &U) -> Result<AuthToken> {
        if self.fail_next_login.swap(false, Ordering::SeqCst) {
            return Err(ImpersonateError::internal("Simulated login failure"));
        }

        self.logins.fetch_add(1, Ordering::SeqCst);
        let token = format!("test-token-{}", uuid::Uuid::new_v4().simple());
        write_lock(&self.tokens)?.insert(token.clone(), user.id().to_string());
        *write_lock(&self.current)? = Some(user.clone());
        Ok(AuthToken::new(token))
    }
}

/// Event sink that keeps every event for later assertions.
///
/// Clones share the same buffer.
pub struct RecordingEventSink<U> {
    events: Arc<Mutex<Vec<ImpersonationEvent<U>>>>,
}

impl<U> Clone for RecordingEventSink<U> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<U: Identity> RecordingEventSink<U> {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Events received so far, oldest first.
    pub fn events(&self) -> Vec<ImpersonationEvent<U>> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<U: Identity> Default for RecordingEventSink<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Identity> EventSink<U> for RecordingEventSink<U> {
    fn emit(&self, event: ImpersonationEvent<U>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestUser;

    fn poison<T>(lock: &RwLock<T>) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = lock.write().unwrap();
            panic!("poison the lock");
        }));
        assert!(lock.is_poisoned());
    }

    #[tokio::test]
    async fn test_poisoned_session_returns_error() {
        let session = MemorySession::new();
        session.put("k", "v".to_string()).await.unwrap();
        poison(&session.values);

        let err = session.get("k").await.unwrap_err();
        assert!(matches!(err, ImpersonateError::Internal(_)));
        assert!(session.put("k", "w".to_string()).await.is_err());

        // Inspection helpers still see the data
        assert_eq!(session.len(), 1);
    }

    #[tokio::test]
    async fn test_poisoned_provider_returns_error() {
        let provider = InMemoryIdentityProvider::logged_in(TestUser::admin("1"));
        poison(&provider.current);

        assert!(matches!(
            provider.current_user().await,
            Err(ImpersonateError::Internal(_))
        ));
        assert!(provider.login(&TestUser::new("2")).await.is_err());
        assert_eq!(provider.current_id().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_fail_next_forget_is_one_shot() {
        let session = MemorySession::new();
        session.put("k", "v".to_string()).await.unwrap();
        session.fail_next_forget();

        assert!(matches!(
            session.forget("k").await,
            Err(ImpersonateError::Session(_))
        ));
        assert!(session.has("k").await.unwrap());

        session.forget("k").await.unwrap();
        assert!(session.is_empty());
    }
}
