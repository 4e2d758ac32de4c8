//! Identity traits
//!
//! The impersonation layer never owns users. It reads them through
//! [`UserDirectory`], switches the authenticated one through
//! [`IdentityProvider`], and asks the users themselves whether they may take
//! part in impersonation via [`Identity`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A user record that can take part in impersonation.
pub trait Identity: Clone + Send + Sync + 'static {
    /// Unique key of this user.
    fn id(&self) -> &str;

    /// Whether other users may impersonate this one.
    fn can_be_impersonated(&self) -> bool {
        true
    }

    /// Whether this user may impersonate others.
    fn can_impersonate(&self) -> bool {
        true
    }
}

/// Credential returned by a successful login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

impl From<String> for AuthToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Authentication guard for the current caller.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    type User: Identity;

    /// The currently authenticated user, if any.
    async fn current_user(&self) -> Result<Option<Self::User>>;

    /// Log the current user out.
    async fn logout(&self) -> Result<()>;

    /// Log `user` in and return a fresh token for them.
    async fn login(&self, user: &Self::User) -> Result<AuthToken>;
}

/// Lookup of users by id.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    type User: Identity;

    /// Find a user by id. Returns `Ok(None)` when no such user exists.
    async fn find_by_id(&self, id: &str) -> Result<Option<Self::User>>;
}

#[async_trait]
impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    type User = T::User;

    async fn find_by_id(&self, id: &str) -> Result<Option<Self::User>> {
        (**self).find_by_id(id).await
    }
}
