//! JWT-backed identity switching.
//!
//! [`JwtIdentityProvider`] is a request-scoped authentication guard: it starts
//! with whoever the incoming request authenticated as, and every `login` issues
//! a signed access token for the new user. Stateless JWT auth has no server-side
//! logout, so `logout` only forgets the user for the rest of the request.
//!
//! # Example
//!
//! ```rust,ignore
//! use tideway_impersonate::jwt::{JwtIdentityProvider, JwtIssuerConfig, JwtTokenIssuer};
//!
//! let issuer = Arc::new(JwtTokenIssuer::new(JwtIssuerConfig::with_secret(secret, "my-app")));
//!
//! // Per request, after the JWT middleware resolved `user`
//! let auth = JwtIdentityProvider::new(issuer.clone(), Some(user));
//! let manager = context.manager(session, auth);
//! let token = manager.take(&admin, &customer).await?;
//! ```

use crate::error::{ImpersonateError, Result};
use crate::traits::identity::{AuthToken, Identity, IdentityProvider};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Configuration for token issuance.
#[derive(Clone)]
pub struct JwtIssuerConfig {
    secret: Vec<u8>,
    /// Token issuer (iss claim)
    pub issuer: String,
    /// Token audience (aud claim)
    pub audience: Option<String>,
    /// Access token expiry (default: 15 minutes)
    pub access_token_ttl: Duration,
}

impl JwtIssuerConfig {
    /// HS256 config with a shared secret.
    pub fn with_secret(secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into_bytes(),
            issuer: issuer.into(),
            audience: None,
            access_token_ttl: Duration::from_secs(15 * 60),
        }
    }

    #[must_use]
    pub fn audience(mut self, aud: impl Into<String>) -> Self {
        self.audience = Some(aud.into());
        self
    }

    #[must_use]
    pub fn access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }
}

/// Claims carried by issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub iss: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: u64,
    pub iat: u64,
    /// Unique token id
    pub jti: String,
}

/// Signs and verifies HS256 access tokens.
pub struct JwtTokenIssuer {
    config: JwtIssuerConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenIssuer {
    pub fn new(config: JwtIssuerConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.secret);
        let decoding_key = DecodingKey::from_secret(&config.secret);
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue an access token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<AuthToken> {
        let now = current_timestamp();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: now + self.config.access_token_ttl.as_secs(),
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(AuthToken::new)
            .map_err(|e| ImpersonateError::internal(format!("Failed to encode access token: {}", e)))
    }

    /// Verify a token's signature, expiry, issuer and audience.
    pub fn verify(&self, token: &AuthToken) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        match &self.config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        decode::<AccessClaims>(token.as_str(), &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| ImpersonateError::unauthenticated(format!("Invalid token: {}", e)))
    }
}

/// Request-scoped guard issuing a JWT on every login.
pub struct JwtIdentityProvider<U> {
    issuer: Arc<JwtTokenIssuer>,
    current: RwLock<Option<U>>,
}

impl<U: Identity> JwtIdentityProvider<U> {
    pub fn new(issuer: Arc<JwtTokenIssuer>, current: Option<U>) -> Self {
        Self {
            issuer,
            current: RwLock::new(current),
        }
    }

    fn read_current(&self) -> Result<Option<U>> {
        self.current
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| ImpersonateError::internal("Identity lock poisoned"))
    }

    fn set_current(&self, user: Option<U>) -> Result<()> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| ImpersonateError::internal("Identity lock poisoned"))?;
        *guard = user;
        Ok(())
    }
}

#[async_trait]
impl<U: Identity> IdentityProvider for JwtIdentityProvider<U> {
    type User = U;

    async fn current_user(&self) -> Result<Option<U>> {
        self.read_current()
    }

    async fn logout(&self) -> Result<()> {
        if let Some(user) = self.read_current()? {
            tracing::debug!(target: "impersonate.jwt", user_id = %user.id(), "Logged out");
        }
        self.set_current(None)
    }

    async fn login(&self, user: &U) -> Result<AuthToken> {
        let token = self.issuer.issue(user.id())?;
        self.set_current(Some(user.clone()))?;
        tracing::debug!(target: "impersonate.jwt", user_id = %user.id(), "Issued access token");
        Ok(token)
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestUser;

    fn issuer() -> Arc<JwtTokenIssuer> {
        Arc::new(JwtTokenIssuer::new(JwtIssuerConfig::with_secret(
            "test-secret-that-is-long-enough-for-hs256",
            "tideway-test",
        )))
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer();
        let token = issuer.issue("user-42").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert_eq!(claims.iss, "tideway-test");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_foreign_issuer() {
        let other = JwtTokenIssuer::new(JwtIssuerConfig::with_secret(
            "test-secret-that-is-long-enough-for-hs256",
            "someone-else",
        ));
        let token = other.issue("user-42").unwrap();

        let err = issuer().verify(&token).unwrap_err();
        assert!(matches!(err, ImpersonateError::Unauthenticated(_)));
    }

    #[test]
    fn test_audience_round_trip() {
        let issuer = JwtTokenIssuer::new(
            JwtIssuerConfig::with_secret("another-secret-of-decent-length", "tideway-test")
                .audience("admin-panel"),
        );
        let claims = issuer.verify(&issuer.issue("7").unwrap()).unwrap();
        assert_eq!(claims.aud.as_deref(), Some("admin-panel"));
    }

    #[tokio::test]
    async fn test_provider_login_switches_user() {
        let issuer = issuer();
        let provider = JwtIdentityProvider::new(issuer.clone(), Some(TestUser::admin("1")));

        provider.logout().await.unwrap();
        assert!(provider.current_user().await.unwrap().is_none());

        let token = provider.login(&TestUser::new("2")).await.unwrap();
        assert_eq!(provider.current_user().await.unwrap().unwrap().id, "2");
        assert_eq!(issuer.verify(&token).unwrap().sub, "2");
    }
}
