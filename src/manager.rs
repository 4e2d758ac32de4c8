//! Session-backed impersonation.
//!
//! An actor (usually an administrator) takes over another user's identity and
//! later leaves it again. While impersonating, the caller's session holds the
//! actor's id under the configured session key, and the identity provider has
//! the *target* logged in. The key's presence is the only impersonation state.
//!
//! ```text
//!            take(actor, target)
//!   Normal ───────────────────────▶ Impersonating
//!     ▲                                   │
//!     └───────────── leave() ─────────────┘
//!     └───────────── clear() ─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tideway_impersonate::{ImpersonationContext, ImpersonateConfig};
//!
//! // Once, at startup
//! let context = ImpersonationContext::new(user_directory, ImpersonateConfig::from_env());
//!
//! // Per request
//! let manager = context.manager(session, auth_guard);
//! let token = manager.take(&admin, &customer).await?;
//! let redirect = manager.take_redirect_to();
//!
//! // Later
//! let token = manager.leave().await?;
//! ```

use crate::config::ImpersonateConfig;
use crate::error::{ImpersonateError, Result};
use crate::events::TracingEventSink;
use crate::redirect::{NamedRoutes, RouteResolver, resolve_redirect_target};
use crate::traits::events::{EventSink, ImpersonationEvent};
use crate::traits::identity::{AuthToken, Identity, IdentityProvider, UserDirectory};
use crate::traits::session::Session;
use std::sync::Arc;

/// Application-wide collaborators shared by every request's manager.
pub struct ImpersonationContext<U: Identity> {
    directory: Arc<dyn UserDirectory<User = U>>,
    events: Arc<dyn EventSink<U>>,
    routes: Arc<dyn RouteResolver>,
    config: ImpersonateConfig,
}

impl<U: Identity> Clone for ImpersonationContext<U> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            events: Arc::clone(&self.events),
            routes: Arc::clone(&self.routes),
            config: self.config.clone(),
        }
    }
}

impl<U: Identity> ImpersonationContext<U> {
    /// Events go to [`TracingEventSink`] and no routes are registered until
    /// configured otherwise.
    pub fn new<D>(directory: D, config: ImpersonateConfig) -> Self
    where
        D: UserDirectory<User = U> + 'static,
    {
        Self {
            directory: Arc::new(directory),
            events: Arc::new(TracingEventSink),
            routes: Arc::new(NamedRoutes::default()),
            config,
        }
    }

    #[must_use]
    pub fn with_events<E>(mut self, events: E) -> Self
    where
        E: EventSink<U> + 'static,
    {
        self.events = Arc::new(events);
        self
    }

    #[must_use]
    pub fn with_routes<R>(mut self, routes: R) -> Self
    where
        R: RouteResolver + 'static,
    {
        self.routes = Arc::new(routes);
        self
    }

    pub fn config(&self) -> &ImpersonateConfig {
        &self.config
    }

    /// Build the manager for one caller.
    pub fn manager<S, P>(&self, session: S, auth: P) -> ImpersonationManager<S, P>
    where
        S: Session,
        P: IdentityProvider<User = U>,
    {
        ImpersonationManager {
            session,
            auth,
            context: self.clone(),
        }
    }
}

/// Impersonation state machine for a single caller's session.
pub struct ImpersonationManager<S, P>
where
    S: Session,
    P: IdentityProvider,
{
    session: S,
    auth: P,
    context: ImpersonationContext<P::User>,
}

impl<S, P> ImpersonationManager<S, P>
where
    S: Session,
    P: IdentityProvider,
{
    /// Shorthand for a one-off manager with default events and routes.
    pub fn new<D>(session: S, auth: P, directory: D, config: ImpersonateConfig) -> Self
    where
        D: UserDirectory<User = P::User> + 'static,
    {
        ImpersonationContext::new(directory, config).manager(session, auth)
    }

    /// Whether the session holds an impersonation record.
    pub async fn is_impersonating(&self) -> Result<bool> {
        self.session.has(self.session_key()).await
    }

    /// Id of the user who started the current impersonation.
    pub async fn impersonator_id(&self) -> Result<Option<String>> {
        self.session.get(self.session_key()).await
    }

    /// The user who started the current impersonation.
    ///
    /// # Errors
    ///
    /// [`ImpersonateError::IdentityNotFound`] when the stored id no longer
    /// belongs to a user.
    pub async fn impersonator(&self) -> Result<Option<P::User>> {
        match self.impersonator_id().await? {
            Some(id) => self.find_user(&id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Start impersonating `target` as `actor`, returning the target's token.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// [`AlreadyImpersonating`], [`CantImpersonateSelf`],
    /// [`CantBeImpersonated`], then [`CantImpersonate`].
    ///
    /// [`AlreadyImpersonating`]: ImpersonateError::AlreadyImpersonating
    /// [`CantImpersonateSelf`]: ImpersonateError::CantImpersonateSelf
    /// [`CantBeImpersonated`]: ImpersonateError::CantBeImpersonated
    /// [`CantImpersonate`]: ImpersonateError::CantImpersonate
    pub async fn take(&self, actor: &P::User, target: &P::User) -> Result<AuthToken> {
        if self.is_impersonating().await? {
            return Err(reject(actor, target, ImpersonateError::AlreadyImpersonating));
        }
        if actor.id() == target.id() {
            return Err(reject(actor, target, ImpersonateError::CantImpersonateSelf));
        }
        if !target.can_be_impersonated() {
            return Err(reject(actor, target, ImpersonateError::CantBeImpersonated));
        }
        if !actor.can_impersonate() {
            return Err(reject(actor, target, ImpersonateError::CantImpersonate));
        }

        self.session
            .put(self.session_key(), actor.id().to_string())
            .await?;

        let token = match self.switch_to(target).await {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(
                    target: "impersonate.take",
                    impersonator_id = %actor.id(),
                    impersonated_id = %target.id(),
                    error = %err,
                    "Login as impersonation target failed"
                );
                // Keep the record consistent with who is logged in
                if let Err(rollback_err) = self.session.forget(self.session_key()).await {
                    tracing::error!(
                        target: "impersonate.take",
                        impersonator_id = %actor.id(),
                        error = %rollback_err,
                        "Failed to remove impersonation record after failed login"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            target: "impersonate.take",
            impersonator_id = %actor.id(),
            impersonated_id = %target.id(),
            "Impersonation started"
        );

        self.context.events.emit(ImpersonationEvent::Take {
            impersonator: actor.clone(),
            impersonated: target.clone(),
        });

        Ok(token)
    }

    /// Stop impersonating and log the original actor back in.
    ///
    /// The record is only removed once the actor's login succeeded; on any
    /// failure it stays in place so the call can be retried, or the session
    /// reset with [`clear`](Self::clear).
    pub async fn leave(&self) -> Result<AuthToken> {
        let Some(impersonator_id) = self.impersonator_id().await? else {
            tracing::warn!(
                target: "impersonate.rejected",
                reason = "not_impersonating",
                "Leave rejected: not impersonating"
            );
            return Err(ImpersonateError::NotImpersonating);
        };

        let impersonated = self.auth.current_user().await?.ok_or_else(|| {
            ImpersonateError::unauthenticated("No authenticated user while impersonating")
        })?;
        let impersonator = self.find_user(&impersonator_id).await?;

        let token = self.switch_to(&impersonator).await?;
        self.clear().await?;

        tracing::info!(
            target: "impersonate.leave",
            impersonator_id = %impersonator.id(),
            impersonated_id = %impersonated.id(),
            "Impersonation ended"
        );

        self.context.events.emit(ImpersonationEvent::Leave {
            impersonator,
            impersonated,
        });

        Ok(token)
    }

    /// Remove the impersonation record without touching authentication.
    pub async fn clear(&self) -> Result<()> {
        self.session.forget(self.session_key()).await?;
        tracing::debug!(target: "impersonate.clear", "Impersonation record cleared");
        Ok(())
    }

    /// Session key the record is stored under.
    pub fn session_key(&self) -> &str {
        &self.context.config.session_key
    }

    /// Where to send the caller after [`take`](Self::take).
    pub fn take_redirect_to(&self) -> String {
        self.resolve_redirect_target(&self.context.config.take_redirect_to)
    }

    /// Where to send the caller after [`leave`](Self::leave).
    pub fn leave_redirect_to(&self) -> String {
        self.resolve_redirect_target(&self.context.config.leave_redirect_to)
    }

    /// Resolve a route name, or return `route_or_uri` unchanged.
    pub fn resolve_redirect_target(&self, route_or_uri: &str) -> String {
        resolve_redirect_target(self.context.routes.as_ref(), route_or_uri)
    }

    pub fn config(&self) -> &ImpersonateConfig {
        &self.context.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn auth(&self) -> &P {
        &self.auth
    }

    async fn switch_to(&self, user: &P::User) -> Result<AuthToken> {
        self.auth.logout().await?;
        self.auth.login(user).await
    }

    async fn find_user(&self, id: &str) -> Result<P::User> {
        self.context
            .directory
            .find_by_id(id)
            .await?
            .ok_or_else(|| ImpersonateError::identity_not_found(id))
    }
}

fn reject<U: Identity>(actor: &U, target: &U, err: ImpersonateError) -> ImpersonateError {
    let reason = match &err {
        ImpersonateError::AlreadyImpersonating => "already_impersonating",
        ImpersonateError::CantImpersonateSelf => "self_impersonation",
        ImpersonateError::CantBeImpersonated => "target_protected",
        ImpersonateError::CantImpersonate => "actor_not_allowed",
        _ => "other",
    };
    tracing::warn!(
        target: "impersonate.rejected",
        impersonator_id = %actor.id(),
        impersonated_id = %target.id(),
        reason,
        "Impersonation rejected: {err}"
    );
    err
}
