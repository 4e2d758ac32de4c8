//! Tideway Impersonate - Let administrators act as another user
//!
//! An authenticated actor takes over a target user's identity, acts as them,
//! and later switches back. The impersonator's id lives in the caller's session
//! while the authentication guard has the target logged in.
//!
//! # Features
//!
//! - **State machine**: guarded `take` / `leave` transitions with a fixed
//!   rejection order, plus an unguarded `clear` for administrative resets
//! - **Pluggable collaborators**: bring your own session backend,
//!   authentication guard and user table through small traits
//! - **Events**: fire-and-forget notifications for audit trails
//! - **Redirects**: route-name-or-URI resolution for post-switch redirects
//! - **JWT**: an identity provider that issues signed tokens on login
//! - **Testing**: in-memory fakes for every collaborator
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tideway_impersonate::{ConfigBuilder, ImpersonationContext};
//!
//! tideway_impersonate::init_tracing();
//!
//! let config = ConfigBuilder::new().from_env().build()?;
//! let context = ImpersonationContext::new(users, config.impersonate);
//!
//! // In a request handler
//! let manager = context.manager(session, auth);
//! let token = manager.take(&admin, &customer).await?;
//! ```

#![allow(async_fn_in_trait)] // async_trait macro handles Send/Sync bounds properly

mod config;
mod error;
pub mod events;
#[cfg(feature = "jwt")]
pub mod jwt;
mod manager;
pub mod redirect;
pub mod session;
pub mod testing;
pub mod traits;
pub mod utils;

// Re-exports for public API
pub use config::{Config, ConfigBuilder, ImpersonateConfig, LoggingConfig};
pub use error::{ErrorResponse, ImpersonateError, Result};
pub use events::{BroadcastEventSink, NoopEventSink, TracingEventSink};
pub use manager::{ImpersonationContext, ImpersonationManager};
pub use redirect::{NamedRoutes, RouteResolver};
pub use session::{InMemorySessionStore, SessionConfig, StoredSession};
pub use traits::events::{EventSink, ImpersonationEvent};
pub use traits::identity::{AuthToken, Identity, IdentityProvider, UserDirectory};
pub use traits::session::{Session, SessionData, SessionStore};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "impersonate=debug")
/// - `TIDEWAY_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = utils::get_env_bool("LOG_JSON").unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing from a [`Config`]
pub fn init_tracing_with_config(config: &Config) {
    install_subscriber(EnvFilter::new(&config.logging.level), config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
