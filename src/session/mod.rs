//! Session storage for impersonation state.
//!
//! [`InMemorySessionStore`] is a [`SessionStore`](crate::traits::session::SessionStore)
//! backend; [`StoredSession`] binds one session id of any backend to the
//! caller-scoped [`Session`](crate::traits::session::Session) interface the
//! impersonation manager reads and writes.

mod config;
mod in_memory;
mod stored;

pub use config::SessionConfig;
pub use in_memory::InMemorySessionStore;
pub use stored::StoredSession;
