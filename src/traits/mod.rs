//! Trait definitions for the collaborators the impersonation manager is built on
//!
//! Applications implement these for their own session backend, authentication
//! guard and user table; in-memory versions live in [`crate::session`] and
//! [`crate::testing`].

pub mod events;
pub mod identity;
pub mod session;
