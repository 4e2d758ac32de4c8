//! Testing utilities for impersonation
//!
//! In-memory stand-ins for every collaborator the
//! [`ImpersonationManager`](crate::ImpersonationManager) needs, so
//! applications can exercise their impersonation flows without a real session
//! backend or authentication guard.
//!
//! # Example
//!
//! ```rust
//! use tideway_impersonate::testing::{
//!     InMemoryIdentityProvider, InMemoryUserDirectory, MemorySession, TestUser,
//! };
//! use tideway_impersonate::{ImpersonateConfig, ImpersonationManager};
//!
//! # tokio_test_block(async {
//! let admin = TestUser::admin("1");
//! let customer = TestUser::new("2");
//! let directory = InMemoryUserDirectory::from_users([admin.clone(), customer.clone()]);
//!
//! let manager = ImpersonationManager::new(
//!     MemorySession::new(),
//!     InMemoryIdentityProvider::logged_in(admin.clone()),
//!     directory,
//!     ImpersonateConfig::default(),
//! );
//!
//! manager.take(&admin, &customer).await.unwrap();
//! assert_eq!(manager.auth().current_id().as_deref(), Some("2"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod fakes;
mod fixtures;

pub use fakes::{InMemoryIdentityProvider, InMemoryUserDirectory, MemorySession, RecordingEventSink};
pub use fixtures::{TestUser, TestUserBuilder, fake};
