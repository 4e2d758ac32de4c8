//! Impersonation event sinks
//!
//! - `TracingEventSink` - Logs every transition (the default)
//! - `BroadcastEventSink` - Fans events out to tokio broadcast subscribers
//! - `NoopEventSink` - Drops events
//!
//! # Example
//!
//! ```rust,ignore
//! use tideway_impersonate::events::BroadcastEventSink;
//!
//! let sink = BroadcastEventSink::new(64);
//! let mut rx = sink.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(event) = rx.recv().await {
//!         audit_log.record(event.name(), event.impersonator().id()).await;
//!     }
//! });
//! ```

mod broadcast;
mod log;

pub use broadcast::BroadcastEventSink;
pub use log::{NoopEventSink, TracingEventSink};

pub use crate::traits::events::{EventSink, ImpersonationEvent};
