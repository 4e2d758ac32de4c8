use crate::traits::events::{EventSink, ImpersonationEvent};
use crate::traits::identity::Identity;

/// Logs each impersonation event under the `impersonate.event` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl<U: Identity> EventSink<U> for TracingEventSink {
    fn emit(&self, event: ImpersonationEvent<U>) {
        tracing::info!(
            target: "impersonate.event",
            event = event.name(),
            impersonator_id = %event.impersonator().id(),
            impersonated_id = %event.impersonated().id(),
            "Impersonation event"
        );
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl<U: Identity> EventSink<U> for NoopEventSink {
    fn emit(&self, _event: ImpersonationEvent<U>) {}
}
