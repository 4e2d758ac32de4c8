//! Event sink trait for impersonation transitions
//!
//! Sinks are fire-and-forget: the manager never inspects what a sink does with
//! an event, and a sink cannot fail the transition that produced it.

use crate::traits::identity::Identity;
use std::sync::Arc;

/// A completed impersonation transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpersonationEvent<U> {
    /// `impersonator` started acting as `impersonated`.
    Take { impersonator: U, impersonated: U },
    /// `impersonator` stopped acting as `impersonated`.
    Leave { impersonator: U, impersonated: U },
}

impl<U> ImpersonationEvent<U> {
    /// Stable event name, for sinks that dispatch by name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Take { .. } => "take_impersonation",
            Self::Leave { .. } => "leave_impersonation",
        }
    }

    pub fn impersonator(&self) -> &U {
        match self {
            Self::Take { impersonator, .. } | Self::Leave { impersonator, .. } => impersonator,
        }
    }

    pub fn impersonated(&self) -> &U {
        match self {
            Self::Take { impersonated, .. } | Self::Leave { impersonated, .. } => impersonated,
        }
    }
}

/// Receiver of impersonation events
pub trait EventSink<U: Identity>: Send + Sync {
    fn emit(&self, event: ImpersonationEvent<U>);
}

impl<U: Identity, T: EventSink<U> + ?Sized> EventSink<U> for Arc<T> {
    fn emit(&self, event: ImpersonationEvent<U>) {
        (**self).emit(event)
    }
}
