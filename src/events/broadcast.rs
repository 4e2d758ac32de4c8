use crate::traits::events::{EventSink, ImpersonationEvent};
use crate::traits::identity::Identity;
use tokio::sync::broadcast;

/// Publishes events on a tokio broadcast channel.
///
/// Emitting with no subscribers drops the event. Slow subscribers observe
/// `RecvError::Lagged` once they fall `capacity` events behind.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink<U> {
    sender: broadcast::Sender<ImpersonationEvent<U>>,
}

impl<U: Identity> BroadcastEventSink<U> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImpersonationEvent<U>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<U: Identity> EventSink<U> for BroadcastEventSink<U> {
    fn emit(&self, event: ImpersonationEvent<U>) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            tracing::trace!(
                target: "impersonate.event",
                event = name,
                "No subscribers for impersonation event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestUser;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let sink = BroadcastEventSink::new(8);
        let mut rx = sink.subscribe();

        let admin = TestUser::admin("1");
        let user = TestUser::new("2");
        sink.emit(ImpersonationEvent::Take {
            impersonator: admin.clone(),
            impersonated: user.clone(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "take_impersonation");
        assert_eq!(event.impersonator().id(), "1");
        assert_eq!(event.impersonated().id(), "2");
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let sink = BroadcastEventSink::new(1);
        assert_eq!(sink.subscriber_count(), 0);

        sink.emit(ImpersonationEvent::Leave {
            impersonator: TestUser::admin("1"),
            impersonated: TestUser::new("2"),
        });
    }
}
