//! Event subscriber trait for async event handling

use crate::channel::EventBus;
use crate::error::BusError;
use async_trait::async_trait;
use fantrade_events::MarketEvent;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Trait for event subscribers
///
/// Subscribers receive events from the bus and process them asynchronously.
/// Each subscriber should be idempotent (handle duplicate events gracefully).
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Subscriber name (for logging)
    fn name(&self) -> &str;

    /// Handle one market event
    async fn handle(&self, event: &MarketEvent) -> Result<(), BusError>;
}

/// Drive `subscriber` from `bus` on a background task until the bus closes.
///
/// Handler errors and lag are logged; neither stops the loop.
pub fn spawn_subscriber(bus: &EventBus, subscriber: Arc<dyn EventSubscriber>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = subscriber.handle(&event).await {
                        tracing::warn!(
                            subscriber = subscriber.name(),
                            kind = event.kind(),
                            error = %e,
                            "subscriber failed to handle event"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(subscriber = subscriber.name(), skipped, "subscriber lagged");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(subscriber = subscriber.name(), "bus closed");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantrade_core::Amount;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventSubscriber for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn handle(&self, event: &MarketEvent) -> Result<(), BusError> {
            if let Some(user) = event.user_id() {
                self.seen.lock().unwrap().push(user.to_string());
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_spawned_subscriber_receives_events() {
        let bus = EventBus::new(16);
        let recorder = Arc::new(Recorder::default());
        let handle = spawn_subscriber(&bus, recorder.clone());

        bus.publish(MarketEvent::user_registered("alice", Amount::ZERO));
        bus.publish(MarketEvent::user_registered("bob", Amount::ZERO));

        // Closing the last sender ends the subscriber loop
        drop(bus);
        handle.await.unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec!["alice", "bob"]);
    }
}
