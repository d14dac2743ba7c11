//! Broadcast channel carrying committed market events

use fantrade_events::MarketEvent;
use tokio::sync::broadcast;

/// Default number of events buffered per subscriber
pub const DEFAULT_CAPACITY: usize = 1024;

/// Event bus for distributing committed events to live subscribers.
///
/// Publishing never blocks and never fails: with no subscribers the event is
/// simply dropped, and slow subscribers observe `Lagged`. The journal, not the
/// bus, is the durable record.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, event: MarketEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::trace!(kind, "bus: no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
