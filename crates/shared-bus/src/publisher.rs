//! # Publishing
//!
//! The bus is a `tokio::sync::broadcast` channel; every subscription gets
//! its own receiver and filters on its side.

use crate::events::{EventFilter, WeighbridgeEvent};
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the bus as seen by the orchestrator.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Returns how many subscribers the event reached.
    async fn publish(&self, event: WeighbridgeEvent) -> usize;

    fn events_published(&self) -> u64;
}

pub struct InMemoryEventBus {
    sender: broadcast::Sender<WeighbridgeEvent>,
    published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` events are buffered per subscriber before it lags.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
            capacity,
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, sessions = filter.sessions.len(), "Subscriber attached");
        Subscription::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Synchronous publish, for observers called outside an async context.
    pub fn send(&self, event: WeighbridgeEvent) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();
        let session_id = event.session_id();

        // A send error only means nobody is listening.
        let reached = self.sender.send(event).unwrap_or(0);
        trace!(topic = ?topic, session_id = ?session_id, reached, "Event published");
        reached
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: WeighbridgeEvent) -> usize {
        self.send(event)
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
