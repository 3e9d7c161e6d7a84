//! # Shared Bus - Weighbridge Notification Bus
//!
//! Carries every outbound notification of the orchestrator (state changes,
//! weight updates, completions, bridge grants, transfer outcomes) to any
//! number of in-process subscribers, typically a dashboard transport.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  subscribe()  ┌─────────────┐
//! │ Orchestrator │ ────────────→ │  Event Bus   │ ────────────→ │  Dashboard  │
//! │ Reconciler   │               │ (broadcast)  │               │  Tests      │
//! └──────────────┘               └──────────────┘               └─────────────┘
//! ```
//!
//! Delivery is best-effort: an event published with no subscriber is dropped,
//! and a lagging subscriber skips the oldest events. Nothing in the core
//! depends on a notification being observed.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, WeighbridgeEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are skipped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
