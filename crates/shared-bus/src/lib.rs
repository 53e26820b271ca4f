//! # Shared Bus
//!
//! Fans committed [`LogisticsEvent`]s out to in-process listeners: the
//! runtime's audit log, tests, or anything else that wants to follow the
//! STT lifecycle without polling the store.
//!
//! ```text
//!   LintasService ──commit──► EventSink ──publish──► InMemoryEventBus
//!                                                        │
//!                         ┌──────────────────────────────┼───────────────┐
//!                         ▼                              ▼               ▼
//!                 Subscription(all)         Subscription(Fleet)    EventStream
//! ```
//!
//! Publishing never blocks. A subscriber that falls more than the channel
//! capacity behind loses the oldest events and sees the gap in
//! [`Subscription::missed`].

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, LogisticsEvent};
pub use publisher::{BusStats, EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Events buffered per subscriber before the oldest are overwritten.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
