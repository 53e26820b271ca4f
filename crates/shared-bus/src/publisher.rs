//! # Event Publisher
//!
//! Broadcast side of the bus, with per-topic delivery counters.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::events::{EventFilter, EventTopic, LogisticsEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;

/// Topics that events are actually published under.
const COUNTED_TOPICS: [EventTopic; 7] = [
    EventTopic::Shipment,
    EventTopic::Fleet,
    EventTopic::Manifest,
    EventTopic::Delivery,
    EventTopic::Return,
    EventTopic::Collection,
    EventTopic::Document,
];

fn slot(topic: EventTopic) -> Option<usize> {
    COUNTED_TOPICS.iter().position(|t| *t == topic)
}

/// Publishing half of the bus. Synchronous: the core emits from inside
/// ordinary (non-async) service calls.
pub trait EventPublisher: Send + Sync {
    /// Returns how many subscribers the event reached.
    fn publish(&self, event: LogisticsEvent) -> usize;

    fn stats(&self) -> BusStats;
}

/// Point-in-time counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Events handed to the bus.
    pub published: u64,
    /// Events nobody was subscribed to receive.
    pub unheard: u64,
    /// Published count per topic, in topic order; zero counts omitted.
    pub by_topic: Vec<(EventTopic, u64)>,
}

impl BusStats {
    #[must_use]
    pub fn for_topic(&self, topic: EventTopic) -> u64 {
        self.by_topic
            .iter()
            .find(|(t, _)| *t == topic)
            .map_or(0, |(_, n)| *n)
    }
}

/// `tokio::sync::broadcast` bus shared by every listener in the process.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LogisticsEvent>,
    capacity: usize,
    published: [AtomicU64; 7],
    unheard: AtomicU64,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// `capacity` is clamped to at least 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            capacity,
            published: Default::default(),
            unheard: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "Bus subscription opened");
        Subscription::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: LogisticsEvent) -> usize {
        let topic = event.topic();
        if let Some(i) = slot(topic) {
            self.published[i].fetch_add(1, Ordering::Relaxed);
        }

        // `send` only fails when there are no receivers; the event is gone.
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(?topic, receivers, "Event published");
                receivers
            }
            Err(_) => {
                self.unheard.fetch_add(1, Ordering::Relaxed);
                trace!(?topic, "Event published with no subscribers");
                0
            }
        }
    }

    fn stats(&self) -> BusStats {
        let by_topic: Vec<(EventTopic, u64)> = COUNTED_TOPICS
            .iter()
            .zip(&self.published)
            .map(|(topic, n)| (*topic, n.load(Ordering::Relaxed)))
            .filter(|(_, n)| *n > 0)
            .collect();
        BusStats {
            published: by_topic.iter().map(|(_, n)| n).sum(),
            unheard: self.unheard.load(Ordering::Relaxed),
            by_topic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{QueueEntryId, QueueKind, ReturnId};

    fn closed() -> LogisticsEvent {
        LogisticsEvent::ReturnClosed {
            return_id: ReturnId::new("ret-1"),
        }
    }

    fn released() -> LogisticsEvent {
        LogisticsEvent::QueueEntryReleased {
            entry_id: QueueEntryId::new("que-1"),
            kind: QueueKind::Vehicle,
            status: "MENUNGGU".to_string(),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_counted_as_unheard() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(closed()), 0);

        let stats = bus.stats();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.unheard, 1);
    }

    #[test]
    fn test_every_subscriber_receives_regardless_of_filter() {
        let bus = InMemoryEventBus::new();
        let _all = bus.subscribe(EventFilter::all());
        let _fleet = bus.subscribe(EventFilter::topics(vec![EventTopic::Fleet]));

        // Filtering happens on the receiving side.
        assert_eq!(bus.publish(closed()), 2);
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.stats().unheard, 0);
    }

    #[test]
    fn test_stats_break_down_by_topic() {
        let bus = InMemoryEventBus::new();
        bus.publish(closed());
        bus.publish(released());
        bus.publish(released());

        let stats = bus.stats();
        assert_eq!(stats.published, 3);
        assert_eq!(stats.for_topic(EventTopic::Fleet), 2);
        assert_eq!(stats.for_topic(EventTopic::Return), 1);
        assert_eq!(stats.for_topic(EventTopic::Collection), 0);
        assert_eq!(
            stats.by_topic,
            vec![(EventTopic::Fleet, 2), (EventTopic::Return, 1)]
        );
    }

    #[test]
    fn test_capacity_is_at_least_one() {
        assert_eq!(InMemoryEventBus::with_capacity(0).capacity(), 1);
        assert_eq!(InMemoryEventBus::default().capacity(), DEFAULT_CHANNEL_CAPACITY);
    }
}
