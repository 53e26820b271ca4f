//! Event sink adapters.

use std::sync::Arc;

use parking_lot::Mutex;
use shared_bus::{EventPublisher, InMemoryEventBus, LogisticsEvent};
use tracing::debug;

use crate::ports::outbound::EventSink;

/// Forwards committed events to the shared broadcast bus.
#[derive(Clone)]
pub struct BusEventSink {
    bus: Arc<InMemoryEventBus>,
}

impl BusEventSink {
    #[must_use]
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }
}

impl EventSink for BusEventSink {
    fn emit(&self, event: LogisticsEvent) {
        let receivers = self.bus.publish(event);
        debug!(receivers, "Event forwarded to bus");
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: LogisticsEvent) {}
}

/// Keeps every event in memory. Used by tests to assert on emissions.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<LogisticsEvent>>,
}

impl RecordingEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<LogisticsEvent> {
        self.events.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<LogisticsEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: LogisticsEvent) {
        self.events.lock().push(event);
    }
}
