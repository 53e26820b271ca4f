//! # Logistics Events
//!
//! Defines all event types that flow through the shared bus. Every event is
//! emitted after the transaction that caused it has committed, so
//! subscribers never observe a change that was rolled back.

use serde::{Deserialize, Serialize};
use shared_types::{
    BranchId, CollectionId, CollectionStatus, DeliveryId, DeliveryStatus, ManifestId,
    ManifestStatus, QueueEntryId, QueueKind, ReturnId, Rupiah, ShipmentId, ShipmentStatus,
    UserId, VehicleId,
};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogisticsEvent {
    // =========================================================================
    // SHIPMENTS
    // =========================================================================
    /// A new STT was registered in PENDING.
    ShipmentCreated {
        shipment_id: ShipmentId,
        tracking_number: String,
        origin: BranchId,
        destination: BranchId,
    },

    /// An STT changed status, either directly or through its holder.
    ShipmentStatusChanged {
        shipment_id: ShipmentId,
        from: ShipmentStatus,
        to: ShipmentStatus,
        actor: UserId,
    },

    // =========================================================================
    // FLEET
    // =========================================================================
    /// A vehicle joined a branch queue.
    VehicleQueued {
        entry_id: QueueEntryId,
        kind: QueueKind,
        branch: BranchId,
        vehicle_id: VehicleId,
        sequence: u64,
    },

    /// A held queue entry was released (back to waiting or retired).
    QueueEntryReleased {
        entry_id: QueueEntryId,
        kind: QueueKind,
        status: String,
    },

    // =========================================================================
    // MANIFESTS
    // =========================================================================
    ManifestCreated {
        manifest_id: ManifestId,
        truck_entry: QueueEntryId,
        shipments: usize,
    },

    ManifestAdvanced {
        manifest_id: ManifestId,
        status: ManifestStatus,
    },

    ManifestDeleted { manifest_id: ManifestId },

    // =========================================================================
    // DELIVERIES
    // =========================================================================
    DeliveryDispatched {
        delivery_id: DeliveryId,
        vehicle_entry: QueueEntryId,
        shipments: usize,
    },

    DeliveryStatusChanged {
        delivery_id: DeliveryId,
        status: DeliveryStatus,
    },

    // =========================================================================
    // RETURNS
    // =========================================================================
    ReturnOpened { return_id: ReturnId, shipments: usize },

    ReturnClosed { return_id: ReturnId },

    // =========================================================================
    // COLLECTIONS
    // =========================================================================
    CollectionCreated {
        collection_id: CollectionId,
        total_billed: Rupiah,
    },

    PaymentRecorded {
        collection_id: CollectionId,
        termin: u32,
        amount: Rupiah,
    },

    CollectionStatusSet {
        collection_id: CollectionId,
        status: CollectionStatus,
    },

    /// A document was handed to the external renderer.
    DocumentRendered { kind: String, reference: String },
}

impl LogisticsEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ShipmentCreated { .. } | Self::ShipmentStatusChanged { .. } => {
                EventTopic::Shipment
            }
            Self::VehicleQueued { .. } | Self::QueueEntryReleased { .. } => EventTopic::Fleet,
            Self::ManifestCreated { .. }
            | Self::ManifestAdvanced { .. }
            | Self::ManifestDeleted { .. } => EventTopic::Manifest,
            Self::DeliveryDispatched { .. } | Self::DeliveryStatusChanged { .. } => {
                EventTopic::Delivery
            }
            Self::ReturnOpened { .. } | Self::ReturnClosed { .. } => EventTopic::Return,
            Self::CollectionCreated { .. }
            | Self::PaymentRecorded { .. }
            | Self::CollectionStatusSet { .. } => EventTopic::Collection,
            Self::DocumentRendered { .. } => EventTopic::Document,
        }
    }

    /// Name of the component that emits this event.
    #[must_use]
    pub fn source_component(&self) -> &'static str {
        match self.topic() {
            EventTopic::Shipment => "shipment",
            EventTopic::Fleet => "fleet",
            EventTopic::Manifest => "manifest",
            EventTopic::Delivery => "delivery",
            EventTopic::Return => "return",
            EventTopic::Collection => "collection",
            EventTopic::Document | EventTopic::All => "renderer",
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Shipment,
    Fleet,
    Manifest,
    Delivery,
    Return,
    Collection,
    Document,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LogisticsEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
