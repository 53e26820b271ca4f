//! Outbound (Driven) ports for the Lintas core.
//!
//! These traits define what the core needs from the outside world: a
//! transactional store, a clock, identity lookup, a document renderer and
//! an event sink.

use std::sync::atomic::{AtomicU64, Ordering};

use shared_bus::LogisticsEvent;
use shared_types::{
    Actor, CollectionId, DeliveryId, ManifestId, QueueEntryId, ReturnId, ShipmentId, Timestamp,
    UserId, VehicleId,
};

use crate::domain::{
    Collection, Delivery, DocumentRef, DocumentRequest, LogisticsResult, Manifest, ReturnRecord,
    Shipment, TruckQueueEntry, Vehicle, VehicleQueueEntry,
};

/// Table access inside one transaction.
///
/// Reads see the transaction's own earlier writes. Nothing is visible to
/// other callers until the surrounding [`LogisticsStore::transact`] returns
/// `Ok`.
pub trait Repository {
    fn shipment(&self, id: &ShipmentId) -> Option<Shipment>;
    fn shipments(&self) -> Vec<Shipment>;
    fn put_shipment(&mut self, shipment: Shipment);

    fn vehicle(&self, id: &VehicleId) -> Option<Vehicle>;
    fn vehicles(&self) -> Vec<Vehicle>;
    fn put_vehicle(&mut self, vehicle: Vehicle);

    fn vehicle_entry(&self, id: &QueueEntryId) -> Option<VehicleQueueEntry>;
    fn vehicle_entries(&self) -> Vec<VehicleQueueEntry>;
    fn put_vehicle_entry(&mut self, entry: VehicleQueueEntry);
    fn remove_vehicle_entry(&mut self, id: &QueueEntryId);

    fn truck_entry(&self, id: &QueueEntryId) -> Option<TruckQueueEntry>;
    fn truck_entries(&self) -> Vec<TruckQueueEntry>;
    fn put_truck_entry(&mut self, entry: TruckQueueEntry);
    fn remove_truck_entry(&mut self, id: &QueueEntryId);

    fn manifest(&self, id: &ManifestId) -> Option<Manifest>;
    fn manifests(&self) -> Vec<Manifest>;
    fn put_manifest(&mut self, manifest: Manifest);
    fn remove_manifest(&mut self, id: &ManifestId);

    fn delivery(&self, id: &DeliveryId) -> Option<Delivery>;
    fn deliveries(&self) -> Vec<Delivery>;
    fn put_delivery(&mut self, delivery: Delivery);

    fn return_record(&self, id: &ReturnId) -> Option<ReturnRecord>;
    fn return_records(&self) -> Vec<ReturnRecord>;
    fn put_return_record(&mut self, record: ReturnRecord);

    fn collection(&self, id: &CollectionId) -> Option<Collection>;
    fn collections(&self) -> Vec<Collection>;
    fn put_collection(&mut self, collection: Collection);
    fn remove_collection(&mut self, id: &CollectionId);

    /// Next value of a monotonically increasing counter. Never reused, even
    /// if the record it numbered is deleted later.
    fn next_sequence(&mut self, scope: &str) -> u64;
}

/// Atomic unit-of-work store.
pub trait LogisticsStore: Send + Sync {
    /// Run `op` as one all-or-nothing transaction. Writes are committed only
    /// when `op` returns `Ok`; concurrent transactions are serialized.
    fn transact<T, F>(&self, op: F) -> LogisticsResult<T>
    where
        F: FnOnce(&mut dyn Repository) -> LogisticsResult<T>;

    /// Run a read-only closure against committed state.
    fn read<T, F>(&self, op: F) -> T
    where
        F: FnOnce(&dyn Repository) -> T;
}

/// Wall clock in epoch milliseconds. Every status change, history row and
/// payment is stamped from here, never from the caller.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch clocks clamp to zero.
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock that only moves when told to. Used by tests and snapshot replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: AtomicU64::new(start),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, at: Timestamp) {
        self.millis.store(at, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Resolves staff ids to actors (id, role, branch).
pub trait IdentityProvider: Send + Sync {
    fn resolve(&self, user: &UserId) -> Option<Actor>;
}

/// External document generation (PDF printouts).
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, request: &DocumentRequest) -> LogisticsResult<DocumentRef>;
}

/// Receives domain events after their transaction committed.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LogisticsEvent);
}
