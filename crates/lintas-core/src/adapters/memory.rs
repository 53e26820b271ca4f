//! In-memory transactional store.
//!
//! All tables live behind one `parking_lot::Mutex`. A transaction stages its
//! writes in an overlay ([`UnitOfWork`]) and merges them only when the
//! closure returns `Ok`; an `Err` drops the overlay and nothing changes.
//! Holding the lock for the whole closure serializes transactions, which is
//! what makes claims race-free.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use shared_types::{
    CollectionId, DeliveryId, ManifestId, QueueEntryId, ReturnId, ShipmentId, VehicleId,
};

use crate::domain::{
    Collection, Delivery, LogisticsError, LogisticsResult, Manifest, ReturnRecord, Shipment,
    TruckQueueEntry, Vehicle, VehicleQueueEntry,
};
use crate::ports::outbound::{LogisticsStore, Repository};

/// Every table of the store. This is also the snapshot file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreTables {
    #[serde(default)]
    pub shipments: BTreeMap<ShipmentId, Shipment>,
    #[serde(default)]
    pub vehicles: BTreeMap<VehicleId, Vehicle>,
    #[serde(default)]
    pub vehicle_entries: BTreeMap<QueueEntryId, VehicleQueueEntry>,
    #[serde(default)]
    pub truck_entries: BTreeMap<QueueEntryId, TruckQueueEntry>,
    #[serde(default)]
    pub manifests: BTreeMap<ManifestId, Manifest>,
    #[serde(default)]
    pub deliveries: BTreeMap<DeliveryId, Delivery>,
    #[serde(default)]
    pub returns: BTreeMap<ReturnId, ReturnRecord>,
    #[serde(default)]
    pub collections: BTreeMap<CollectionId, Collection>,
    /// Last value handed out per sequence scope.
    #[serde(default)]
    pub counters: BTreeMap<String, u64>,
}

impl StoreTables {
    fn apply(&mut self, writes: PendingWrites) {
        merge(&mut self.shipments, writes.shipments);
        merge(&mut self.vehicles, writes.vehicles);
        merge(&mut self.vehicle_entries, writes.vehicle_entries);
        merge(&mut self.truck_entries, writes.truck_entries);
        merge(&mut self.manifests, writes.manifests);
        merge(&mut self.deliveries, writes.deliveries);
        merge(&mut self.returns, writes.returns);
        merge(&mut self.collections, writes.collections);
        self.counters.extend(writes.counters);
    }
}

fn merge<K: Ord, V>(table: &mut BTreeMap<K, V>, writes: BTreeMap<K, Option<V>>) {
    for (key, write) in writes {
        match write {
            Some(value) => {
                table.insert(key, value);
            }
            None => {
                table.remove(&key);
            }
        }
    }
}

/// One table seen through a transaction: committed rows plus staged writes.
/// A staged `None` is a delete.
struct StagedTable<'a, K, V> {
    base: &'a BTreeMap<K, V>,
    writes: BTreeMap<K, Option<V>>,
}

impl<'a, K: Ord + Clone, V: Clone> StagedTable<'a, K, V> {
    fn new(base: &'a BTreeMap<K, V>) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        match self.writes.get(key) {
            Some(staged) => staged.clone(),
            None => self.base.get(key).cloned(),
        }
    }

    fn values(&self) -> Vec<V> {
        let mut merged: BTreeMap<&K, &V> = self.base.iter().collect();
        for (key, write) in &self.writes {
            match write {
                Some(value) => {
                    merged.insert(key, value);
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_values().cloned().collect()
    }

    fn put(&mut self, key: K, value: V) {
        self.writes.insert(key, Some(value));
    }

    fn remove(&mut self, key: &K) {
        self.writes.insert(key.clone(), None);
    }
}

/// Writes detached from the borrowed base, ready to merge.
struct PendingWrites {
    shipments: BTreeMap<ShipmentId, Option<Shipment>>,
    vehicles: BTreeMap<VehicleId, Option<Vehicle>>,
    vehicle_entries: BTreeMap<QueueEntryId, Option<VehicleQueueEntry>>,
    truck_entries: BTreeMap<QueueEntryId, Option<TruckQueueEntry>>,
    manifests: BTreeMap<ManifestId, Option<Manifest>>,
    deliveries: BTreeMap<DeliveryId, Option<Delivery>>,
    returns: BTreeMap<ReturnId, Option<ReturnRecord>>,
    collections: BTreeMap<CollectionId, Option<Collection>>,
    counters: BTreeMap<String, u64>,
}

impl PendingWrites {
    fn len(&self) -> usize {
        self.shipments.len()
            + self.vehicles.len()
            + self.vehicle_entries.len()
            + self.truck_entries.len()
            + self.manifests.len()
            + self.deliveries.len()
            + self.returns.len()
            + self.collections.len()
    }
}

/// Transaction view handed to the service closures.
pub struct UnitOfWork<'a> {
    shipments: StagedTable<'a, ShipmentId, Shipment>,
    vehicles: StagedTable<'a, VehicleId, Vehicle>,
    vehicle_entries: StagedTable<'a, QueueEntryId, VehicleQueueEntry>,
    truck_entries: StagedTable<'a, QueueEntryId, TruckQueueEntry>,
    manifests: StagedTable<'a, ManifestId, Manifest>,
    deliveries: StagedTable<'a, DeliveryId, Delivery>,
    returns: StagedTable<'a, ReturnId, ReturnRecord>,
    collections: StagedTable<'a, CollectionId, Collection>,
    base_counters: &'a BTreeMap<String, u64>,
    counters: BTreeMap<String, u64>,
}

impl<'a> UnitOfWork<'a> {
    fn new(tables: &'a StoreTables) -> Self {
        Self {
            shipments: StagedTable::new(&tables.shipments),
            vehicles: StagedTable::new(&tables.vehicles),
            vehicle_entries: StagedTable::new(&tables.vehicle_entries),
            truck_entries: StagedTable::new(&tables.truck_entries),
            manifests: StagedTable::new(&tables.manifests),
            deliveries: StagedTable::new(&tables.deliveries),
            returns: StagedTable::new(&tables.returns),
            collections: StagedTable::new(&tables.collections),
            base_counters: &tables.counters,
            counters: BTreeMap::new(),
        }
    }

    fn into_writes(self) -> PendingWrites {
        PendingWrites {
            shipments: self.shipments.writes,
            vehicles: self.vehicles.writes,
            vehicle_entries: self.vehicle_entries.writes,
            truck_entries: self.truck_entries.writes,
            manifests: self.manifests.writes,
            deliveries: self.deliveries.writes,
            returns: self.returns.writes,
            collections: self.collections.writes,
            counters: self.counters,
        }
    }
}

impl Repository for UnitOfWork<'_> {
    fn shipment(&self, id: &ShipmentId) -> Option<Shipment> {
        self.shipments.get(id)
    }

    fn shipments(&self) -> Vec<Shipment> {
        self.shipments.values()
    }

    fn put_shipment(&mut self, shipment: Shipment) {
        self.shipments.put(shipment.id.clone(), shipment);
    }

    fn vehicle(&self, id: &VehicleId) -> Option<Vehicle> {
        self.vehicles.get(id)
    }

    fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.values()
    }

    fn put_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.put(vehicle.id.clone(), vehicle);
    }

    fn vehicle_entry(&self, id: &QueueEntryId) -> Option<VehicleQueueEntry> {
        self.vehicle_entries.get(id)
    }

    fn vehicle_entries(&self) -> Vec<VehicleQueueEntry> {
        self.vehicle_entries.values()
    }

    fn put_vehicle_entry(&mut self, entry: VehicleQueueEntry) {
        self.vehicle_entries.put(entry.id.clone(), entry);
    }

    fn remove_vehicle_entry(&mut self, id: &QueueEntryId) {
        self.vehicle_entries.remove(id);
    }

    fn truck_entry(&self, id: &QueueEntryId) -> Option<TruckQueueEntry> {
        self.truck_entries.get(id)
    }

    fn truck_entries(&self) -> Vec<TruckQueueEntry> {
        self.truck_entries.values()
    }

    fn put_truck_entry(&mut self, entry: TruckQueueEntry) {
        self.truck_entries.put(entry.id.clone(), entry);
    }

    fn remove_truck_entry(&mut self, id: &QueueEntryId) {
        self.truck_entries.remove(id);
    }

    fn manifest(&self, id: &ManifestId) -> Option<Manifest> {
        self.manifests.get(id)
    }

    fn manifests(&self) -> Vec<Manifest> {
        self.manifests.values()
    }

    fn put_manifest(&mut self, manifest: Manifest) {
        self.manifests.put(manifest.id.clone(), manifest);
    }

    fn remove_manifest(&mut self, id: &ManifestId) {
        self.manifests.remove(id);
    }

    fn delivery(&self, id: &DeliveryId) -> Option<Delivery> {
        self.deliveries.get(id)
    }

    fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.values()
    }

    fn put_delivery(&mut self, delivery: Delivery) {
        self.deliveries.put(delivery.id.clone(), delivery);
    }

    fn return_record(&self, id: &ReturnId) -> Option<ReturnRecord> {
        self.returns.get(id)
    }

    fn return_records(&self) -> Vec<ReturnRecord> {
        self.returns.values()
    }

    fn put_return_record(&mut self, record: ReturnRecord) {
        self.returns.put(record.id.clone(), record);
    }

    fn collection(&self, id: &CollectionId) -> Option<Collection> {
        self.collections.get(id)
    }

    fn collections(&self) -> Vec<Collection> {
        self.collections.values()
    }

    fn put_collection(&mut self, collection: Collection) {
        self.collections.put(collection.id.clone(), collection);
    }

    fn remove_collection(&mut self, id: &CollectionId) {
        self.collections.remove(id);
    }

    fn next_sequence(&mut self, scope: &str) -> u64 {
        let current = self
            .counters
            .get(scope)
            .or_else(|| self.base_counters.get(scope))
            .copied()
            .unwrap_or(0);
        let next = current + 1;
        self.counters.insert(scope.to_string(), next);
        next
    }
}

/// Mutex-guarded table set with JSON snapshot support.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<StoreTables>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_tables(tables: StoreTables) -> Self {
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Copy of the committed state.
    #[must_use]
    pub fn tables(&self) -> StoreTables {
        self.tables.lock().clone()
    }

    /// Write the committed state to `path` as JSON.
    ///
    /// The file is written next to the target first and then renamed over
    /// it, so a crash never leaves a half-written snapshot.
    pub fn snapshot_to(&self, path: &Path) -> LogisticsResult<()> {
        let json = {
            let tables = self.tables.lock();
            serde_json::to_vec_pretty(&*tables)
                .map_err(|e| LogisticsError::Store(format!("snapshot encode failed: {e}")))?
        };
        let staging = path.with_extension("tmp");
        fs::write(&staging, &json).map_err(|e| {
            LogisticsError::Store(format!("cannot write {}: {e}", staging.display()))
        })?;
        fs::rename(&staging, path).map_err(|e| {
            LogisticsError::Store(format!("cannot replace {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), bytes = json.len(), "Snapshot written");
        Ok(())
    }

    /// Load a store from a snapshot written by [`snapshot_to`](Self::snapshot_to).
    pub fn restore_from(path: &Path) -> LogisticsResult<Self> {
        let bytes = fs::read(path)
            .map_err(|e| LogisticsError::Store(format!("cannot read {}: {e}", path.display())))?;
        let tables: StoreTables = serde_json::from_slice(&bytes).map_err(|e| {
            LogisticsError::Store(format!("corrupt snapshot {}: {e}", path.display()))
        })?;
        info!(
            path = %path.display(),
            shipments = tables.shipments.len(),
            collections = tables.collections.len(),
            "Snapshot restored"
        );
        Ok(Self::from_tables(tables))
    }
}

impl LogisticsStore for InMemoryStore {
    fn transact<T, F>(&self, op: F) -> LogisticsResult<T>
    where
        F: FnOnce(&mut dyn Repository) -> LogisticsResult<T>,
    {
        let mut tables = self.tables.lock();
        let mut uow = UnitOfWork::new(&tables);
        let value = op(&mut uow)?;
        let writes = uow.into_writes();
        debug!(rows = writes.len(), "Committing transaction");
        tables.apply(writes);
        Ok(value)
    }

    fn read<T, F>(&self, op: F) -> T
    where
        F: FnOnce(&dyn Repository) -> T,
    {
        let tables = self.tables.lock();
        let view = UnitOfWork::new(&tables);
        op(&view)
    }
}
