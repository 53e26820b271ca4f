//! Fleet queue manager and vehicle registry.
//!
//! The vehicle and truck queues share every operation; [`QueueTable`]
//! selects the right table for a status vocabulary so the logic is written
//! once.

use shared_bus::LogisticsEvent;
use shared_types::{
    Actor, BranchId, QueueEntryId, TruckQueueStatus, VehicleId, VehicleQueueStatus,
};
use tracing::{debug, info};

use super::{require_branch, LintasService};
use crate::domain::fleet::{next_waiting, resolve_crew, sequence_scope};
use crate::domain::{
    EnqueueRequest, Holder, LogisticsError, LogisticsResult, NewVehicle, QueueEntry, QueueQuery,
    QueueState, TruckQueueEntry, Vehicle, VehiclePatch, VehicleQueueEntry,
};
use crate::ports::inbound::FleetApi;
use crate::ports::outbound::{LogisticsStore, Repository};

/// Plates are unique across the registry, compared case-insensitively.
/// `owner` is the vehicle allowed to keep the plate it already has.
fn ensure_plate_free(
    repo: &dyn Repository,
    plate: &str,
    owner: Option<&VehicleId>,
) -> LogisticsResult<()> {
    let taken = repo
        .vehicles()
        .iter()
        .any(|v| Some(&v.id) != owner && v.plate_number.eq_ignore_ascii_case(plate));
    if taken {
        return Err(LogisticsError::validation(format!(
            "plate number {plate} is already registered"
        )));
    }
    Ok(())
}

/// Store access for one queue type.
pub(super) trait QueueTable: QueueState {
    fn get(repo: &dyn Repository, id: &QueueEntryId) -> Option<QueueEntry<Self>>;
    fn all(repo: &dyn Repository) -> Vec<QueueEntry<Self>>;
    fn put(repo: &mut dyn Repository, entry: QueueEntry<Self>);
    fn remove(repo: &mut dyn Repository, id: &QueueEntryId);
}

impl QueueTable for VehicleQueueStatus {
    fn get(repo: &dyn Repository, id: &QueueEntryId) -> Option<VehicleQueueEntry> {
        repo.vehicle_entry(id)
    }

    fn all(repo: &dyn Repository) -> Vec<VehicleQueueEntry> {
        repo.vehicle_entries()
    }

    fn put(repo: &mut dyn Repository, entry: VehicleQueueEntry) {
        repo.put_vehicle_entry(entry);
    }

    fn remove(repo: &mut dyn Repository, id: &QueueEntryId) {
        repo.remove_vehicle_entry(id);
    }
}

impl QueueTable for TruckQueueStatus {
    fn get(repo: &dyn Repository, id: &QueueEntryId) -> Option<TruckQueueEntry> {
        repo.truck_entry(id)
    }

    fn all(repo: &dyn Repository) -> Vec<TruckQueueEntry> {
        repo.truck_entries()
    }

    fn put(repo: &mut dyn Repository, entry: TruckQueueEntry) {
        repo.put_truck_entry(entry);
    }

    fn remove(repo: &mut dyn Repository, id: &QueueEntryId) {
        repo.remove_truck_entry(id);
    }
}

pub(super) fn load_entry<Q: QueueTable>(
    repo: &dyn Repository,
    id: &QueueEntryId,
) -> LogisticsResult<QueueEntry<Q>> {
    Q::get(repo, id).ok_or_else(|| LogisticsError::not_found("queue entry", id))
}

/// Whether the aggregate named by `holder` still needs its entry.
fn holder_is_active(repo: &dyn Repository, holder: &Holder) -> bool {
    match holder {
        Holder::Manifest(id) => repo
            .manifest(id)
            .is_some_and(|m| m.status != shared_types::ManifestStatus::Sampai),
        Holder::Delivery(id) => repo.delivery(id).is_some_and(|d| !d.status.is_terminal()),
    }
}

impl<S: LogisticsStore> LintasService<S> {
    fn enqueue<Q: QueueTable>(
        &self,
        actor: &Actor,
        request: EnqueueRequest,
    ) -> LogisticsResult<QueueEntry<Q>> {
        require_branch(&request.branch, "branch")?;

        let entry = self.commit(|repo, now, events| {
            let vehicle = repo
                .vehicle(&request.vehicle_id)
                .ok_or_else(|| LogisticsError::not_found("vehicle", &request.vehicle_id))?;
            if !vehicle.active {
                return Err(LogisticsError::validation(format!(
                    "vehicle {} is inactive",
                    vehicle.id
                )));
            }
            if let Some(live) = Q::all(repo)
                .into_iter()
                .find(|e| e.vehicle_id == vehicle.id && !e.status.is_terminal())
            {
                return Err(LogisticsError::DuplicateVehicle {
                    vehicle: vehicle.id.to_string(),
                    entry: live.id.to_string(),
                });
            }
            let crew = resolve_crew(&vehicle, request.crew)?;

            let sequence = repo.next_sequence(&sequence_scope(Q::KIND, &request.branch));
            let entry = QueueEntry {
                id: QueueEntryId::generate(),
                branch: request.branch,
                vehicle_id: vehicle.id,
                driver: crew.driver,
                assistant: crew.assistant,
                sequence,
                status: Q::WAITING,
                held_by: None,
                created_at: now,
                updated_at: now,
            };
            Q::put(repo, entry.clone());
            events.push(LogisticsEvent::VehicleQueued {
                entry_id: entry.id.clone(),
                kind: Q::KIND,
                branch: entry.branch.clone(),
                vehicle_id: entry.vehicle_id.clone(),
                sequence,
            });
            Ok(entry)
        })?;

        info!(
            kind = %Q::KIND,
            id = %entry.id,
            branch = %entry.branch,
            sequence = entry.sequence,
            actor = %actor.id,
            "Vehicle queued"
        );
        Ok(entry)
    }

    fn next_in_queue<Q: QueueTable>(&self, branch: &BranchId) -> LogisticsResult<QueueEntry<Q>> {
        self.store
            .read(|repo| next_waiting(Q::all(repo).iter(), branch).cloned())
            .ok_or_else(|| LogisticsError::EmptyQueue {
                kind: Q::KIND.to_string(),
                branch: branch.to_string(),
            })
    }

    fn release_entry<Q: QueueTable>(
        &self,
        actor: &Actor,
        id: &QueueEntryId,
        target: Q,
    ) -> LogisticsResult<QueueEntry<Q>> {
        let (entry, changed) = self.commit(|repo, now, events| {
            let mut entry = load_entry::<Q>(repo, id)?;
            // An outside caller may only take over from a holder that is gone.
            let stale = match entry.held_by.clone() {
                Some(holder) if !holder_is_active(&*repo, &holder) => Some(holder),
                _ => None,
            };
            let changed = entry.release(target, stale.as_ref(), now)?;
            if changed {
                Q::put(repo, entry.clone());
                events.push(LogisticsEvent::QueueEntryReleased {
                    entry_id: entry.id.clone(),
                    kind: Q::KIND,
                    status: target.to_string(),
                });
            }
            Ok((entry, changed))
        })?;

        if changed {
            info!(kind = %Q::KIND, id = %entry.id, status = %entry.status, actor = %actor.id, "Queue entry released");
        } else {
            debug!(kind = %Q::KIND, id = %entry.id, "Release was a no-op");
        }
        Ok(entry)
    }

    fn delete_entry<Q: QueueTable>(&self, actor: &Actor, id: &QueueEntryId) -> LogisticsResult<()> {
        self.commit(|repo, _now, _events| {
            let entry = load_entry::<Q>(repo, id)?;
            if entry.status.is_held() {
                let holder = entry
                    .held_by
                    .as_ref()
                    .map_or_else(|| entry.status.to_string(), ToString::to_string);
                return Err(LogisticsError::already_claimed("queue entry", id, holder));
            }
            Q::remove(repo, id);
            Ok(())
        })?;
        info!(kind = %Q::KIND, %id, actor = %actor.id, "Queue entry deleted");
        Ok(())
    }

    fn entry<Q: QueueTable>(&self, id: &QueueEntryId) -> LogisticsResult<QueueEntry<Q>> {
        self.store.read(|repo| load_entry::<Q>(repo, id))
    }

    fn list_entries<Q: QueueTable>(&self, query: &QueueQuery<Q>) -> Vec<QueueEntry<Q>> {
        let mut entries: Vec<QueueEntry<Q>> = self.store.read(|repo| {
            Q::all(repo)
                .into_iter()
                .filter(|e| query.matches(e))
                .collect()
        });
        entries.sort_by(|a, b| (&a.branch, a.sequence).cmp(&(&b.branch, b.sequence)));
        entries
    }
}

impl<S: LogisticsStore> FleetApi for LintasService<S> {
    fn register_vehicle(&self, actor: &Actor, vehicle: NewVehicle) -> LogisticsResult<Vehicle> {
        vehicle.validate()?;
        let vehicle = self.commit(|repo, _now, _events| {
            let plate = vehicle.plate_number.trim().to_string();
            ensure_plate_free(&*repo, &plate, None)?;
            let registered = Vehicle {
                id: VehicleId::generate(),
                plate_number: plate,
                branch: vehicle.branch,
                default_driver: vehicle.default_driver,
                default_assistant: vehicle.default_assistant,
                active: true,
            };
            repo.put_vehicle(registered.clone());
            Ok(registered)
        })?;
        info!(id = %vehicle.id, plate = %vehicle.plate_number, actor = %actor.id, "Vehicle registered");
        Ok(vehicle)
    }

    fn update_vehicle(
        &self,
        actor: &Actor,
        id: &VehicleId,
        patch: VehiclePatch,
    ) -> LogisticsResult<Vehicle> {
        let vehicle = self.commit(|repo, _now, _events| {
            let mut vehicle = repo
                .vehicle(id)
                .ok_or_else(|| LogisticsError::not_found("vehicle", id))?;
            vehicle.apply_patch(patch)?;
            ensure_plate_free(&*repo, &vehicle.plate_number, Some(&vehicle.id))?;
            repo.put_vehicle(vehicle.clone());
            Ok(vehicle)
        })?;
        info!(%id, actor = %actor.id, "Vehicle updated");
        Ok(vehicle)
    }

    fn vehicle(&self, id: &VehicleId) -> LogisticsResult<Vehicle> {
        self.store
            .read(|repo| repo.vehicle(id))
            .ok_or_else(|| LogisticsError::not_found("vehicle", id))
    }

    fn list_vehicles(&self, branch: Option<&BranchId>) -> Vec<Vehicle> {
        let mut vehicles: Vec<Vehicle> = self.store.read(|repo| {
            repo.vehicles()
                .into_iter()
                .filter(|v| branch.map_or(true, |b| *b == v.branch))
                .collect()
        });
        vehicles.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));
        vehicles
    }

    fn enqueue_vehicle(
        &self,
        actor: &Actor,
        request: EnqueueRequest,
    ) -> LogisticsResult<VehicleQueueEntry> {
        self.enqueue(actor, request)
    }

    fn next_vehicle(&self, branch: &BranchId) -> LogisticsResult<VehicleQueueEntry> {
        self.next_in_queue(branch)
    }

    fn release_vehicle(
        &self,
        actor: &Actor,
        id: &QueueEntryId,
        target: VehicleQueueStatus,
    ) -> LogisticsResult<VehicleQueueEntry> {
        self.release_entry(actor, id, target)
    }

    fn delete_vehicle_entry(&self, actor: &Actor, id: &QueueEntryId) -> LogisticsResult<()> {
        self.delete_entry::<VehicleQueueStatus>(actor, id)
    }

    fn vehicle_entry(&self, id: &QueueEntryId) -> LogisticsResult<VehicleQueueEntry> {
        self.entry(id)
    }

    fn list_vehicle_entries(
        &self,
        query: &QueueQuery<VehicleQueueStatus>,
    ) -> Vec<VehicleQueueEntry> {
        self.list_entries(query)
    }

    fn enqueue_truck(
        &self,
        actor: &Actor,
        request: EnqueueRequest,
    ) -> LogisticsResult<TruckQueueEntry> {
        self.enqueue(actor, request)
    }

    fn next_truck(&self, branch: &BranchId) -> LogisticsResult<TruckQueueEntry> {
        self.next_in_queue(branch)
    }

    fn release_truck(
        &self,
        actor: &Actor,
        id: &QueueEntryId,
        target: TruckQueueStatus,
    ) -> LogisticsResult<TruckQueueEntry> {
        self.release_entry(actor, id, target)
    }

    fn delete_truck_entry(&self, actor: &Actor, id: &QueueEntryId) -> LogisticsResult<()> {
        self.delete_entry::<TruckQueueStatus>(actor, id)
    }

    fn truck_entry(&self, id: &QueueEntryId) -> LogisticsResult<TruckQueueEntry> {
        self.entry(id)
    }

    fn list_truck_entries(&self, query: &QueueQuery<TruckQueueStatus>) -> Vec<TruckQueueEntry> {
        self.list_entries(query)
    }
}
