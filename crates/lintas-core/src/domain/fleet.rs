//! # Fleet Queues
//!
//! Two independent FIFO queues per branch: local delivery vehicles and
//! inter-branch trucks. Both share one entry shape, parameterized by the
//! status vocabulary of the queue.
//!
//! ## Holding
//!
//! A dispatch claims a MENUNGGU entry by moving it into a held status and
//! recording the holder. Only the holder (or its completion) hands it back.
//!
//! | Queue | Waiting | Held | Terminal |
//! |-------|---------|------|----------|
//! | Vehicle | MENUNGGU | LANSIR | KEMBALI |
//! | Truck | MENUNGGU | MUAT, BERANGKAT | none |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{
    BranchId, DeliveryId, ManifestId, QueueEntryId, QueueKind, Timestamp, TruckQueueStatus,
    UserId, VehicleId, VehicleQueueStatus,
};
use std::fmt::{self, Debug, Display};

use super::errors::{LogisticsError, LogisticsResult};

/// Status vocabulary of one queue type.
pub trait QueueState:
    Copy + Eq + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: QueueKind;
    const WAITING: Self;

    /// Held by a manifest or delivery.
    fn is_held(self) -> bool;

    /// The entry has left the queue for good.
    fn is_terminal(self) -> bool;

    /// Statuses a held entry may be released into.
    fn release_targets() -> &'static [Self];
}

impl QueueState for VehicleQueueStatus {
    const KIND: QueueKind = QueueKind::Vehicle;
    const WAITING: Self = Self::Menunggu;

    fn is_held(self) -> bool {
        matches!(self, Self::Lansir)
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Kembali)
    }

    fn release_targets() -> &'static [Self] {
        &[Self::Menunggu, Self::Kembali]
    }
}

impl QueueState for TruckQueueStatus {
    const KIND: QueueKind = QueueKind::Truck;
    const WAITING: Self = Self::Menunggu;

    fn is_held(self) -> bool {
        matches!(self, Self::Muat | Self::Berangkat)
    }

    fn is_terminal(self) -> bool {
        false
    }

    fn release_targets() -> &'static [Self] {
        &[Self::Menunggu]
    }
}

/// The aggregate holding a queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Holder {
    Manifest(ManifestId),
    Delivery(DeliveryId),
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest(id) => write!(f, "manifest {id}"),
            Self::Delivery(id) => write!(f, "delivery {id}"),
        }
    }
}

/// A vehicle and its crew waiting at a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "S: QueueState"))]
pub struct QueueEntry<S: QueueState> {
    pub id: QueueEntryId,
    pub branch: BranchId,
    pub vehicle_id: VehicleId,
    pub driver: UserId,
    pub assistant: Option<UserId>,
    /// FIFO position, unique per branch and queue type.
    pub sequence: u64,
    pub status: S,
    pub held_by: Option<Holder>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub type VehicleQueueEntry = QueueEntry<VehicleQueueStatus>;
pub type TruckQueueEntry = QueueEntry<TruckQueueStatus>;

impl<S: QueueState> QueueEntry<S> {
    /// Take a waiting entry for `holder`, moving it to `held`.
    ///
    /// An entry that is not waiting is reported as `AlreadyClaimed`.
    pub fn claim(&mut self, held: S, holder: Holder, now: Timestamp) -> LogisticsResult<()> {
        if self.status != S::WAITING {
            let owner = self
                .held_by
                .as_ref()
                .map_or_else(|| self.status.to_string(), ToString::to_string);
            return Err(LogisticsError::already_claimed("queue entry", &self.id, owner));
        }
        self.status = held;
        self.held_by = Some(holder);
        self.updated_at = now;
        Ok(())
    }

    /// Move a held entry between held statuses (truck MUAT → BERANGKAT).
    pub fn advance_held(&mut self, to: S, holder: &Holder, now: Timestamp) -> LogisticsResult<()> {
        if self.held_by.as_ref() != Some(holder) || !to.is_held() {
            return Err(LogisticsError::Store(format!(
                "queue entry {} is not held by {holder}",
                self.id
            )));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Hand a held entry back.
    ///
    /// Returns `Ok(false)` when the entry is already at `target` (nothing to
    /// do), `Ok(true)` when it was released. `holder` is the releasing
    /// aggregate; `None` means an outside caller, which may not release an
    /// entry still held by an active aggregate.
    pub fn release(
        &mut self,
        target: S,
        holder: Option<&Holder>,
        now: Timestamp,
    ) -> LogisticsResult<bool> {
        if !S::release_targets().contains(&target) {
            return Err(LogisticsError::validation(format!(
                "{} queue entries cannot be released to {target}",
                S::KIND
            )));
        }
        if self.status == target && self.held_by.is_none() {
            return Ok(false);
        }
        if !self.status.is_held() {
            return Err(LogisticsError::NotHeld {
                id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        if let Some(current) = &self.held_by {
            if holder != Some(current) {
                return Err(LogisticsError::already_claimed(
                    "queue entry",
                    &self.id,
                    current,
                ));
            }
        }
        self.status = target;
        self.held_by = None;
        self.updated_at = now;
        Ok(true)
    }
}

/// Lowest-sequence waiting entry at `branch`.
pub fn next_waiting<'a, S: QueueState>(
    entries: impl IntoIterator<Item = &'a QueueEntry<S>>,
    branch: &BranchId,
) -> Option<&'a QueueEntry<S>> {
    entries
        .into_iter()
        .filter(|e| e.branch == *branch && e.status == S::WAITING)
        .min_by_key(|e| e.sequence)
}

/// Sequence allocation scope for a queue.
#[must_use]
pub fn sequence_scope(kind: QueueKind, branch: &BranchId) -> String {
    format!("queue:{kind}:{branch}")
}

// =============================================================================
// VEHICLE REGISTRY
// =============================================================================

/// A registered vehicle with optional default crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate_number: String,
    pub branch: BranchId,
    pub default_driver: Option<UserId>,
    pub default_assistant: Option<UserId>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub plate_number: String,
    pub branch: BranchId,
    #[serde(default)]
    pub default_driver: Option<UserId>,
    #[serde(default)]
    pub default_assistant: Option<UserId>,
}

impl NewVehicle {
    pub fn validate(&self) -> LogisticsResult<()> {
        if self.plate_number.trim().is_empty() {
            return Err(LogisticsError::validation("plate number is required"));
        }
        if self.branch.is_blank() {
            return Err(LogisticsError::validation("branch is required"));
        }
        Ok(())
    }
}

/// Registry edit. `Some(None)` clears a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehiclePatch {
    #[serde(default)]
    pub plate_number: Option<String>,
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default, with = "double_option")]
    pub default_driver: Option<Option<UserId>>,
    #[serde(default, with = "double_option")]
    pub default_assistant: Option<Option<UserId>>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl Vehicle {
    pub fn apply_patch(&mut self, patch: VehiclePatch) -> LogisticsResult<()> {
        if let Some(plate) = patch.plate_number {
            if plate.trim().is_empty() {
                return Err(LogisticsError::validation("plate number is required"));
            }
            self.plate_number = plate.trim().to_string();
        }
        if let Some(branch) = patch.branch {
            self.branch = branch;
        }
        if let Some(driver) = patch.default_driver {
            self.default_driver = driver;
        }
        if let Some(assistant) = patch.default_assistant {
            self.default_assistant = assistant;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T: Serialize, S: Serializer>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Crew requested at enqueue time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSelection {
    /// Overrides the vehicle's default driver.
    #[serde(default)]
    pub driver: Option<UserId>,
    /// Overrides the vehicle's default assistant.
    #[serde(default)]
    pub assistant: Option<UserId>,
    /// Dispatch without an assistant even if the vehicle has a default one.
    #[serde(default)]
    pub without_assistant: bool,
}

/// Request to put a vehicle in a branch queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub branch: BranchId,
    pub vehicle_id: VehicleId,
    #[serde(flatten)]
    pub crew: CrewSelection,
}

/// Resolved driver and assistant for a queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crew {
    pub driver: UserId,
    pub assistant: Option<UserId>,
}

/// Apply the auto-fill rule: explicit choices win, defaults fill the gaps.
pub fn resolve_crew(vehicle: &Vehicle, selection: CrewSelection) -> LogisticsResult<Crew> {
    let driver = selection
        .driver
        .filter(|d| !d.is_blank())
        .or_else(|| vehicle.default_driver.clone())
        .ok_or_else(|| {
            LogisticsError::validation(format!(
                "vehicle {} has no default driver; a driver is required",
                vehicle.id
            ))
        })?;

    let assistant = if selection.without_assistant {
        None
    } else {
        selection
            .assistant
            .filter(|a| !a.is_blank())
            .or_else(|| vehicle.default_assistant.clone())
    };

    if assistant.as_ref() == Some(&driver) {
        return Err(LogisticsError::validation(
            "driver and assistant must be different people",
        ));
    }

    Ok(Crew { driver, assistant })
}

/// Filters for listing queue entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "S: QueueState"))]
pub struct QueueQuery<S: QueueState> {
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub status: Option<S>,
}

impl<S: QueueState> Default for QueueQuery<S> {
    fn default() -> Self {
        Self {
            branch: None,
            status: None,
        }
    }
}

impl<S: QueueState> QueueQuery<S> {
    #[must_use]
    pub fn matches(&self, entry: &QueueEntry<S>) -> bool {
        self.branch.as_ref().map_or(true, |b| *b == entry.branch)
            && self.status.map_or(true, |s| s == entry.status)
    }
}
