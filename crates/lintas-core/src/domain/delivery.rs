//! # Delivery (Lansir)
//!
//! Last-mile dispatch of a batch of shipments on one queued local vehicle.
//!
//! Vehicle availability is decoupled from cargo resolution: on either
//! terminal status the vehicle goes back to the queue, even when the cargo
//! is stuck and has to be picked up by the return handler.

use serde::{Deserialize, Serialize};
use shared_types::{
    BranchId, DeliveryId, DeliveryStatus, QueueEntryId, ShipmentId, Timestamp, UserId, VehicleId,
};

use super::errors::{LogisticsError, LogisticsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub shipments: Vec<ShipmentId>,
    pub vehicle_entry: QueueEntryId,
    pub vehicle_id: VehicleId,
    pub driver: UserId,
    pub assistant: Option<UserId>,
    pub branch: BranchId,
    pub checker: UserId,
    pub admin: Option<UserId>,
    pub departure_odometer: u64,
    pub return_odometer: Option<u64>,
    pub recipient_name: Option<String>,
    pub note: Option<String>,
    pub status: DeliveryStatus,
    pub departed_at: Timestamp,
    /// The `sampai` time, set when the delivery ends.
    pub arrived_at: Option<Timestamp>,
    pub created_by: UserId,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDelivery {
    pub shipments: Vec<ShipmentId>,
    pub vehicle_entry: QueueEntryId,
    pub checker: UserId,
    #[serde(default)]
    pub admin: Option<UserId>,
    pub departure_odometer: u64,
}

/// Status update payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryUpdate {
    pub status: DeliveryStatus,
    #[serde(default)]
    pub return_odometer: Option<u64>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub arrived_at: Option<Timestamp>,
    /// Retire the vehicle entry (KEMBALI) instead of re-queueing it.
    #[serde(default)]
    pub retire_vehicle: bool,
}

impl DeliveryUpdate {
    pub fn to(status: DeliveryStatus) -> Self {
        Self {
            status,
            return_odometer: None,
            recipient_name: None,
            note: None,
            arrived_at: None,
            retire_vehicle: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryQuery {
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub status: Option<DeliveryStatus>,
}

impl DeliveryQuery {
    #[must_use]
    pub fn matches(&self, d: &Delivery) -> bool {
        self.branch.as_ref().map_or(true, |b| *b == d.branch)
            && self.status.map_or(true, |s| s == d.status)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Delivery {
    fn check_odometer(&self, reading: Option<u64>) -> LogisticsResult<()> {
        match reading {
            Some(ret) if ret < self.departure_odometer => Err(LogisticsError::validation(format!(
                "return odometer {ret} is below departure odometer {}",
                self.departure_odometer
            ))),
            _ => Ok(()),
        }
    }

    /// Validate `update` and apply it to the delivery record itself.
    ///
    /// Member STTs and the vehicle entry are synchronized by the caller
    /// based on the resulting status.
    pub fn apply_update(&mut self, update: &DeliveryUpdate, now: Timestamp) -> LogisticsResult<()> {
        if self.status.is_terminal() {
            return Err(LogisticsError::immutable("delivery", &self.id, self.status));
        }
        self.check_odometer(update.return_odometer)?;

        let recipient = non_blank(&update.recipient_name).or_else(|| self.recipient_name.clone());
        let note = non_blank(&update.note).or_else(|| self.note.clone());
        let return_odometer = update.return_odometer.or(self.return_odometer);

        let arrived_at = match update.status {
            DeliveryStatus::Lansir => None,
            DeliveryStatus::Terkirim => {
                if recipient.is_none() {
                    return Err(LogisticsError::validation(
                        "recipient name is required to mark TERKIRIM",
                    ));
                }
                if return_odometer.is_none() {
                    return Err(LogisticsError::validation(
                        "return odometer is required to mark TERKIRIM",
                    ));
                }
                Some(update.arrived_at.unwrap_or(now))
            }
            DeliveryStatus::BelumSelesai => {
                if non_blank(&update.note).is_none() {
                    return Err(LogisticsError::validation(
                        "a note explaining the failure is required to mark BELUM_SELESAI",
                    ));
                }
                Some(update.arrived_at.unwrap_or(now))
            }
        };

        if let Some(arrived) = arrived_at {
            if arrived < self.departed_at {
                return Err(LogisticsError::validation(format!(
                    "arrival {arrived} is before departure {}",
                    self.departed_at
                )));
            }
        }

        if arrived_at.is_some() {
            self.arrived_at = arrived_at;
        }
        self.recipient_name = recipient;
        self.note = note;
        self.return_odometer = return_odometer;
        self.status = update.status;
        self.updated_at = now;
        Ok(())
    }
}
