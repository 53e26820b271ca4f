//! # Shipment Receipt (STT)
//!
//! The core unit of work. An STT carries its own status history and an
//! explicit `claim` naming the aggregate that currently holds it.
//!
//! ```text
//! [PENDING] ─→ [MUAT] ─→ [TRANSIT] ─→ [LANSIR] ─→ [TERKIRIM]
//!                            │            │
//!                            └─→ [RETURN] ←┘
//!                                   │
//!                                   └── closeReturn ──→ [PENDING]
//! ```

use serde::{Deserialize, Serialize};
use shared_types::{
    BranchId, CollectionId, CustomerId, DeliveryId, ManifestId, PaymentType, ReturnId, Rupiah,
    ShipmentId, ShipmentStatus, Timestamp, UserId,
};
use std::fmt;

use super::errors::{LogisticsError, LogisticsResult};

/// Cargo description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cargo {
    /// Goods name as written on the receipt.
    pub name: String,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub packing: Option<String>,
    /// Number of pieces.
    #[serde(default)]
    pub colly: u32,
    pub weight_kg: f64,
}

/// The aggregate currently holding an STT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Claim {
    Manifest(ManifestId),
    Delivery(DeliveryId),
    Return(ReturnId),
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest(id) => write!(f, "manifest {id}"),
            Self::Delivery(id) => write!(f, "delivery {id}"),
            Self::Return(id) => write!(f, "return {id}"),
        }
    }
}

/// One entry of the append-only status timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: ShipmentStatus,
    pub at: Timestamp,
    pub actor: UserId,
    #[serde(default)]
    pub note: Option<String>,
}

/// Intake form for a new STT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentIntake {
    pub origin: BranchId,
    pub destination: BranchId,
    #[serde(default)]
    pub sender: Option<CustomerId>,
    #[serde(default)]
    pub recipient: Option<CustomerId>,
    pub cargo: Cargo,
    pub rate_per_kg: Rupiah,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub forwarder_code: Option<String>,
}

/// Editable fields of a PENDING STT. Absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentPatch {
    #[serde(default)]
    pub sender: Option<CustomerId>,
    #[serde(default)]
    pub recipient: Option<CustomerId>,
    #[serde(default)]
    pub cargo: Option<Cargo>,
    #[serde(default)]
    pub rate_per_kg: Option<Rupiah>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub forwarder_code: Option<String>,
}

/// A shipment receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub tracking_number: String,
    pub origin: BranchId,
    pub destination: BranchId,
    pub sender: Option<CustomerId>,
    pub recipient: Option<CustomerId>,
    pub cargo: Cargo,
    pub rate_per_kg: Rupiah,
    /// `round(weight_kg × rate_per_kg)`.
    pub harga: Rupiah,
    pub payment_type: PaymentType,
    pub forwarder_code: Option<String>,
    pub status: ShipmentStatus,
    pub claim: Option<Claim>,
    pub billed_in: Option<CollectionId>,
    pub last_delivery: Option<DeliveryId>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub history: Vec<StatusRecord>,
}

/// Total price rounded to whole currency units.
#[must_use]
pub fn compute_harga(weight_kg: f64, rate_per_kg: Rupiah) -> Rupiah {
    (weight_kg * rate_per_kg as f64).round() as Rupiah
}

fn validate_pricing(cargo: &Cargo, rate_per_kg: Rupiah) -> LogisticsResult<()> {
    if cargo.name.trim().is_empty() {
        return Err(LogisticsError::validation("cargo name is required"));
    }
    if !cargo.weight_kg.is_finite() || cargo.weight_kg < 0.0 {
        return Err(LogisticsError::validation(format!(
            "weight must be a non-negative number, got {}",
            cargo.weight_kg
        )));
    }
    if rate_per_kg < 0 {
        return Err(LogisticsError::validation(format!(
            "rate per kg must not be negative, got {rate_per_kg}"
        )));
    }
    Ok(())
}

fn has_party(party: &Option<CustomerId>) -> bool {
    party.as_ref().is_some_and(|c| !c.is_blank())
}

impl ShipmentIntake {
    /// Check the intake form before any id or sequence is allocated.
    pub fn validate(&self) -> LogisticsResult<()> {
        if self.origin.is_blank() {
            return Err(LogisticsError::validation("origin branch is required"));
        }
        if self.destination.is_blank() {
            return Err(LogisticsError::validation("destination branch is required"));
        }
        if !has_party(&self.sender) && !has_party(&self.recipient) {
            return Err(LogisticsError::validation(
                "at least one of sender or recipient is required",
            ));
        }
        validate_pricing(&self.cargo, self.rate_per_kg)
    }
}

impl Shipment {
    /// Build a PENDING STT from a validated intake.
    pub fn from_intake(
        id: ShipmentId,
        tracking_number: String,
        intake: ShipmentIntake,
        creator: &UserId,
        now: Timestamp,
    ) -> Self {
        let harga = compute_harga(intake.cargo.weight_kg, intake.rate_per_kg);
        Self {
            id,
            tracking_number,
            origin: intake.origin,
            destination: intake.destination,
            sender: intake.sender,
            recipient: intake.recipient,
            cargo: intake.cargo,
            rate_per_kg: intake.rate_per_kg,
            harga,
            payment_type: intake.payment_type,
            forwarder_code: intake.forwarder_code,
            status: ShipmentStatus::Pending,
            claim: None,
            billed_in: None,
            last_delivery: None,
            created_by: creator.clone(),
            created_at: now,
            updated_at: now,
            history: vec![StatusRecord {
                status: ShipmentStatus::Pending,
                at: now,
                actor: creator.clone(),
                note: None,
            }],
        }
    }

    /// Shipments whose origin and destination coincide never ride a manifest.
    #[must_use]
    pub fn is_branch_local(&self) -> bool {
        self.origin == self.destination
    }

    /// Move to `to` and append a history record. Callers check edges first.
    pub fn record_transition(
        &mut self,
        to: ShipmentStatus,
        actor: &UserId,
        at: Timestamp,
        note: Option<String>,
    ) {
        self.status = to;
        self.updated_at = at;
        self.history.push(StatusRecord {
            status: to,
            at,
            actor: actor.clone(),
            note,
        });
    }

    /// Fail unless the STT is free of any holder.
    pub fn ensure_unclaimed(&self) -> LogisticsResult<()> {
        match &self.claim {
            Some(holder) => Err(LogisticsError::already_claimed(
                "shipment",
                &self.id,
                holder,
            )),
            None => Ok(()),
        }
    }

    /// Fail unless the STT is held by exactly `holder`.
    pub fn ensure_held_by(&self, holder: &Claim) -> LogisticsResult<()> {
        if self.claim.as_ref() == Some(holder) {
            return Ok(());
        }
        Err(LogisticsError::Store(format!(
            "shipment {} expected holder {holder}, found {:?}",
            self.id, self.claim
        )))
    }

    /// Apply a PENDING-only edit and recompute `harga`.
    pub fn apply_patch(&mut self, patch: ShipmentPatch, now: Timestamp) -> LogisticsResult<()> {
        if self.status != ShipmentStatus::Pending {
            return Err(LogisticsError::immutable("shipment", &self.id, self.status));
        }
        self.ensure_unclaimed()?;

        let sender = patch.sender.or_else(|| self.sender.clone());
        let recipient = patch.recipient.or_else(|| self.recipient.clone());
        if !has_party(&sender) && !has_party(&recipient) {
            return Err(LogisticsError::validation(
                "at least one of sender or recipient is required",
            ));
        }
        let cargo = patch.cargo.unwrap_or_else(|| self.cargo.clone());
        let rate_per_kg = patch.rate_per_kg.unwrap_or(self.rate_per_kg);
        validate_pricing(&cargo, rate_per_kg)?;

        self.sender = sender;
        self.recipient = recipient;
        self.harga = compute_harga(cargo.weight_kg, rate_per_kg);
        self.cargo = cargo;
        self.rate_per_kg = rate_per_kg;
        if let Some(payment_type) = patch.payment_type {
            self.payment_type = payment_type;
        }
        if patch.forwarder_code.is_some() {
            self.forwarder_code = patch.forwarder_code;
        }
        self.updated_at = now;
        Ok(())
    }

    /// True if the customer is on the requested side of this shipment.
    #[must_use]
    pub fn belongs_to(&self, customer: &CustomerId, as_sender: bool) -> bool {
        let party = if as_sender {
            &self.sender
        } else {
            &self.recipient
        };
        party.as_ref() == Some(customer)
    }
}

/// Filters for listing shipments. All present fields must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentQuery {
    #[serde(default)]
    pub origin: Option<BranchId>,
    #[serde(default)]
    pub destination: Option<BranchId>,
    /// Matches either origin or destination.
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub status: Option<ShipmentStatus>,
    /// Matches either sender or recipient.
    #[serde(default)]
    pub customer: Option<CustomerId>,
}

impl ShipmentQuery {
    #[must_use]
    pub fn matches(&self, s: &Shipment) -> bool {
        self.origin.as_ref().map_or(true, |b| *b == s.origin)
            && self
                .destination
                .as_ref()
                .map_or(true, |b| *b == s.destination)
            && self
                .branch
                .as_ref()
                .map_or(true, |b| *b == s.origin || *b == s.destination)
            && self.status.map_or(true, |st| st == s.status)
            && self.customer.as_ref().map_or(true, |c| {
                s.sender.as_ref() == Some(c) || s.recipient.as_ref() == Some(c)
            })
    }
}

/// Tracking numbers look like `STT-JKT-000042`.
#[must_use]
pub fn format_tracking_number(prefix: &str, origin: &BranchId, sequence: u64) -> String {
    format!("{prefix}-{origin}-{sequence:06}")
}
