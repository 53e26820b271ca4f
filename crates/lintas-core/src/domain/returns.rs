//! # Returns (Retur)
//!
//! An undelivered batch travelling back to its origin. Closing the return
//! is the only way an STT moves backward: members go back to PENDING and
//! re-enter the forward pipeline.

use serde::{Deserialize, Serialize};
use shared_types::{BranchId, ReturnId, ReturnStatus, ShipmentId, Timestamp, UserId};

use super::errors::{LogisticsError, LogisticsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub id: ReturnId,
    pub shipments: Vec<ShipmentId>,
    pub branch: BranchId,
    pub ship_date: Timestamp,
    pub arrival_date: Option<Timestamp>,
    pub receipt_signature: Option<String>,
    pub status: ReturnStatus,
    pub created_by: UserId,
    pub closed_by: Option<UserId>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReturn {
    pub shipments: Vec<ShipmentId>,
    pub branch: BranchId,
    /// Defaults to now.
    #[serde(default)]
    pub ship_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseReturn {
    #[serde(default)]
    pub arrival_date: Option<Timestamp>,
    #[serde(default)]
    pub receipt_signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub status: Option<ReturnStatus>,
}

impl ReturnQuery {
    #[must_use]
    pub fn matches(&self, r: &ReturnRecord) -> bool {
        self.branch.as_ref().map_or(true, |b| *b == r.branch)
            && self.status.map_or(true, |s| s == r.status)
    }
}

impl ReturnRecord {
    pub fn ensure_open(&self) -> LogisticsResult<()> {
        if self.status == ReturnStatus::Sampai {
            return Err(LogisticsError::immutable("return", &self.id, self.status));
        }
        Ok(())
    }

    /// Mark arrived. Both the arrival date and a receipt signature are
    /// required, and arrival may not precede the ship date.
    pub fn close(&mut self, request: &CloseReturn, actor: &UserId, now: Timestamp) -> LogisticsResult<()> {
        self.ensure_open()?;
        let arrival = request
            .arrival_date
            .ok_or_else(|| LogisticsError::validation("arrival date is required"))?;
        let signature = request
            .receipt_signature
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LogisticsError::validation("receipt signature is required"))?;
        if arrival < self.ship_date {
            return Err(LogisticsError::validation(format!(
                "arrival {arrival} is before ship date {}",
                self.ship_date
            )));
        }

        self.arrival_date = Some(arrival);
        self.receipt_signature = Some(signature.to_string());
        self.status = ReturnStatus::Sampai;
        self.closed_by = Some(actor.clone());
        self.updated_at = now;
        Ok(())
    }
}
