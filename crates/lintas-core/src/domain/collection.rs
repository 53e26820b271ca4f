//! # Collection (Penagihan)
//!
//! Billing aggregate over delivered shipments with an installment ledger.
//!
//! Two independent fields describe settlement: the stored `status`, set by
//! staff, and the derived `remaining`, always recomputed from the payment
//! list. They are allowed to disagree; staff reconcile them by hand.
//! Overpayment is accepted and shows as a negative `remaining`.

use serde::{Deserialize, Serialize};
use shared_types::{
    BranchId, CollectionId, CollectionStatus, CustomerId, CustomerRole, Rupiah, ShipmentId,
    Timestamp, UserId,
};

use super::errors::{LogisticsError, LogisticsResult};

/// One installment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// 1-based installment number.
    pub termin: u32,
    pub amount: Rupiah,
    pub date: Timestamp,
    #[serde(default)]
    pub note: Option<String>,
    pub recorded_by: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub customer: CustomerId,
    pub customer_role: CustomerRole,
    pub branch: BranchId,
    pub shipments: Vec<ShipmentId>,
    pub total_billed: Rupiah,
    pub payments: Vec<Payment>,
    pub status: CollectionStatus,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub customer: CustomerId,
    pub customer_role: CustomerRole,
    pub shipments: Vec<ShipmentId>,
    pub branch: BranchId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Rupiah,
    /// Defaults to now.
    #[serde(default)]
    pub date: Option<Timestamp>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionQuery {
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub customer: Option<CustomerId>,
    #[serde(default)]
    pub status: Option<CollectionStatus>,
}

impl CollectionQuery {
    #[must_use]
    pub fn matches(&self, c: &Collection) -> bool {
        self.branch.as_ref().map_or(true, |b| *b == c.branch)
            && self.customer.as_ref().map_or(true, |x| *x == c.customer)
            && self.status.map_or(true, |s| s == c.status)
    }
}

impl Collection {
    /// Sum of recorded payments. `record_payment` keeps this in range; the
    /// saturation only guards ledgers restored from an edited snapshot.
    #[must_use]
    pub fn paid(&self) -> Rupiah {
        self.payments
            .iter()
            .fold(0, |acc: Rupiah, p| acc.saturating_add(p.amount))
    }

    /// `total_billed − paid`. Negative when overpaid.
    #[must_use]
    pub fn remaining(&self) -> Rupiah {
        self.total_billed.saturating_sub(self.paid())
    }

    /// Append an installment with the next termin number.
    pub fn record_payment(
        &mut self,
        request: NewPayment,
        actor: &UserId,
        now: Timestamp,
    ) -> LogisticsResult<Payment> {
        if request.amount <= 0 {
            return Err(LogisticsError::validation(format!(
                "payment amount must be positive, got {}",
                request.amount
            )));
        }
        if self.paid().checked_add(request.amount).is_none() {
            return Err(LogisticsError::validation(format!(
                "payment of {} exceeds what the ledger can hold",
                request.amount
            )));
        }
        let termin = u32::try_from(self.payments.len() + 1)
            .map_err(|_| LogisticsError::validation("too many installments"))?;
        let payment = Payment {
            termin,
            amount: request.amount,
            date: request.date.unwrap_or(now),
            note: request.note,
            recorded_by: actor.clone(),
        };
        self.payments.push(payment.clone());
        self.updated_at = now;
        Ok(payment)
    }
}

/// Read model: the stored collection plus its derived balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionView {
    #[serde(flatten)]
    pub collection: Collection,
    pub paid: Rupiah,
    pub remaining: Rupiah,
}

impl From<Collection> for CollectionView {
    fn from(collection: Collection) -> Self {
        Self {
            paid: collection.paid(),
            remaining: collection.remaining(),
            collection,
        }
    }
}
