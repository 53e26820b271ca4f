//! # Manifest (Loading)
//!
//! A batch of MUAT shipments riding one queued truck to a destination
//! branch. Member STTs follow the manifest:
//!
//! | Manifest edge | Truck entry | Member STTs |
//! |---------------|-------------|-------------|
//! | create | MENUNGGU → MUAT | claimed, stay MUAT |
//! | MUAT → BERANGKAT | MUAT → BERANGKAT | MUAT → TRANSIT |
//! | BERANGKAT → SAMPAI | released to MENUNGGU | unclaimed, stay TRANSIT |
//! | delete (MUAT only) | released to MENUNGGU | unclaimed |

use serde::{Deserialize, Serialize};
use shared_types::{
    BranchId, ManifestId, ManifestStatus, QueueEntryId, ShipmentId, Timestamp, UserId,
};

use super::errors::{LogisticsError, LogisticsResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: ManifestId,
    /// Member STTs in loading order.
    pub shipments: Vec<ShipmentId>,
    pub truck_entry: QueueEntryId,
    pub checker: UserId,
    pub origin: BranchId,
    pub destination: BranchId,
    pub status: ManifestStatus,
    pub departed_at: Option<Timestamp>,
    pub arrived_at: Option<Timestamp>,
    pub created_by: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewManifest {
    pub shipments: Vec<ShipmentId>,
    pub truck_entry: QueueEntryId,
    pub checker: UserId,
    pub destination: BranchId,
}

/// Membership or checker change while the manifest is still loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestAmendment {
    #[serde(default)]
    pub shipments: Option<Vec<ShipmentId>>,
    #[serde(default)]
    pub checker: Option<UserId>,
}

/// Requested manifest transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestAdvance {
    pub status: ManifestStatus,
    /// Departure or arrival time, depending on the edge.
    #[serde(default)]
    pub at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestQuery {
    /// Matches either origin or destination.
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub status: Option<ManifestStatus>,
}

impl ManifestQuery {
    #[must_use]
    pub fn matches(&self, m: &Manifest) -> bool {
        self.branch
            .as_ref()
            .map_or(true, |b| *b == m.origin || *b == m.destination)
            && self.status.map_or(true, |s| s == m.status)
    }
}

/// Reject empty batches and repeated ids. Shared by every batch aggregate.
pub fn validate_batch(ids: &[ShipmentId]) -> LogisticsResult<()> {
    if ids.is_empty() {
        return Err(LogisticsError::validation("at least one shipment is required"));
    }
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(LogisticsError::validation(format!(
                "shipment {id} is listed more than once"
            )));
        }
    }
    Ok(())
}

impl Manifest {
    /// Check a requested edge and resolve its timestamp.
    ///
    /// SAMPAI is final; only MUAT → BERANGKAT and BERANGKAT → SAMPAI exist.
    pub fn plan_advance(&self, request: &ManifestAdvance, now: Timestamp) -> LogisticsResult<Timestamp> {
        use ManifestStatus::{Berangkat, Muat, Sampai};

        match (self.status, request.status) {
            (Sampai, _) => Err(LogisticsError::immutable("manifest", &self.id, self.status)),
            (Muat, Berangkat) => Ok(request.at.unwrap_or(now)),
            (Berangkat, Sampai) => {
                let arrival = request.at.ok_or_else(|| {
                    LogisticsError::validation("arrival time is required to mark SAMPAI")
                })?;
                if let Some(departed) = self.departed_at {
                    if arrival < departed {
                        return Err(LogisticsError::validation(format!(
                            "arrival {arrival} is before departure {departed}"
                        )));
                    }
                }
                Ok(arrival)
            }
            (from, to) => Err(LogisticsError::invalid_transition("manifest", from, to)),
        }
    }

    /// Fail unless the manifest is still loading.
    pub fn ensure_loading(&self) -> LogisticsResult<()> {
        if self.status == ManifestStatus::Muat {
            Ok(())
        } else {
            Err(LogisticsError::immutable("manifest", &self.id, self.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(status: ManifestStatus) -> Manifest {
        Manifest {
            id: ManifestId::new("mnf-1"),
            shipments: vec![ShipmentId::new("stt-1")],
            truck_entry: QueueEntryId::new("que-1"),
            checker: UserId::new("chk"),
            origin: BranchId::new("JKT"),
            destination: BranchId::new("SBY"),
            status,
            departed_at: None,
            arrived_at: None,
            created_by: UserId::new("adm"),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_departure_defaults_to_now() {
        let m = manifest(ManifestStatus::Muat);
        let at = m
            .plan_advance(
                &ManifestAdvance {
                    status: ManifestStatus::Berangkat,
                    at: None,
                },
                777,
            )
            .unwrap();
        assert_eq!(at, 777);
    }

    #[test]
    fn test_arrival_required_and_ordered() {
        let mut m = manifest(ManifestStatus::Berangkat);
        m.departed_at = Some(1_000);

        let missing = ManifestAdvance {
            status: ManifestStatus::Sampai,
            at: None,
        };
        assert!(matches!(
            m.plan_advance(&missing, 5_000),
            Err(LogisticsError::Validation(_))
        ));

        let early = ManifestAdvance {
            status: ManifestStatus::Sampai,
            at: Some(999),
        };
        assert!(matches!(
            m.plan_advance(&early, 5_000),
            Err(LogisticsError::Validation(_))
        ));

        let ok = ManifestAdvance {
            status: ManifestStatus::Sampai,
            at: Some(1_000),
        };
        assert_eq!(m.plan_advance(&ok, 5_000).unwrap(), 1_000);
    }

    #[test]
    fn test_skipping_and_final_state() {
        let m = manifest(ManifestStatus::Muat);
        let skip = ManifestAdvance {
            status: ManifestStatus::Sampai,
            at: Some(1),
        };
        assert!(matches!(
            m.plan_advance(&skip, 0),
            Err(LogisticsError::InvalidTransition { .. })
        ));

        let done = manifest(ManifestStatus::Sampai);
        assert!(matches!(
            done.plan_advance(&skip, 0),
            Err(LogisticsError::Immutable { .. })
        ));
    }

    #[test]
    fn test_validate_batch() {
        assert!(validate_batch(&[]).is_err());
        let dup = vec![ShipmentId::new("a"), ShipmentId::new("a")];
        assert!(validate_batch(&dup).is_err());
        assert!(validate_batch(&[ShipmentId::new("a"), ShipmentId::new("b")]).is_ok());
    }
}
