//! Return handler: ships failed STTs back to a branch and re-opens them as
//! PENDING once the batch has arrived.

use shared_bus::LogisticsEvent;
use shared_types::{Actor, DeliveryStatus, ReturnId, ReturnStatus, ShipmentStatus};
use tracing::info;

use super::{load_return, load_shipments, move_member, require_branch, LintasService};
use crate::domain::manifest::validate_batch;
use crate::domain::permissions::RETURN_EDGE;
use crate::domain::{
    Claim, CloseReturn, LogisticsError, LogisticsResult, NewReturn, ReturnQuery, ReturnRecord,
    Shipment,
};
use crate::ports::inbound::ReturnApi;
use crate::ports::outbound::{LogisticsStore, Repository};

/// An STT may join a return if it already is RETURN, or if it is still
/// LANSIR after its last delivery ended BELUM_SELESAI.
fn check_returnable(repo: &dyn Repository, shipment: &Shipment) -> LogisticsResult<()> {
    shipment.ensure_unclaimed()?;
    let eligible = match shipment.status {
        ShipmentStatus::Return => true,
        ShipmentStatus::Lansir => shipment
            .last_delivery
            .as_ref()
            .and_then(|id| repo.delivery(id))
            .is_some_and(|d| d.status == DeliveryStatus::BelumSelesai),
        _ => false,
    };
    if !eligible {
        return Err(LogisticsError::invalid_transition(
            "shipment",
            shipment.status,
            ShipmentStatus::Return,
        ));
    }
    Ok(())
}

impl<S: LogisticsStore> ReturnApi for LintasService<S> {
    fn open_return(&self, actor: &Actor, request: NewReturn) -> LogisticsResult<ReturnRecord> {
        validate_batch(&request.shipments)?;
        require_branch(&request.branch, "return branch")?;

        let record = self.commit(|repo, now, events| {
            let members = load_shipments(&*repo, &request.shipments)?;
            for shipment in &members {
                check_returnable(&*repo, shipment)?;
            }
            self.authorize_members(actor, &members, ShipmentStatus::Return)?;

            let id = ReturnId::generate();
            let claim = Claim::Return(id.clone());
            for mut shipment in members {
                shipment.claim = Some(claim.clone());
                move_member(
                    &mut shipment,
                    &claim,
                    ShipmentStatus::Return,
                    &actor.id,
                    now,
                    events,
                )?;
                repo.put_shipment(shipment);
            }

            let record = ReturnRecord {
                id,
                shipments: request.shipments,
                branch: request.branch,
                ship_date: request.ship_date.unwrap_or(now),
                arrival_date: None,
                receipt_signature: None,
                status: ReturnStatus::Proses,
                created_by: actor.id.clone(),
                closed_by: None,
                updated_at: now,
            };
            repo.put_return_record(record.clone());
            events.push(LogisticsEvent::ReturnOpened {
                return_id: record.id.clone(),
                shipments: record.shipments.len(),
            });
            Ok(record)
        })?;

        info!(
            id = %record.id,
            branch = %record.branch,
            shipments = record.shipments.len(),
            actor = %actor.id,
            "Return opened"
        );
        Ok(record)
    }

    fn close_return(
        &self,
        actor: &Actor,
        id: &ReturnId,
        request: CloseReturn,
    ) -> LogisticsResult<ReturnRecord> {
        let record = self.commit(|repo, now, events| {
            let mut record = load_return(&*repo, id)?;
            record.ensure_open()?;
            self.authorize(actor, RETURN_EDGE.from, RETURN_EDGE.to)?;
            record.close(&request, &actor.id, now)?;

            let claim = Claim::Return(record.id.clone());
            for mut shipment in load_shipments(&*repo, &record.shipments)? {
                move_member(
                    &mut shipment,
                    &claim,
                    ShipmentStatus::Pending,
                    &actor.id,
                    now,
                    events,
                )?;
                shipment.claim = None;
                shipment.last_delivery = None;
                repo.put_shipment(shipment);
            }

            repo.put_return_record(record.clone());
            events.push(LogisticsEvent::ReturnClosed {
                return_id: record.id.clone(),
            });
            Ok(record)
        })?;

        info!(id = %record.id, shipments = record.shipments.len(), actor = %actor.id, "Return closed");
        Ok(record)
    }

    fn return_record(&self, id: &ReturnId) -> LogisticsResult<ReturnRecord> {
        self.store.read(|repo| load_return(repo, id))
    }

    fn list_returns(&self, query: &ReturnQuery) -> Vec<ReturnRecord> {
        let mut records: Vec<ReturnRecord> = self.store.read(|repo| {
            repo.return_records()
                .into_iter()
                .filter(|r| query.matches(r))
                .collect()
        });
        records.sort_by_key(|r| r.ship_date);
        records
    }
}
