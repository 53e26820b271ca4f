//! STT state machine and the identity gate.

use shared_bus::LogisticsEvent;
use shared_types::{Actor, Role, ShipmentId, ShipmentStatus, UserId};
use tracing::info;

use super::{load_shipment, LintasService};
use crate::domain::permissions::is_forward_edge;
use crate::domain::shipment::format_tracking_number;
use crate::domain::{
    DocumentRef, DocumentRequest, Edge, LogisticsError, LogisticsResult, Shipment, ShipmentIntake,
    ShipmentPatch, ShipmentQuery, StatusRecord,
};
use crate::ports::inbound::{IdentityApi, ShipmentApi};
use crate::ports::outbound::LogisticsStore;

impl<S: LogisticsStore> IdentityApi for LintasService<S> {
    fn resolve_actor(&self, user: &UserId) -> LogisticsResult<Actor> {
        self.identity
            .resolve(user)
            .ok_or_else(|| LogisticsError::UnknownUser(user.to_string()))
    }

    fn permitted_edges(&self, role: &Role) -> Vec<Edge> {
        self.permissions.edges_for(role)
    }

    fn allowed_transitions(
        &self,
        actor: &Actor,
        id: &ShipmentId,
    ) -> LogisticsResult<Vec<ShipmentStatus>> {
        let shipment = self.shipment(id)?;
        // A held STT moves only with its holder.
        if shipment.claim.is_some() {
            return Ok(Vec::new());
        }
        Ok(self
            .permissions
            .targets(&actor.role, shipment.status)
            .into_iter()
            .filter(|to| is_forward_edge(shipment.status, *to))
            .collect())
    }
}

impl<S: LogisticsStore> ShipmentApi for LintasService<S> {
    fn create_shipment(&self, actor: &Actor, intake: ShipmentIntake) -> LogisticsResult<Shipment> {
        intake.validate()?;
        let prefix = self.config.tracking_prefix.clone();

        let shipment = self.commit(|repo, now, events| {
            let sequence = repo.next_sequence(&format!("stt:{}", intake.origin));
            let tracking = format_tracking_number(&prefix, &intake.origin, sequence);
            let shipment =
                Shipment::from_intake(ShipmentId::generate(), tracking, intake, &actor.id, now);
            repo.put_shipment(shipment.clone());
            events.push(LogisticsEvent::ShipmentCreated {
                shipment_id: shipment.id.clone(),
                tracking_number: shipment.tracking_number.clone(),
                origin: shipment.origin.clone(),
                destination: shipment.destination.clone(),
            });
            Ok(shipment)
        })?;

        info!(
            id = %shipment.id,
            tracking = %shipment.tracking_number,
            harga = shipment.harga,
            "STT created"
        );
        Ok(shipment)
    }

    fn advance_shipment(
        &self,
        actor: &Actor,
        id: &ShipmentId,
        to: ShipmentStatus,
        note: Option<String>,
    ) -> LogisticsResult<Shipment> {
        let shipment = self.commit(|repo, now, events| {
            let mut shipment = load_shipment(repo, id)?;
            let from = shipment.status;
            if !is_forward_edge(from, to) {
                return Err(LogisticsError::invalid_transition("shipment", from, to));
            }
            self.authorize(actor, from, to)?;
            shipment.ensure_unclaimed()?;

            shipment.record_transition(to, &actor.id, now, note);
            repo.put_shipment(shipment.clone());
            events.push(LogisticsEvent::ShipmentStatusChanged {
                shipment_id: shipment.id.clone(),
                from,
                to,
                actor: actor.id.clone(),
            });
            Ok(shipment)
        })?;

        info!(id = %shipment.id, status = %shipment.status, actor = %actor.id, "STT advanced");
        Ok(shipment)
    }

    fn update_shipment(
        &self,
        actor: &Actor,
        id: &ShipmentId,
        patch: ShipmentPatch,
    ) -> LogisticsResult<Shipment> {
        let shipment = self.commit(|repo, now, _events| {
            let mut shipment = load_shipment(repo, id)?;
            shipment.apply_patch(patch, now)?;
            repo.put_shipment(shipment.clone());
            Ok(shipment)
        })?;
        info!(id = %shipment.id, harga = shipment.harga, actor = %actor.id, "STT updated");
        Ok(shipment)
    }

    fn shipment(&self, id: &ShipmentId) -> LogisticsResult<Shipment> {
        self.store.read(|repo| load_shipment(repo, id))
    }

    fn shipment_by_tracking_number(&self, number: &str) -> LogisticsResult<Shipment> {
        let wanted = number.trim();
        self.store
            .read(|repo| {
                repo.shipments()
                    .into_iter()
                    .find(|s| s.tracking_number.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| LogisticsError::not_found("tracking number", wanted))
    }

    fn list_shipments(&self, query: &ShipmentQuery) -> Vec<Shipment> {
        let mut found: Vec<Shipment> = self.store.read(|repo| {
            repo.shipments()
                .into_iter()
                .filter(|s| query.matches(s))
                .collect()
        });
        found.sort_by(|a, b| {
            (a.created_at, &a.tracking_number).cmp(&(b.created_at, &b.tracking_number))
        });
        found
    }

    fn shipment_history(&self, id: &ShipmentId) -> LogisticsResult<Vec<StatusRecord>> {
        self.shipment(id).map(|s| s.history)
    }

    fn print_shipment(&self, actor: &Actor, id: &ShipmentId) -> LogisticsResult<DocumentRef> {
        let shipment = self.shipment(id)?;
        info!(id = %shipment.id, actor = %actor.id, "Printing STT receipt");
        self.render(DocumentRequest::Receipt { shipment })
    }
}
