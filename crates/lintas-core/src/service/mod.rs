//! # Lintas Service
//!
//! Application service implementing every inbound port on top of the
//! outbound ones. Each mutating call is one store transaction; events are
//! emitted only after that transaction committed.
//!
//! Member STTs and queue entries are synchronized inside the transaction of
//! the aggregate that holds them, so a manifest, delivery or return and its
//! members never disagree in committed state.

mod collection;
mod delivery;
mod fleet;
mod manifest;
mod returns;
mod shipment;

use std::sync::Arc;

use shared_bus::LogisticsEvent;
use shared_types::{
    Actor, BranchId, CollectionId, DeliveryId, ManifestId, ReturnId, ShipmentId, ShipmentStatus,
    Timestamp, UserId,
};
use tracing::debug;

use crate::adapters::NoOpEventSink;
use crate::config::LintasConfig;
use crate::domain::{
    Claim, Collection, Delivery, DocumentRef, DocumentRequest, LogisticsError, LogisticsResult,
    Manifest, PermissionTable, ReturnRecord, Shipment,
};
use crate::ports::outbound::{
    Clock, DocumentRenderer, EventSink, IdentityProvider, LogisticsStore, Repository,
    SystemClock,
};

/// The Lintas core service.
pub struct LintasService<S: LogisticsStore> {
    store: Arc<S>,
    identity: Arc<dyn IdentityProvider>,
    renderer: Arc<dyn DocumentRenderer>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    permissions: PermissionTable,
    config: LintasConfig,
}

impl<S: LogisticsStore> LintasService<S> {
    /// Create a service with the system clock and no event sink.
    pub fn new(
        store: Arc<S>,
        identity: Arc<dyn IdentityProvider>,
        renderer: Arc<dyn DocumentRenderer>,
        config: LintasConfig,
    ) -> Self {
        Self {
            store,
            identity,
            renderer,
            clock: Arc::new(SystemClock),
            events: Arc::new(NoOpEventSink),
            permissions: PermissionTable::standard(),
            config,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: PermissionTable) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LintasConfig {
        &self.config
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Refuse unless `actor`'s role holds the `from → to` edge.
    fn authorize(
        &self,
        actor: &Actor,
        from: ShipmentStatus,
        to: ShipmentStatus,
    ) -> LogisticsResult<()> {
        if self.permissions.allows(&actor.role, from, to) {
            Ok(())
        } else {
            Err(LogisticsError::forbidden("shipment", &actor.role, from, to))
        }
    }

    /// Authorize every edge an aggregate would move its members along.
    /// Members already at `to` do not move and need no grant.
    fn authorize_members(
        &self,
        actor: &Actor,
        members: &[Shipment],
        to: ShipmentStatus,
    ) -> LogisticsResult<()> {
        members
            .iter()
            .filter(|s| s.status != to)
            .try_for_each(|s| self.authorize(actor, s.status, to))
    }

    /// Run one transaction and publish the events it produced.
    fn commit<T>(
        &self,
        op: impl FnOnce(&mut dyn Repository, Timestamp, &mut Vec<LogisticsEvent>) -> LogisticsResult<T>,
    ) -> LogisticsResult<T> {
        let now = self.clock.now();
        let mut events = Vec::new();
        let value = self.store.transact(|repo| op(repo, now, &mut events))?;
        for event in events {
            self.events.emit(event);
        }
        Ok(value)
    }

    /// Render a document and announce it.
    fn render(&self, request: DocumentRequest) -> LogisticsResult<DocumentRef> {
        let document = self.renderer.render(&request)?;
        debug!(kind = %document.kind, reference = %document.reference, "Document rendered");
        self.events.emit(LogisticsEvent::DocumentRendered {
            kind: document.kind.clone(),
            reference: document.reference.clone(),
        });
        Ok(document)
    }
}

// =============================================================================
// TRANSACTION HELPERS
// =============================================================================

fn load_shipment(repo: &dyn Repository, id: &ShipmentId) -> LogisticsResult<Shipment> {
    repo.shipment(id)
        .ok_or_else(|| LogisticsError::not_found("shipment", id))
}

fn load_shipments(repo: &dyn Repository, ids: &[ShipmentId]) -> LogisticsResult<Vec<Shipment>> {
    ids.iter().map(|id| load_shipment(repo, id)).collect()
}

fn load_manifest(repo: &dyn Repository, id: &ManifestId) -> LogisticsResult<Manifest> {
    repo.manifest(id)
        .ok_or_else(|| LogisticsError::not_found("manifest", id))
}

fn load_delivery(repo: &dyn Repository, id: &DeliveryId) -> LogisticsResult<Delivery> {
    repo.delivery(id)
        .ok_or_else(|| LogisticsError::not_found("delivery", id))
}

fn load_return(repo: &dyn Repository, id: &ReturnId) -> LogisticsResult<ReturnRecord> {
    repo.return_record(id)
        .ok_or_else(|| LogisticsError::not_found("return", id))
}

fn load_collection(repo: &dyn Repository, id: &CollectionId) -> LogisticsResult<Collection> {
    repo.collection(id)
        .ok_or_else(|| LogisticsError::not_found("collection", id))
}

/// Move a held member STT to `to`, recording history and the event.
fn move_member(
    shipment: &mut Shipment,
    holder: &Claim,
    to: ShipmentStatus,
    actor: &UserId,
    at: Timestamp,
    events: &mut Vec<LogisticsEvent>,
) -> LogisticsResult<()> {
    shipment.ensure_held_by(holder)?;
    let from = shipment.status;
    if from == to {
        return Ok(());
    }
    shipment.record_transition(to, actor, at, None);
    events.push(LogisticsEvent::ShipmentStatusChanged {
        shipment_id: shipment.id.clone(),
        from,
        to,
        actor: actor.clone(),
    });
    Ok(())
}

fn require_present(value: &str, what: &str) -> LogisticsResult<()> {
    if value.trim().is_empty() {
        return Err(LogisticsError::validation(format!("{what} is required")));
    }
    Ok(())
}

fn require_branch(branch: &BranchId, what: &str) -> LogisticsResult<()> {
    require_present(branch.as_str(), what)
}

fn require_user(user: &UserId, what: &str) -> LogisticsResult<()> {
    require_present(user.as_str(), what)
}
