//! Manifest builder: batches MUAT shipments onto one queued truck.

use shared_bus::LogisticsEvent;
use shared_types::{
    Actor, ManifestId, ManifestStatus, ShipmentId, ShipmentStatus, Timestamp, TruckQueueStatus,
};
use tracing::info;

use super::fleet::{load_entry, QueueTable};
use super::{
    load_manifest, load_shipment, load_shipments, move_member, require_branch, require_user,
    LintasService,
};
use crate::domain::manifest::validate_batch;
use crate::domain::{
    Claim, DocumentRef, DocumentRequest, Holder, LogisticsError, LogisticsResult, Manifest,
    ManifestAdvance, ManifestAmendment, ManifestQuery, NewManifest, QueueState, Shipment,
};
use crate::ports::inbound::ManifestApi;
use crate::ports::outbound::{LogisticsStore, Repository};

/// Check that an STT may join `manifest`'s batch.
///
/// Members already held by this manifest pass the claim check so that an
/// amendment can keep them.
fn check_member(shipment: &Shipment, manifest: &Manifest) -> LogisticsResult<()> {
    let own = Claim::Manifest(manifest.id.clone());
    if shipment.claim.as_ref() != Some(&own) {
        shipment.ensure_unclaimed()?;
    }
    if shipment.status != ShipmentStatus::Muat {
        return Err(LogisticsError::validation(format!(
            "shipment {} is {}, only MUAT shipments can be loaded",
            shipment.id, shipment.status
        )));
    }
    if shipment.destination != manifest.destination {
        return Err(LogisticsError::validation(format!(
            "shipment {} goes to {}, manifest goes to {}",
            shipment.id, shipment.destination, manifest.destination
        )));
    }
    Ok(())
}

/// Hand the truck back and unclaim every member.
fn release_batch(
    repo: &mut dyn Repository,
    manifest: &Manifest,
    now: Timestamp,
    events: &mut Vec<LogisticsEvent>,
) -> LogisticsResult<()> {
    let holder = Holder::Manifest(manifest.id.clone());
    let mut truck = load_entry::<TruckQueueStatus>(&*repo, &manifest.truck_entry)?;
    if truck.release(TruckQueueStatus::Menunggu, Some(&holder), now)? {
        events.push(LogisticsEvent::QueueEntryReleased {
            entry_id: truck.id.clone(),
            kind: TruckQueueStatus::KIND,
            status: truck.status.to_string(),
        });
        TruckQueueStatus::put(repo, truck);
    }

    let claim = Claim::Manifest(manifest.id.clone());
    for mut shipment in load_shipments(&*repo, &manifest.shipments)? {
        shipment.ensure_held_by(&claim)?;
        shipment.claim = None;
        shipment.updated_at = now;
        repo.put_shipment(shipment);
    }
    Ok(())
}

impl<S: LogisticsStore> ManifestApi for LintasService<S> {
    fn create_manifest(&self, actor: &Actor, request: NewManifest) -> LogisticsResult<Manifest> {
        validate_batch(&request.shipments)?;
        require_branch(&request.destination, "destination branch")?;
        require_user(&request.checker, "checker")?;

        let manifest = self.commit(|repo, now, events| {
            let mut truck = load_entry::<TruckQueueStatus>(&*repo, &request.truck_entry)?;
            let members = load_shipments(&*repo, &request.shipments)?;

            let manifest = Manifest {
                id: ManifestId::generate(),
                shipments: request.shipments,
                truck_entry: truck.id.clone(),
                checker: request.checker,
                origin: truck.branch.clone(),
                destination: request.destination,
                status: ManifestStatus::Muat,
                departed_at: None,
                arrived_at: None,
                created_by: actor.id.clone(),
                created_at: now,
                updated_at: now,
            };

            truck.claim(
                TruckQueueStatus::Muat,
                Holder::Manifest(manifest.id.clone()),
                now,
            )?;
            for shipment in &members {
                check_member(shipment, &manifest)?;
            }

            for mut shipment in members {
                shipment.claim = Some(Claim::Manifest(manifest.id.clone()));
                shipment.updated_at = now;
                repo.put_shipment(shipment);
            }
            TruckQueueStatus::put(repo, truck);
            repo.put_manifest(manifest.clone());
            events.push(LogisticsEvent::ManifestCreated {
                manifest_id: manifest.id.clone(),
                truck_entry: manifest.truck_entry.clone(),
                shipments: manifest.shipments.len(),
            });
            Ok(manifest)
        })?;

        info!(
            id = %manifest.id,
            truck = %manifest.truck_entry,
            destination = %manifest.destination,
            shipments = manifest.shipments.len(),
            actor = %actor.id,
            "Manifest created"
        );
        Ok(manifest)
    }

    fn advance_manifest(
        &self,
        actor: &Actor,
        id: &ManifestId,
        request: ManifestAdvance,
    ) -> LogisticsResult<Manifest> {
        let manifest = self.commit(|repo, now, events| {
            let mut manifest = load_manifest(&*repo, id)?;
            let at = manifest.plan_advance(&request, now)?;
            let holder = Holder::Manifest(manifest.id.clone());
            let claim = Claim::Manifest(manifest.id.clone());

            match request.status {
                ManifestStatus::Berangkat => {
                    let members = load_shipments(&*repo, &manifest.shipments)?;
                    self.authorize_members(actor, &members, ShipmentStatus::Transit)?;

                    let mut truck =
                        load_entry::<TruckQueueStatus>(&*repo, &manifest.truck_entry)?;
                    truck.advance_held(TruckQueueStatus::Berangkat, &holder, now)?;
                    TruckQueueStatus::put(repo, truck);

                    for mut shipment in members {
                        move_member(
                            &mut shipment,
                            &claim,
                            ShipmentStatus::Transit,
                            &actor.id,
                            at,
                            events,
                        )?;
                        repo.put_shipment(shipment);
                    }
                    manifest.departed_at = Some(at);
                }
                ManifestStatus::Sampai => {
                    release_batch(repo, &manifest, now, events)?;
                    manifest.arrived_at = Some(at);
                }
                // plan_advance admits no other target.
                ManifestStatus::Muat => {
                    return Err(LogisticsError::invalid_transition(
                        "manifest",
                        manifest.status,
                        request.status,
                    ))
                }
            }

            manifest.status = request.status;
            manifest.updated_at = now;
            repo.put_manifest(manifest.clone());
            events.push(LogisticsEvent::ManifestAdvanced {
                manifest_id: manifest.id.clone(),
                status: manifest.status,
            });
            Ok(manifest)
        })?;

        info!(id = %manifest.id, status = %manifest.status, actor = %actor.id, "Manifest advanced");
        Ok(manifest)
    }

    fn amend_manifest(
        &self,
        actor: &Actor,
        id: &ManifestId,
        amendment: ManifestAmendment,
    ) -> LogisticsResult<Manifest> {
        if let Some(shipments) = &amendment.shipments {
            validate_batch(shipments)?;
        }
        if let Some(checker) = &amendment.checker {
            require_user(checker, "checker")?;
        }

        let manifest = self.commit(|repo, now, _events| {
            let mut manifest = load_manifest(&*repo, id)?;
            manifest.ensure_loading()?;
            let claim = Claim::Manifest(manifest.id.clone());

            if let Some(wanted) = amendment.shipments {
                let joining = load_shipments(&*repo, &wanted)?;
                for shipment in &joining {
                    check_member(shipment, &manifest)?;
                }

                let dropped: Vec<ShipmentId> = manifest
                    .shipments
                    .iter()
                    .filter(|sid| !wanted.contains(sid))
                    .cloned()
                    .collect();
                for sid in &dropped {
                    let mut shipment = load_shipment(&*repo, sid)?;
                    shipment.ensure_held_by(&claim)?;
                    shipment.claim = None;
                    shipment.updated_at = now;
                    repo.put_shipment(shipment);
                }
                for mut shipment in joining {
                    if shipment.claim.is_none() {
                        shipment.claim = Some(claim.clone());
                        shipment.updated_at = now;
                        repo.put_shipment(shipment);
                    }
                }
                manifest.shipments = wanted;
            }
            if let Some(checker) = amendment.checker {
                manifest.checker = checker;
            }

            manifest.updated_at = now;
            repo.put_manifest(manifest.clone());
            Ok(manifest)
        })?;

        info!(id = %manifest.id, shipments = manifest.shipments.len(), actor = %actor.id, "Manifest amended");
        Ok(manifest)
    }

    fn delete_manifest(&self, actor: &Actor, id: &ManifestId) -> LogisticsResult<()> {
        self.commit(|repo, now, events| {
            let manifest = load_manifest(&*repo, id)?;
            manifest.ensure_loading()?;
            release_batch(repo, &manifest, now, events)?;
            repo.remove_manifest(id);
            events.push(LogisticsEvent::ManifestDeleted {
                manifest_id: id.clone(),
            });
            Ok(())
        })?;
        info!(%id, actor = %actor.id, "Manifest deleted");
        Ok(())
    }

    fn manifest(&self, id: &ManifestId) -> LogisticsResult<Manifest> {
        self.store.read(|repo| load_manifest(repo, id))
    }

    fn list_manifests(&self, query: &ManifestQuery) -> Vec<Manifest> {
        let mut manifests: Vec<Manifest> = self.store.read(|repo| {
            repo.manifests()
                .into_iter()
                .filter(|m| query.matches(m))
                .collect()
        });
        manifests.sort_by_key(|m| m.created_at);
        manifests
    }

    fn print_manifest(&self, actor: &Actor, id: &ManifestId) -> LogisticsResult<DocumentRef> {
        let (manifest, shipments) = self.store.read(|repo| {
            let manifest = load_manifest(repo, id)?;
            let shipments = load_shipments(repo, &manifest.shipments)?;
            Ok::<_, LogisticsError>((manifest, shipments))
        })?;
        info!(%id, actor = %actor.id, "Printing manifest");
        self.render(DocumentRequest::ManifestSheet {
            manifest,
            shipments,
        })
    }
}
