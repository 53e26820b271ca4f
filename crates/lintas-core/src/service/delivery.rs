//! Delivery dispatcher: puts a batch of arrived shipments on one local
//! vehicle and settles them when the vehicle comes back.

use shared_bus::LogisticsEvent;
use shared_types::{
    Actor, BranchId, DeliveryId, DeliveryStatus, ShipmentStatus, VehicleQueueStatus,
};
use tracing::info;

use super::fleet::{load_entry, QueueTable};
use super::{load_delivery, load_shipments, move_member, require_user, LintasService};
use crate::domain::manifest::validate_batch;
use crate::domain::{
    Claim, Delivery, DeliveryQuery, DeliveryUpdate, Holder, LogisticsError, LogisticsResult,
    NewDelivery, QueueState, Shipment,
};
use crate::ports::inbound::DeliveryApi;
use crate::ports::outbound::LogisticsStore;

/// Eligibility of one STT for dispatch from `branch`.
fn check_dispatchable(shipment: &Shipment, branch: &BranchId) -> LogisticsResult<()> {
    shipment.ensure_unclaimed()?;
    let ready = match shipment.status {
        ShipmentStatus::Transit => true,
        ShipmentStatus::Muat => shipment.is_branch_local(),
        _ => false,
    };
    if !ready {
        return Err(LogisticsError::invalid_transition(
            "shipment",
            shipment.status,
            ShipmentStatus::Lansir,
        ));
    }
    if shipment.destination != *branch {
        return Err(LogisticsError::validation(format!(
            "shipment {} goes to {}, vehicle is queued at {branch}",
            shipment.id, shipment.destination
        )));
    }
    Ok(())
}

impl<S: LogisticsStore> DeliveryApi for LintasService<S> {
    fn create_delivery(&self, actor: &Actor, request: NewDelivery) -> LogisticsResult<Delivery> {
        validate_batch(&request.shipments)?;
        require_user(&request.checker, "checker")?;

        let delivery = self.commit(|repo, now, events| {
            let mut entry = load_entry::<VehicleQueueStatus>(&*repo, &request.vehicle_entry)?;
            let members = load_shipments(&*repo, &request.shipments)?;
            // Branch-local MUAT members skip TRANSIT, so dispatch is always
            // authorized as the TRANSIT → LANSIR edge.
            self.authorize(actor, ShipmentStatus::Transit, ShipmentStatus::Lansir)?;
            let id = DeliveryId::generate();

            entry.claim(VehicleQueueStatus::Lansir, Holder::Delivery(id.clone()), now)?;
            for shipment in &members {
                check_dispatchable(shipment, &entry.branch)?;
            }

            let claim = Claim::Delivery(id.clone());
            for mut shipment in members {
                shipment.claim = Some(claim.clone());
                shipment.last_delivery = Some(id.clone());
                move_member(
                    &mut shipment,
                    &claim,
                    ShipmentStatus::Lansir,
                    &actor.id,
                    now,
                    events,
                )?;
                repo.put_shipment(shipment);
            }

            let delivery = Delivery {
                id,
                shipments: request.shipments,
                vehicle_entry: entry.id.clone(),
                vehicle_id: entry.vehicle_id.clone(),
                driver: entry.driver.clone(),
                assistant: entry.assistant.clone(),
                branch: entry.branch.clone(),
                checker: request.checker,
                admin: request.admin,
                departure_odometer: request.departure_odometer,
                return_odometer: None,
                recipient_name: None,
                note: None,
                status: DeliveryStatus::Lansir,
                departed_at: now,
                arrived_at: None,
                created_by: actor.id.clone(),
                updated_at: now,
            };
            VehicleQueueStatus::put(repo, entry);
            repo.put_delivery(delivery.clone());
            events.push(LogisticsEvent::DeliveryDispatched {
                delivery_id: delivery.id.clone(),
                vehicle_entry: delivery.vehicle_entry.clone(),
                shipments: delivery.shipments.len(),
            });
            Ok(delivery)
        })?;

        info!(
            id = %delivery.id,
            entry = %delivery.vehicle_entry,
            branch = %delivery.branch,
            shipments = delivery.shipments.len(),
            actor = %actor.id,
            "Delivery dispatched"
        );
        Ok(delivery)
    }

    fn update_delivery_status(
        &self,
        actor: &Actor,
        id: &DeliveryId,
        update: DeliveryUpdate,
    ) -> LogisticsResult<Delivery> {
        let delivery = self.commit(|repo, now, events| {
            let mut delivery = load_delivery(&*repo, id)?;
            delivery.apply_update(&update, now)?;
            if delivery.status == DeliveryStatus::Terkirim {
                self.authorize(actor, ShipmentStatus::Lansir, ShipmentStatus::Terkirim)?;
            }

            if delivery.status.is_terminal() {
                let claim = Claim::Delivery(delivery.id.clone());
                let settled_at = delivery.arrived_at.unwrap_or(now);
                for mut shipment in load_shipments(&*repo, &delivery.shipments)? {
                    if delivery.status == DeliveryStatus::Terkirim {
                        move_member(
                            &mut shipment,
                            &claim,
                            ShipmentStatus::Terkirim,
                            &actor.id,
                            settled_at,
                            events,
                        )?;
                    } else {
                        // Stays LANSIR until the return handler picks it up.
                        shipment.ensure_held_by(&claim)?;
                    }
                    shipment.claim = None;
                    shipment.updated_at = now;
                    repo.put_shipment(shipment);
                }

                let target = if update.retire_vehicle {
                    VehicleQueueStatus::Kembali
                } else {
                    VehicleQueueStatus::Menunggu
                };
                let holder = Holder::Delivery(delivery.id.clone());
                let mut entry = load_entry::<VehicleQueueStatus>(&*repo, &delivery.vehicle_entry)?;
                if entry.release(target, Some(&holder), now)? {
                    events.push(LogisticsEvent::QueueEntryReleased {
                        entry_id: entry.id.clone(),
                        kind: VehicleQueueStatus::KIND,
                        status: target.to_string(),
                    });
                    VehicleQueueStatus::put(repo, entry);
                }
            }

            repo.put_delivery(delivery.clone());
            events.push(LogisticsEvent::DeliveryStatusChanged {
                delivery_id: delivery.id.clone(),
                status: delivery.status,
            });
            Ok(delivery)
        })?;

        info!(id = %delivery.id, status = %delivery.status, actor = %actor.id, "Delivery updated");
        Ok(delivery)
    }

    fn delivery(&self, id: &DeliveryId) -> LogisticsResult<Delivery> {
        self.store.read(|repo| load_delivery(repo, id))
    }

    fn list_deliveries(&self, query: &DeliveryQuery) -> Vec<Delivery> {
        let mut deliveries: Vec<Delivery> = self.store.read(|repo| {
            repo.deliveries()
                .into_iter()
                .filter(|d| query.matches(d))
                .collect()
        });
        deliveries.sort_by_key(|d| d.departed_at);
        deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::inbound::{FleetApi, ShipmentApi};
    use crate::service::testkit::{actor, admin, harness, Harness, T0};
    use shared_types::{QueueEntryId, Role, ShipmentId, UserId};

    fn new_delivery(entry: &QueueEntryId, ids: &[ShipmentId]) -> NewDelivery {
        NewDelivery {
            shipments: ids.to_vec(),
            vehicle_entry: entry.clone(),
            checker: UserId::new("u-checker"),
            admin: None,
            departure_odometer: 1_000,
        }
    }

    fn dispatched(h: &Harness) -> (Delivery, ShipmentId) {
        let entry = h.queued_vehicle("SBY");
        let stt = h.shipment_at("JKT", "SBY", ShipmentStatus::Transit);
        let delivery = h
            .service
            .create_delivery(&admin(), new_delivery(&entry.id, &[stt.id.clone()]))
            .unwrap();
        (delivery, stt.id)
    }

    fn delivered(odometer: u64) -> DeliveryUpdate {
        DeliveryUpdate {
            return_odometer: Some(odometer),
            recipient_name: Some("Budi".to_string()),
            ..DeliveryUpdate::to(DeliveryStatus::Terkirim)
        }
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    #[test]
    fn test_dispatch_claims_vehicle_and_members() {
        let h = harness();
        let (delivery, stt) = dispatched(&h);
        assert_eq!(delivery.status, DeliveryStatus::Lansir);
        assert_eq!(delivery.departed_at, T0);
        assert_eq!(delivery.driver, UserId::new("u-supir"));

        let entry = h.service.vehicle_entry(&delivery.vehicle_entry).unwrap();
        assert_eq!(entry.status, VehicleQueueStatus::Lansir);

        let s = h.service.shipment(&stt).unwrap();
        assert_eq!(s.status, ShipmentStatus::Lansir);
        assert_eq!(s.claim, Some(Claim::Delivery(delivery.id.clone())));
        assert_eq!(s.last_delivery, Some(delivery.id));
    }

    #[test]
    fn test_branch_local_muat_is_dispatchable() {
        let h = harness();
        let entry = h.queued_vehicle("JKT");
        let local = h.shipment_at("JKT", "JKT", ShipmentStatus::Muat);
        h.service
            .create_delivery(&admin(), new_delivery(&entry.id, &[local.id]))
            .unwrap();
    }

    #[test]
    fn test_dispatch_eligibility_errors() {
        let h = harness();
        let entry = h.queued_vehicle("SBY");

        let pending = h.shipment("JKT", "SBY");
        let err = h
            .service
            .create_delivery(&admin(), new_delivery(&entry.id, &[pending.id]))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::InvalidTransition { .. }));

        let elsewhere = h.shipment_at("JKT", "BDG", ShipmentStatus::Transit);
        let err = h
            .service
            .create_delivery(&admin(), new_delivery(&entry.id, &[elsewhere.id]))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::Validation(_)));

        let entry = h.service.vehicle_entry(&entry.id).unwrap();
        assert_eq!(entry.status, VehicleQueueStatus::Menunggu);
    }

    #[test]
    fn test_dispatch_needs_the_lansir_grant() {
        let h = harness();
        let entry = h.queued_vehicle("SBY");
        let stt = h.shipment_at("JKT", "SBY", ShipmentStatus::Transit);
        let local_entry = h.queued_vehicle("JKT");
        let local = h.shipment_at("JKT", "JKT", ShipmentStatus::Muat);
        h.events.take();

        for role in [Role::StaffAdmin, Role::KepalaGudang, Role::Other("kurir".into())] {
            let err = h
                .service
                .create_delivery(&actor(role.clone()), new_delivery(&entry.id, &[stt.id.clone()]))
                .unwrap_err();
            assert!(matches!(err, LogisticsError::Forbidden { .. }));

            let err = h
                .service
                .create_delivery(&actor(role), new_delivery(&local_entry.id, &[local.id.clone()]))
                .unwrap_err();
            assert!(matches!(err, LogisticsError::Forbidden { .. }));
        }
        assert!(h.events.events().is_empty());
        assert!(h.service.list_deliveries(&DeliveryQuery::default()).is_empty());
        let s = h.service.shipment(&stt.id).unwrap();
        assert_eq!(s.status, ShipmentStatus::Transit);
        assert_eq!(s.claim, None);
        assert_eq!(
            h.service.vehicle_entry(&entry.id).unwrap().status,
            VehicleQueueStatus::Menunggu
        );

        h.service
            .create_delivery(&actor(Role::Supir), new_delivery(&entry.id, &[stt.id]))
            .unwrap();
        h.service
            .create_delivery(&actor(Role::Checker), new_delivery(&local_entry.id, &[local.id]))
            .unwrap();
    }

    #[test]
    fn test_busy_vehicle_is_claimed() {
        let h = harness();
        let (delivery, _) = dispatched(&h);
        let other = h.shipment_at("JKT", "SBY", ShipmentStatus::Transit);
        let err = h
            .service
            .create_delivery(&admin(), new_delivery(&delivery.vehicle_entry, &[other.id]))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::AlreadyClaimed { .. }));

        // An outside release of the busy entry is refused too.
        let err = h
            .service
            .release_vehicle(&admin(), &delivery.vehicle_entry, VehicleQueueStatus::Menunggu)
            .unwrap_err();
        assert!(matches!(err, LogisticsError::AlreadyClaimed { .. }));
    }

    // =========================================================================
    // STATUS UPDATES
    // =========================================================================

    #[test]
    fn test_terkirim_settles_members_and_frees_vehicle() {
        let h = harness();
        let (delivery, stt) = dispatched(&h);
        h.clock.advance(60_000);

        let done = h
            .service
            .update_delivery_status(&admin(), &delivery.id, delivered(1_250))
            .unwrap();
        assert_eq!(done.status, DeliveryStatus::Terkirim);
        assert_eq!(done.arrived_at, Some(T0 + 60_000));

        let s = h.service.shipment(&stt).unwrap();
        assert_eq!(s.status, ShipmentStatus::Terkirim);
        assert_eq!(s.claim, None);

        let entry = h.service.vehicle_entry(&delivery.vehicle_entry).unwrap();
        assert_eq!(entry.status, VehicleQueueStatus::Menunggu);
        assert_eq!(entry.held_by, None);

        // The vehicle can be released again without effect.
        h.service
            .release_vehicle(&admin(), &entry.id, VehicleQueueStatus::Menunggu)
            .unwrap();
    }

    #[test]
    fn test_terkirim_needs_the_terkirim_grant() {
        let h = harness();
        let (delivery, stt) = dispatched(&h);
        h.events.take();

        for role in [Role::StaffAdmin, Role::KepalaGudang, Role::Other("kurir".into())] {
            let err = h
                .service
                .update_delivery_status(&actor(role), &delivery.id, delivered(1_200))
                .unwrap_err();
            assert!(matches!(err, LogisticsError::Forbidden { .. }));
        }
        assert!(h.events.events().is_empty());
        assert_eq!(
            h.service.delivery(&delivery.id).unwrap().status,
            DeliveryStatus::Lansir
        );
        let s = h.service.shipment(&stt).unwrap();
        assert_eq!(s.status, ShipmentStatus::Lansir);
        assert_eq!(s.claim, Some(Claim::Delivery(delivery.id.clone())));

        let done = h
            .service
            .update_delivery_status(&actor(Role::Supir), &delivery.id, delivered(1_200))
            .unwrap();
        assert_eq!(done.status, DeliveryStatus::Terkirim);
    }

    #[test]
    fn test_lower_return_odometer_rejected() {
        let h = harness();
        let (delivery, stt) = dispatched(&h);
        let err = h
            .service
            .update_delivery_status(&admin(), &delivery.id, delivered(900))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::Validation(_)));
        assert_eq!(
            h.service.shipment(&stt).unwrap().status,
            ShipmentStatus::Lansir
        );
    }

    #[test]
    fn test_belum_selesai_unclaims_but_keeps_lansir() {
        let h = harness();
        let (delivery, stt) = dispatched(&h);
        let update = DeliveryUpdate {
            note: Some("Penerima pindah alamat".to_string()),
            retire_vehicle: true,
            ..DeliveryUpdate::to(DeliveryStatus::BelumSelesai)
        };
        h.service
            .update_delivery_status(&admin(), &delivery.id, update)
            .unwrap();

        let s = h.service.shipment(&stt).unwrap();
        assert_eq!(s.status, ShipmentStatus::Lansir);
        assert_eq!(s.claim, None);
        let entry = h.service.vehicle_entry(&delivery.vehicle_entry).unwrap();
        assert_eq!(entry.status, VehicleQueueStatus::Kembali);
    }

    #[test]
    fn test_finished_delivery_is_immutable() {
        let h = harness();
        let (delivery, _) = dispatched(&h);
        h.service
            .update_delivery_status(&admin(), &delivery.id, delivered(1_000))
            .unwrap();
        let err = h
            .service
            .update_delivery_status(&admin(), &delivery.id, DeliveryUpdate::to(DeliveryStatus::Lansir))
            .unwrap_err();
        assert!(matches!(err, LogisticsError::Immutable { .. }));
    }

    #[test]
    fn test_list_by_status() {
        let h = harness();
        let (delivery, _) = dispatched(&h);
        dispatched(&h);
        h.service
            .update_delivery_status(&admin(), &delivery.id, delivered(1_100))
            .unwrap();
        let open = h.service.list_deliveries(&DeliveryQuery {
            branch: Some("SBY".into()),
            status: Some(DeliveryStatus::Lansir),
        });
        assert_eq!(open.len(), 1);
    }
}
