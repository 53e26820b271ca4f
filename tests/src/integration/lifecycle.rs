//! # Shipment Lifecycle Flows
//!
//! Follows STTs through every component that can own them:
//!
//! 1. **Intake**: PENDING with the computed price
//! 2. **Manifest**: MUAT → TRANSIT on departure, released on arrival
//! 3. **Delivery**: TRANSIT → LANSIR → TERKIRIM, vehicle back in the queue
//! 4. **Collection**: billed, paid in installments, settled manually
//! 5. **Return**: a failed delivery goes back to PENDING and ships again

#[cfg(test)]
mod tests {
    use lintas_core::domain::{
        CloseReturn, DeliveryUpdate, ManifestAdvance, NewCollection, NewPayment, NewReturn,
    };
    use lintas_core::{
        CollectionApi, DeliveryApi, FleetApi, IdentityApi, LogisticsError, ManifestApi, ReturnApi,
        ShipmentApi,
    };
    use shared_bus::LogisticsEvent;
    use shared_types::{
        BranchId, CollectionStatus, CustomerId, CustomerRole, DeliveryStatus, ManifestStatus,
        Role, ShipmentId, ShipmentStatus, TruckQueueStatus, VehicleQueueStatus,
    };

    use crate::integration::fixtures::*;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Two JKT→SBY STTs loaded, carried and unloaded at SBY.
    fn arrived_at_sby(w: &World) -> Vec<ShipmentId> {
        let truck = w.register_and_queue_truck("JKT", "B 9001 TRK");
        let ids: Vec<ShipmentId> = (0..2)
            .map(|_| {
                let s = w
                    .service
                    .create_shipment(&admin(), intake("JKT", "SBY", 10.0, 5_000))
                    .unwrap();
                w.service
                    .advance_shipment(&actor(Role::StaffAdmin), &s.id, ShipmentStatus::Muat, None)
                    .unwrap();
                s.id
            })
            .collect();

        let manifest = w
            .service
            .create_manifest(&admin(), manifest_request(&truck.id, &ids, "SBY"))
            .unwrap();
        w.service
            .advance_manifest(
                &admin(),
                &manifest.id,
                ManifestAdvance {
                    status: ManifestStatus::Berangkat,
                    at: None,
                },
            )
            .unwrap();
        w.clock.advance(10 * HOUR);
        w.service
            .advance_manifest(
                &admin(),
                &manifest.id,
                ManifestAdvance {
                    status: ManifestStatus::Sampai,
                    at: Some(T0 + 10 * HOUR),
                },
            )
            .unwrap();
        ids
    }

    fn delivered() -> DeliveryUpdate {
        DeliveryUpdate {
            return_odometer: Some(1_042),
            recipient_name: Some("Pak Budi".to_string()),
            ..DeliveryUpdate::to(DeliveryStatus::Terkirim)
        }
    }

    // =============================================================================
    // INTAKE
    // =============================================================================

    #[test]
    fn test_intake_prices_by_weight() {
        let w = world();
        let stt = w
            .service
            .create_shipment(&admin(), intake("JKT", "SBY", 10.0, 5_000))
            .unwrap();
        assert_eq!(stt.harga, 50_000);
        assert_eq!(stt.status, ShipmentStatus::Pending);

        let by_number = w
            .service
            .shipment_by_tracking_number(&stt.tracking_number)
            .unwrap();
        assert_eq!(by_number.id, stt.id);
    }

    // =============================================================================
    // MANIFEST → DELIVERY → COLLECTION
    // =============================================================================

    #[test]
    fn test_manifest_departure_moves_members_to_transit() {
        let w = world();
        let truck = w.register_and_queue_truck("JKT", "B 9002 TRK");
        let ids: Vec<ShipmentId> = (0..2)
            .map(|_| {
                let s = w
                    .service
                    .create_shipment(&admin(), intake("JKT", "BDG", 4.0, 6_000))
                    .unwrap();
                w.service
                    .advance_shipment(&admin(), &s.id, ShipmentStatus::Muat, None)
                    .unwrap()
                    .id
            })
            .collect();
        let manifest = w
            .service
            .create_manifest(&admin(), manifest_request(&truck.id, &ids, "BDG"))
            .unwrap();

        w.service
            .advance_manifest(
                &admin(),
                &manifest.id,
                ManifestAdvance {
                    status: ManifestStatus::Berangkat,
                    at: None,
                },
            )
            .unwrap();

        for id in &ids {
            let s = w.service.shipment(id).unwrap();
            assert_eq!(s.status, ShipmentStatus::Transit);
            // Held by the manifest, so nobody can move it directly.
            assert!(w
                .service
                .allowed_transitions(&admin(), id)
                .unwrap()
                .is_empty());
        }
        let truck = w.service.truck_entry(&truck.id).unwrap();
        assert_eq!(truck.status, TruckQueueStatus::Berangkat);
    }

    #[test]
    fn test_full_run_from_intake_to_settled_collection() {
        let w = world();
        let ids = arrived_at_sby(&w);
        let vehicle = w.register_and_queue("SBY", "L 1234 AB");

        let delivery = w
            .service
            .create_delivery(&admin(), delivery_request(&vehicle.id, &ids, 1_000))
            .unwrap();
        for id in &ids {
            assert_eq!(w.service.shipment(id).unwrap().status, ShipmentStatus::Lansir);
        }
        assert_eq!(
            w.service.vehicle_entry(&vehicle.id).unwrap().status,
            VehicleQueueStatus::Lansir
        );

        w.clock.advance(2 * HOUR);
        let done = w
            .service
            .update_delivery_status(&admin(), &delivery.id, delivered())
            .unwrap();
        assert_eq!(done.status, DeliveryStatus::Terkirim);

        let entry = w.service.vehicle_entry(&vehicle.id).unwrap();
        assert_eq!(entry.status, VehicleQueueStatus::Menunggu);
        assert_eq!(w.service.next_vehicle(&BranchId::new("SBY")).unwrap().id, vehicle.id);

        let history = w.service.shipment_history(&ids[0]).unwrap();
        let statuses: Vec<ShipmentStatus> = history.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                ShipmentStatus::Pending,
                ShipmentStatus::Muat,
                ShipmentStatus::Transit,
                ShipmentStatus::Lansir,
                ShipmentStatus::Terkirim,
            ]
        );

        // 100 000 billed, 60 000 paid: stays BELUM_LUNAS until set by hand.
        let collection = w
            .service
            .create_collection(
                &actor(Role::StaffAdmin),
                NewCollection {
                    customer: CustomerId::new("cust-toko-makmur"),
                    customer_role: CustomerRole::Pengirim,
                    shipments: ids.clone(),
                    branch: BranchId::new("JKT"),
                },
            )
            .unwrap();
        assert_eq!(collection.collection.total_billed, 100_000);

        w.service
            .add_payment(
                &actor(Role::StaffAdmin),
                &collection.collection.id,
                NewPayment {
                    amount: 60_000,
                    date: None,
                    note: Some("Transfer BCA".to_string()),
                },
            )
            .unwrap();
        let view = w.service.collection(&collection.collection.id).unwrap();
        assert_eq!(view.paid, 60_000);
        assert_eq!(view.remaining, 40_000);
        assert_eq!(view.collection.status, CollectionStatus::BelumLunas);

        let settled = w
            .service
            .set_collection_status(&admin(), &collection.collection.id, CollectionStatus::Lunas)
            .unwrap();
        assert_eq!(settled.collection.status, CollectionStatus::Lunas);
        assert_eq!(settled.remaining, 40_000);

        let invoice = w
            .service
            .generate_invoice(&admin(), &collection.collection.id)
            .unwrap();
        assert_eq!(invoice.kind, "invoice");
        assert!(invoice.reference.ends_with(".pdf"));
    }

    #[test]
    fn test_odometer_below_departure_is_rejected() {
        let w = world();
        let ids = arrived_at_sby(&w);
        let vehicle = w.register_and_queue("SBY", "L 5678 CD");
        let delivery = w
            .service
            .create_delivery(&admin(), delivery_request(&vehicle.id, &ids, 1_000))
            .unwrap();

        let err = w
            .service
            .update_delivery_status(
                &admin(),
                &delivery.id,
                DeliveryUpdate {
                    return_odometer: Some(900),
                    ..delivered()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LogisticsError::Validation(_)));

        // Nothing moved.
        assert_eq!(
            w.service.delivery(&delivery.id).unwrap().status,
            DeliveryStatus::Lansir
        );
        for id in &ids {
            assert_eq!(w.service.shipment(id).unwrap().status, ShipmentStatus::Lansir);
        }
    }

    // =============================================================================
    // RETURN ROUND TRIP
    // =============================================================================

    #[test]
    fn test_failed_delivery_returns_and_ships_again() {
        let w = world();
        let ids = arrived_at_sby(&w);
        let stuck = ids[0].clone();
        let vehicle = w.register_and_queue("SBY", "L 4321 EF");
        let delivery = w
            .service
            .create_delivery(&admin(), delivery_request(&vehicle.id, &[stuck.clone()], 2_000))
            .unwrap();
        w.service
            .update_delivery_status(
                &admin(),
                &delivery.id,
                DeliveryUpdate {
                    note: Some("Alamat tidak ditemukan".to_string()),
                    retire_vehicle: true,
                    ..DeliveryUpdate::to(DeliveryStatus::BelumSelesai)
                },
            )
            .unwrap();
        assert_eq!(w.service.shipment(&stuck).unwrap().status, ShipmentStatus::Lansir);
        assert_eq!(
            w.service.vehicle_entry(&vehicle.id).unwrap().status,
            VehicleQueueStatus::Kembali
        );

        let record = w
            .service
            .open_return(
                &admin(),
                NewReturn {
                    shipments: vec![stuck.clone()],
                    branch: BranchId::new("SBY"),
                    ship_date: None,
                },
            )
            .unwrap();
        assert_eq!(w.service.shipment(&stuck).unwrap().status, ShipmentStatus::Return);

        w.clock.advance(24 * HOUR);
        w.service
            .close_return(
                &actor(Role::StaffAdmin),
                &record.id,
                CloseReturn {
                    arrival_date: Some(T0 + 34 * HOUR),
                    receipt_signature: Some("ttd-gudang-jkt".to_string()),
                },
            )
            .unwrap();

        let reopened = w.service.shipment(&stuck).unwrap();
        assert_eq!(reopened.status, ShipmentStatus::Pending);
        assert_eq!(reopened.claim, None);

        let again = w
            .service
            .advance_shipment(&actor(Role::KepalaGudang), &stuck, ShipmentStatus::Muat, None)
            .unwrap();
        assert_eq!(again.status, ShipmentStatus::Muat);
    }

    #[test]
    fn test_staff_cannot_skip_edges_or_take_other_roles_edges() {
        let w = world();
        let stt = w
            .service
            .create_shipment(&admin(), intake("JKT", "SBY", 1.0, 10_000))
            .unwrap();

        let skip = w
            .service
            .advance_shipment(&admin(), &stt.id, ShipmentStatus::Transit, None)
            .unwrap_err();
        assert!(matches!(skip, LogisticsError::InvalidTransition { .. }));

        let driver = w
            .service
            .advance_shipment(&actor(Role::Supir), &stt.id, ShipmentStatus::Muat, None)
            .unwrap_err();
        assert!(matches!(driver, LogisticsError::Forbidden { .. }));

        assert_eq!(
            w.service
                .allowed_transitions(&actor(Role::StaffAdmin), &stt.id)
                .unwrap(),
            vec![ShipmentStatus::Muat]
        );
    }

    #[test]
    fn test_batch_operations_honour_each_roles_grants() {
        fn refused<T>(result: Result<T, LogisticsError>) {
            assert!(matches!(result, Err(LogisticsError::Forbidden { .. })));
        }
        let w = world();

        // Departure is the MUAT → TRANSIT edge: warehouse head yes, staff admin no.
        let truck = w.register_and_queue_truck("JKT", "B 9003 TRK");
        let stt = w
            .service
            .create_shipment(&admin(), intake("JKT", "BDG", 3.0, 5_000))
            .unwrap();
        w.service
            .advance_shipment(&admin(), &stt.id, ShipmentStatus::Muat, None)
            .unwrap();
        let manifest = w
            .service
            .create_manifest(&admin(), manifest_request(&truck.id, &[stt.id.clone()], "BDG"))
            .unwrap();
        let depart = ManifestAdvance {
            status: ManifestStatus::Berangkat,
            at: None,
        };
        refused(w.service.advance_manifest(&actor(Role::StaffAdmin), &manifest.id, depart.clone()));
        assert_eq!(w.service.shipment(&stt.id).unwrap().status, ShipmentStatus::Muat);
        w.service
            .advance_manifest(&actor(Role::KepalaGudang), &manifest.id, depart)
            .unwrap();
        assert_eq!(w.service.shipment(&stt.id).unwrap().status, ShipmentStatus::Transit);

        // Dispatch and delivery: the checker loads, the driver hands over.
        let ids = arrived_at_sby(&w);
        let vehicle = w.register_and_queue("SBY", "L 2222 JK");
        refused(w.service.create_delivery(
            &actor(Role::StaffAdmin),
            delivery_request(&vehicle.id, &ids[..1], 300),
        ));
        refused(w.service.create_delivery(
            &actor(Role::Other("kurir".to_string())),
            delivery_request(&vehicle.id, &ids[..1], 300),
        ));
        let delivery = w
            .service
            .create_delivery(&actor(Role::Checker), delivery_request(&vehicle.id, &ids[..1], 300))
            .unwrap();
        refused(w.service.update_delivery_status(
            &actor(Role::KepalaGudang),
            &delivery.id,
            delivered(),
        ));
        assert_eq!(w.service.shipment(&ids[0]).unwrap().status, ShipmentStatus::Lansir);
        w.service
            .update_delivery_status(&actor(Role::Supir), &delivery.id, delivered())
            .unwrap();
        assert_eq!(w.service.shipment(&ids[0]).unwrap().status, ShipmentStatus::Terkirim);

        // A failed run may be reported by the driver, but only a supervisor
        // sends the STT back.
        let second = w.register_and_queue("SBY", "L 3333 LM");
        let failed = w
            .service
            .create_delivery(&actor(Role::Supir), delivery_request(&second.id, &ids[1..], 300))
            .unwrap();
        w.service
            .update_delivery_status(
                &actor(Role::Supir),
                &failed.id,
                DeliveryUpdate {
                    note: Some("Gudang penerima tutup".to_string()),
                    ..DeliveryUpdate::to(DeliveryStatus::BelumSelesai)
                },
            )
            .unwrap();
        let back = NewReturn {
            shipments: ids[1..].to_vec(),
            branch: BranchId::new("SBY"),
            ship_date: None,
        };
        refused(w.service.open_return(&actor(Role::Supir), back.clone()));
        refused(w.service.open_return(&actor(Role::StaffAdmin), back.clone()));
        assert_eq!(w.service.shipment(&ids[1]).unwrap().status, ShipmentStatus::Lansir);
        w.service.open_return(&actor(Role::Manager), back).unwrap();
        assert_eq!(w.service.shipment(&ids[1]).unwrap().status, ShipmentStatus::Return);
    }

    // =============================================================================
    // EVENTS
    // =============================================================================

    #[test]
    fn test_rejected_operations_emit_nothing() {
        let w = world();
        let ids = arrived_at_sby(&w);
        let vehicle = w.register_and_queue("SBY", "L 1111 GH");
        w.events.take();

        let pending = w
            .service
            .create_shipment(&admin(), intake("JKT", "SBY", 1.0, 1_000))
            .unwrap();
        w.events.take();

        let mut mixed = ids.clone();
        mixed.push(pending.id);
        assert!(w
            .service
            .create_delivery(&admin(), delivery_request(&vehicle.id, &mixed, 10))
            .is_err());
        assert!(w.events.events().is_empty());

        // The failed batch left the vehicle and the good STTs untouched.
        assert_eq!(
            w.service.vehicle_entry(&vehicle.id).unwrap().status,
            VehicleQueueStatus::Menunggu
        );
        for id in &ids {
            assert_eq!(w.service.shipment(id).unwrap().claim, None);
        }

        w.service
            .create_delivery(&admin(), delivery_request(&vehicle.id, &ids, 10))
            .unwrap();
        let events = w.events.take();
        assert!(events
            .iter()
            .any(|e| matches!(e, LogisticsEvent::DeliveryDispatched { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, LogisticsEvent::ShipmentStatusChanged { .. }))
                .count(),
            2
        );
    }
}
