//! # Competing Claims
//!
//! Two operators acting on the same queue entry or STT at the same moment.
//! Every mutation runs as one store transaction, so exactly one of them
//! wins and the loser sees a typed conflict, never a half-applied batch.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use lintas_core::domain::{CrewSelection, EnqueueRequest, NewVehicle};
    use lintas_core::{DeliveryApi, ErrorKind, FleetApi, LogisticsResult, ShipmentApi};
    use shared_types::{BranchId, ShipmentId, ShipmentStatus, UserId, VehicleQueueStatus};

    use crate::integration::fixtures::*;

    /// Run `op` on `n` threads released together; collect their results.
    fn race<T, F>(n: usize, op: F) -> Vec<LogisticsResult<T>>
    where
        T: Send + 'static,
        F: Fn(usize) -> LogisticsResult<T> + Send + Sync + 'static,
    {
        let barrier = Arc::new(Barrier::new(n));
        let op = Arc::new(op);
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let barrier = Arc::clone(&barrier);
                let op = Arc::clone(&op);
                thread::spawn(move || {
                    barrier.wait();
                    op(i)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect()
    }

    fn transit_at(w: &World, destination: &str) -> ShipmentId {
        let stt = w
            .service
            .create_shipment(&admin(), intake("JKT", destination, 2.0, 8_000))
            .unwrap();
        for step in [ShipmentStatus::Muat, ShipmentStatus::Transit] {
            w.service
                .advance_shipment(&admin(), &stt.id, step, None)
                .unwrap();
        }
        stt.id
    }

    #[test]
    fn test_two_deliveries_on_one_vehicle_entry() {
        let w = world();
        let entry = w.register_and_queue("SBY", "L 7001 AA");
        let batches: Vec<ShipmentId> = (0..2).map(|_| transit_at(&w, "SBY")).collect();

        let service = Arc::clone(&w.service);
        let entry_id = entry.id.clone();
        let ids = batches.clone();
        let results = race(2, move |i| {
            service.create_delivery(&admin(), delivery_request(&entry_id, &[ids[i].clone()], 100))
        });

        let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        assert_eq!(winners.len(), 1);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert!(matches!(
            loser.kind(),
            ErrorKind::AlreadyClaimed | ErrorKind::EmptyQueue
        ));

        // Only the winner's STT left TRANSIT.
        let moved = batches
            .iter()
            .filter(|id| w.service.shipment(id).unwrap().status == ShipmentStatus::Lansir)
            .count();
        assert_eq!(moved, 1);
        assert_eq!(
            w.service.vehicle_entry(&entry.id).unwrap().status,
            VehicleQueueStatus::Lansir
        );
    }

    #[test]
    fn test_one_stt_cannot_ride_two_vehicles() {
        let w = world();
        let first = w.register_and_queue("SBY", "L 7002 AA");
        let second = w.register_and_queue("SBY", "L 7003 AA");
        let stt = transit_at(&w, "SBY");

        let service = Arc::clone(&w.service);
        let entries = [first.id.clone(), second.id.clone()];
        let target = stt.clone();
        let results = race(2, move |i| {
            service.create_delivery(&admin(), delivery_request(&entries[i], &[target.clone()], 100))
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::AlreadyClaimed);

        // The losing vehicle is still free to take other work.
        let waiting = [first.id, second.id]
            .iter()
            .filter(|id| {
                w.service.vehicle_entry(id).unwrap().status == VehicleQueueStatus::Menunggu
            })
            .count();
        assert_eq!(waiting, 1);
    }

    #[test]
    fn test_concurrent_enqueue_of_one_vehicle() {
        let w = world();
        let vehicle = w
            .service
            .register_vehicle(
                &admin(),
                NewVehicle {
                    plate_number: "L 7004 AA".to_string(),
                    branch: BranchId::new("SBY"),
                    default_driver: Some(UserId::new("u-supir")),
                    default_assistant: None,
                },
            )
            .unwrap();

        let service = Arc::clone(&w.service);
        let vehicle_id = vehicle.id.clone();
        let results = race(4, move |_| {
            service.enqueue_vehicle(
                &admin(),
                EnqueueRequest {
                    branch: BranchId::new("SBY"),
                    vehicle_id: vehicle_id.clone(),
                    crew: CrewSelection::default(),
                },
            )
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.kind(), ErrorKind::DuplicateVehicle);
        }
    }

    #[test]
    fn test_queue_sequence_is_unique_under_contention() {
        let w = world();
        let vehicles: Vec<_> = (0..8)
            .map(|i| {
                w.service
                    .register_vehicle(
                        &admin(),
                        NewVehicle {
                            plate_number: format!("L 80{i:02} BB"),
                            branch: BranchId::new("SBY"),
                            default_driver: Some(UserId::new("u-supir")),
                            default_assistant: None,
                        },
                    )
                    .unwrap()
                    .id
            })
            .collect();

        let n = vehicles.len();
        let service = Arc::clone(&w.service);
        let results = race(n, move |i| {
            service.enqueue_vehicle(
                &admin(),
                EnqueueRequest {
                    branch: BranchId::new("SBY"),
                    vehicle_id: vehicles[i].clone(),
                    crew: CrewSelection::default(),
                },
            )
        });

        let mut sequences: Vec<u64> = results
            .into_iter()
            .map(|r| r.unwrap().sequence)
            .collect();
        sequences.sort_unstable();
        sequences.dedup();
        assert_eq!(sequences.len(), n);
    }
}
