//! Shared wiring for the integration flows.

use std::sync::Arc;

use lintas_core::domain::{
    Cargo, CrewSelection, EnqueueRequest, NewDelivery, NewManifest, NewVehicle, ShipmentIntake,
    TruckQueueEntry, VehicleQueueEntry,
};
use lintas_core::ports::outbound::ManualClock;
use lintas_core::{
    FleetApi, InMemoryStore, LintasConfig, LintasService, RecordingEventSink, ShipmentApi,
    StaticIdentityProvider, UrlDocumentRenderer,
};
use shared_types::{
    Actor, BranchId, CustomerId, PaymentType, QueueEntryId, Role, Rupiah, ShipmentId, Timestamp,
    UserId,
};

pub const T0: Timestamp = 1_700_000_000_000;
pub const HOUR: u64 = 3_600_000;

pub struct World {
    pub service: Arc<LintasService<InMemoryStore>>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<RecordingEventSink>,
}

pub fn actor(role: Role) -> Actor {
    Actor::new(format!("u-{role}"), role)
}

pub fn admin() -> Actor {
    actor(Role::Admin)
}

pub fn staff() -> Vec<Actor> {
    vec![
        admin(),
        actor(Role::StaffAdmin),
        actor(Role::KepalaGudang),
        actor(Role::Checker),
        actor(Role::Supir),
    ]
}

pub fn world() -> World {
    let clock = Arc::new(ManualClock::new(T0));
    let events = Arc::new(RecordingEventSink::new());
    let service = LintasService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(StaticIdentityProvider::new(staff())),
        Arc::new(UrlDocumentRenderer::new("https://docs.lintas.test")),
        LintasConfig::for_testing(),
    )
    .with_clock(clock.clone())
    .with_event_sink(events.clone());
    World {
        service: Arc::new(service),
        clock,
        events,
    }
}

pub fn intake(origin: &str, destination: &str, weight_kg: f64, rate: Rupiah) -> ShipmentIntake {
    ShipmentIntake {
        origin: BranchId::new(origin),
        destination: BranchId::new(destination),
        sender: Some(CustomerId::new("cust-toko-makmur")),
        recipient: Some(CustomerId::new("cust-bengkel-jaya")),
        cargo: Cargo {
            name: "Sparepart motor".to_string(),
            commodity: None,
            packing: Some("Kardus".to_string()),
            colly: 3,
            weight_kg,
        },
        rate_per_kg: rate,
        payment_type: PaymentType::Cash,
        forwarder_code: None,
    }
}

impl World {
    pub fn register_and_queue(&self, branch: &str, plate: &str) -> VehicleQueueEntry {
        let vehicle = self
            .service
            .register_vehicle(
                &admin(),
                NewVehicle {
                    plate_number: plate.to_string(),
                    branch: BranchId::new(branch),
                    default_driver: Some(UserId::new("u-supir")),
                    default_assistant: None,
                },
            )
            .unwrap();
        self.service
            .enqueue_vehicle(
                &admin(),
                EnqueueRequest {
                    branch: BranchId::new(branch),
                    vehicle_id: vehicle.id,
                    crew: CrewSelection::default(),
                },
            )
            .unwrap()
    }

    pub fn register_and_queue_truck(&self, branch: &str, plate: &str) -> TruckQueueEntry {
        let vehicle = self
            .service
            .register_vehicle(
                &admin(),
                NewVehicle {
                    plate_number: plate.to_string(),
                    branch: BranchId::new(branch),
                    default_driver: Some(UserId::new("u-supir")),
                    default_assistant: None,
                },
            )
            .unwrap();
        self.service
            .enqueue_truck(
                &admin(),
                EnqueueRequest {
                    branch: BranchId::new(branch),
                    vehicle_id: vehicle.id,
                    crew: CrewSelection::default(),
                },
            )
            .unwrap()
    }
}

pub fn manifest_request(truck: &QueueEntryId, ids: &[ShipmentId], destination: &str) -> NewManifest {
    NewManifest {
        shipments: ids.to_vec(),
        truck_entry: truck.clone(),
        checker: UserId::new("u-checker"),
        destination: BranchId::new(destination),
    }
}

pub fn delivery_request(entry: &QueueEntryId, ids: &[ShipmentId], odometer: u64) -> NewDelivery {
    NewDelivery {
        shipments: ids.to_vec(),
        vehicle_entry: entry.clone(),
        checker: UserId::new("u-checker"),
        admin: None,
        departure_odometer: odometer,
    }
}
