//! Inbound (Driving) ports for the Lintas core.
//!
//! One trait per component. Every mutating call takes the acting [`Actor`]
//! and runs as a single atomic transaction.

use shared_types::{
    Actor, BranchId, CollectionId, CollectionStatus, DeliveryId, ManifestId, QueueEntryId,
    ReturnId, Role, ShipmentId, ShipmentStatus, TruckQueueStatus, UserId, VehicleId,
    VehicleQueueStatus,
};

use crate::domain::{
    CloseReturn, CollectionQuery, CollectionView, Delivery, DeliveryQuery,
    DeliveryUpdate, DocumentRef, Edge, EnqueueRequest, LogisticsResult, Manifest,
    ManifestAdvance, ManifestAmendment, ManifestQuery, NewCollection, NewDelivery, NewManifest,
    NewPayment, NewReturn, NewVehicle, Payment, QueueQuery, ReturnQuery, ReturnRecord, Shipment,
    ShipmentIntake, ShipmentPatch, ShipmentQuery, StatusRecord, TruckQueueEntry, Vehicle,
    VehiclePatch, VehicleQueueEntry,
};

/// Identity & Role Gate.
pub trait IdentityApi {
    /// Look up the acting user. Unknown users are `Forbidden`.
    fn resolve_actor(&self, user: &UserId) -> LogisticsResult<Actor>;

    /// Every STT edge the role may take.
    fn permitted_edges(&self, role: &Role) -> Vec<Edge>;

    /// Statuses the actor may advance this STT to right now.
    fn allowed_transitions(
        &self,
        actor: &Actor,
        id: &ShipmentId,
    ) -> LogisticsResult<Vec<ShipmentStatus>>;
}

/// Shipment (STT) state machine.
pub trait ShipmentApi {
    fn create_shipment(&self, actor: &Actor, intake: ShipmentIntake) -> LogisticsResult<Shipment>;

    /// Move an unclaimed STT one edge forward (or to RETURN).
    fn advance_shipment(
        &self,
        actor: &Actor,
        id: &ShipmentId,
        to: ShipmentStatus,
        note: Option<String>,
    ) -> LogisticsResult<Shipment>;

    /// Edit a PENDING STT.
    fn update_shipment(
        &self,
        actor: &Actor,
        id: &ShipmentId,
        patch: ShipmentPatch,
    ) -> LogisticsResult<Shipment>;

    fn shipment(&self, id: &ShipmentId) -> LogisticsResult<Shipment>;
    fn shipment_by_tracking_number(&self, number: &str) -> LogisticsResult<Shipment>;
    fn list_shipments(&self, query: &ShipmentQuery) -> Vec<Shipment>;
    fn shipment_history(&self, id: &ShipmentId) -> LogisticsResult<Vec<StatusRecord>>;
    fn print_shipment(&self, actor: &Actor, id: &ShipmentId) -> LogisticsResult<DocumentRef>;
}

/// Fleet queue manager and vehicle registry.
pub trait FleetApi {
    fn register_vehicle(&self, actor: &Actor, vehicle: NewVehicle) -> LogisticsResult<Vehicle>;
    fn update_vehicle(
        &self,
        actor: &Actor,
        id: &VehicleId,
        patch: VehiclePatch,
    ) -> LogisticsResult<Vehicle>;
    fn vehicle(&self, id: &VehicleId) -> LogisticsResult<Vehicle>;
    fn list_vehicles(&self, branch: Option<&BranchId>) -> Vec<Vehicle>;

    fn enqueue_vehicle(
        &self,
        actor: &Actor,
        request: EnqueueRequest,
    ) -> LogisticsResult<VehicleQueueEntry>;
    fn next_vehicle(&self, branch: &BranchId) -> LogisticsResult<VehicleQueueEntry>;
    fn release_vehicle(
        &self,
        actor: &Actor,
        id: &QueueEntryId,
        target: VehicleQueueStatus,
    ) -> LogisticsResult<VehicleQueueEntry>;
    fn delete_vehicle_entry(&self, actor: &Actor, id: &QueueEntryId) -> LogisticsResult<()>;
    fn vehicle_entry(&self, id: &QueueEntryId) -> LogisticsResult<VehicleQueueEntry>;
    fn list_vehicle_entries(&self, query: &QueueQuery<VehicleQueueStatus>)
        -> Vec<VehicleQueueEntry>;

    fn enqueue_truck(
        &self,
        actor: &Actor,
        request: EnqueueRequest,
    ) -> LogisticsResult<TruckQueueEntry>;
    fn next_truck(&self, branch: &BranchId) -> LogisticsResult<TruckQueueEntry>;
    fn release_truck(
        &self,
        actor: &Actor,
        id: &QueueEntryId,
        target: TruckQueueStatus,
    ) -> LogisticsResult<TruckQueueEntry>;
    fn delete_truck_entry(&self, actor: &Actor, id: &QueueEntryId) -> LogisticsResult<()>;
    fn truck_entry(&self, id: &QueueEntryId) -> LogisticsResult<TruckQueueEntry>;
    fn list_truck_entries(&self, query: &QueueQuery<TruckQueueStatus>) -> Vec<TruckQueueEntry>;
}

/// Manifest builder (loading).
pub trait ManifestApi {
    fn create_manifest(&self, actor: &Actor, request: NewManifest) -> LogisticsResult<Manifest>;
    fn advance_manifest(
        &self,
        actor: &Actor,
        id: &ManifestId,
        request: ManifestAdvance,
    ) -> LogisticsResult<Manifest>;
    fn amend_manifest(
        &self,
        actor: &Actor,
        id: &ManifestId,
        amendment: ManifestAmendment,
    ) -> LogisticsResult<Manifest>;
    fn delete_manifest(&self, actor: &Actor, id: &ManifestId) -> LogisticsResult<()>;
    fn manifest(&self, id: &ManifestId) -> LogisticsResult<Manifest>;
    fn list_manifests(&self, query: &ManifestQuery) -> Vec<Manifest>;
    fn print_manifest(&self, actor: &Actor, id: &ManifestId) -> LogisticsResult<DocumentRef>;
}

/// Delivery dispatcher (lansir).
pub trait DeliveryApi {
    fn create_delivery(&self, actor: &Actor, request: NewDelivery) -> LogisticsResult<Delivery>;
    fn update_delivery_status(
        &self,
        actor: &Actor,
        id: &DeliveryId,
        update: DeliveryUpdate,
    ) -> LogisticsResult<Delivery>;
    fn delivery(&self, id: &DeliveryId) -> LogisticsResult<Delivery>;
    fn list_deliveries(&self, query: &DeliveryQuery) -> Vec<Delivery>;
}

/// Return handler.
pub trait ReturnApi {
    fn open_return(&self, actor: &Actor, request: NewReturn) -> LogisticsResult<ReturnRecord>;
    fn close_return(
        &self,
        actor: &Actor,
        id: &ReturnId,
        request: CloseReturn,
    ) -> LogisticsResult<ReturnRecord>;
    fn return_record(&self, id: &ReturnId) -> LogisticsResult<ReturnRecord>;
    fn list_returns(&self, query: &ReturnQuery) -> Vec<ReturnRecord>;
}

/// Collection and payment ledger.
pub trait CollectionApi {
    fn create_collection(
        &self,
        actor: &Actor,
        request: NewCollection,
    ) -> LogisticsResult<CollectionView>;
    fn add_payment(
        &self,
        actor: &Actor,
        id: &CollectionId,
        payment: NewPayment,
    ) -> LogisticsResult<Payment>;
    /// Unconditional overwrite, independent of the remaining balance.
    fn set_collection_status(
        &self,
        actor: &Actor,
        id: &CollectionId,
        status: CollectionStatus,
    ) -> LogisticsResult<CollectionView>;
    fn delete_collection(&self, actor: &Actor, id: &CollectionId) -> LogisticsResult<()>;
    fn collection(&self, id: &CollectionId) -> LogisticsResult<CollectionView>;
    fn list_collections(&self, query: &CollectionQuery) -> Vec<CollectionView>;
    fn generate_invoice(&self, actor: &Actor, id: &CollectionId) -> LogisticsResult<DocumentRef>;
}

/// Convenience bundle for callers that need the whole core.
pub trait LintasApi:
    IdentityApi + ShipmentApi + FleetApi + ManifestApi + DeliveryApi + ReturnApi + CollectionApi
{
}

impl<T> LintasApi for T where
    T: IdentityApi + ShipmentApi + FleetApi + ManifestApi + DeliveryApi + ReturnApi + CollectionApi
{
}
