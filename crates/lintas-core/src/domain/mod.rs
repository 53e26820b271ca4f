//! Domain layer: entities, rules and errors. No I/O.

pub mod collection;
pub mod delivery;
pub mod documents;
pub mod errors;
pub mod fleet;
pub mod manifest;
pub mod permissions;
pub mod returns;
pub mod shipment;

pub use collection::{Collection, CollectionQuery, CollectionView, NewCollection, NewPayment, Payment};
pub use delivery::{Delivery, DeliveryQuery, DeliveryUpdate, NewDelivery};
pub use documents::{DocumentRef, DocumentRequest};
pub use errors::{ErrorKind, LogisticsError, LogisticsResult};
pub use fleet::{
    Crew, CrewSelection, EnqueueRequest, Holder, NewVehicle, QueueEntry, QueueQuery, QueueState, TruckQueueEntry,
    Vehicle, VehiclePatch, VehicleQueueEntry,
};
pub use manifest::{Manifest, ManifestAdvance, ManifestAmendment, ManifestQuery, NewManifest};
pub use permissions::{Edge, PermissionTable};
pub use returns::{CloseReturn, NewReturn, ReturnQuery, ReturnRecord};
pub use shipment::{
    Cargo, Claim, Shipment, ShipmentIntake, ShipmentPatch, ShipmentQuery, StatusRecord,
};
