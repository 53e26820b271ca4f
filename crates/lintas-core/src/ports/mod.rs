//! Ports: the core's API (inbound) and its dependencies (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::{
    CollectionApi, DeliveryApi, FleetApi, IdentityApi, LintasApi, ManifestApi, ReturnApi,
    ShipmentApi,
};
pub use outbound::{
    Clock, DocumentRenderer, EventSink, IdentityProvider, LogisticsStore, ManualClock, Repository,
    SystemClock,
};
