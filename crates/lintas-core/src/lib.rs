//! # Lintas Core
//!
//! Shipment lifecycle engine for an inter-branch freight forwarder.
//!
//! A shipment (STT) moves PENDING → MUAT → TRANSIT → LANSIR → TERKIRIM,
//! with a RETURN branch for cargo that could not be delivered. Bulk
//! carriers move STTs in batches:
//!
//! - **Manifests** load STTs onto a queued truck and carry them between
//!   branches.
//! - **Deliveries** put arrived STTs on a queued local vehicle.
//! - **Returns** bring failed STTs back and re-open them as PENDING.
//! - **Collections** bill delivered STTs to a customer in installments.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - **Domain Layer:** entities and rules, no I/O
//! - **Ports Layer:** inbound APIs and outbound store/identity/renderer traits
//! - **Service Layer:** [`LintasService`], one store transaction per call
//! - **Adapters Layer:** in-memory store, static identity provider, URL
//!   renderer, event sinks
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lintas_core::{
//!     InMemoryStore, LintasConfig, LintasService, ShipmentApi, StaticIdentityProvider,
//!     UrlDocumentRenderer,
//! };
//! use shared_types::{Actor, Role};
//!
//! let admin = Actor::new("u-1", Role::Admin);
//! let service = LintasService::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(StaticIdentityProvider::new([admin.clone()])),
//!     Arc::new(UrlDocumentRenderer::new("http://localhost:8090/documents")),
//!     LintasConfig::default(),
//! );
//! assert!(service.list_shipments(&Default::default()).is_empty());
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    BusEventSink, InMemoryStore, NoOpEventSink, RecordingEventSink, StaticIdentityProvider,
    StoreTables, UrlDocumentRenderer,
};
pub use config::LintasConfig;
pub use domain::{ErrorKind, LogisticsError, LogisticsResult};
pub use ports::{
    CollectionApi, DeliveryApi, FleetApi, IdentityApi, LintasApi, ManifestApi, ReturnApi,
    ShipmentApi,
};
pub use service::LintasService;
