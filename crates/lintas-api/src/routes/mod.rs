//! REST resources, one module per component.

pub mod collections;
pub mod deliveries;
pub mod fleet;
pub mod identity;
pub mod manifests;
pub mod returns;
pub mod shipments;
