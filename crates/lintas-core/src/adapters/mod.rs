//! Adapters implementing the outbound ports.

pub mod events;
pub mod identity;
pub mod memory;
pub mod renderer;

pub use events::{BusEventSink, NoOpEventSink, RecordingEventSink};
pub use identity::StaticIdentityProvider;
pub use memory::{InMemoryStore, StoreTables};
pub use renderer::UrlDocumentRenderer;
