//! Printable documents handed to the external renderer.

use serde::{Deserialize, Serialize};

use super::collection::CollectionView;
use super::manifest::Manifest;
use super::shipment::Shipment;

/// What to render, with everything the renderer needs inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "document", rename_all = "snake_case")]
pub enum DocumentRequest {
    /// STT receipt printout.
    Receipt { shipment: Shipment },
    /// Loading sheet listing every member STT.
    ManifestSheet {
        manifest: Manifest,
        shipments: Vec<Shipment>,
    },
    Invoice {
        collection: CollectionView,
        shipments: Vec<Shipment>,
    },
}

impl DocumentRequest {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Receipt { .. } => "receipt",
            Self::ManifestSheet { .. } => "manifest",
            Self::Invoice { .. } => "invoice",
        }
    }

    /// Id of the record being printed.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Receipt { shipment } => shipment.id.as_str(),
            Self::ManifestSheet { manifest, .. } => manifest.id.as_str(),
            Self::Invoice { collection, .. } => collection.collection.id.as_str(),
        }
    }
}

/// Opaque reference returned by the renderer (usually a URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub kind: String,
    pub reference: String,
    /// RFC 3339 generation time.
    pub generated_at: String,
}
