//! # Identifiers and Actors
//!
//! ## Clusters
//!
//! - **Records**: `ShipmentId`, `ManifestId`, `DeliveryId`, `ReturnId`, `CollectionId`
//! - **Fleet**: `VehicleId`, `QueueEntryId`
//! - **Parties**: `BranchId`, `UserId`, `CustomerId`
//! - **Identity**: `Role`, `Actor`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseVocabularyError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the id is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

macro_rules! generated_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Allocate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, uuid::Uuid::new_v4().simple()))
            }
        }
    };
}

string_id!(
    /// Shipment receipt (STT) identifier.
    ShipmentId
);
string_id!(
    /// Manifest (loading) identifier.
    ManifestId
);
string_id!(
    /// Local delivery (lansir) identifier.
    DeliveryId
);
string_id!(
    /// Return batch identifier.
    ReturnId
);
string_id!(
    /// Collection (billing aggregate) identifier.
    CollectionId
);
string_id!(
    /// Registered vehicle identifier.
    VehicleId
);
string_id!(
    /// Vehicle or truck queue entry identifier.
    QueueEntryId
);
string_id!(
    /// Branch (cabang) identifier.
    BranchId
);
string_id!(
    /// Staff member identifier: admins, checkers, drivers.
    UserId
);
string_id!(
    /// Customer identifier (sender or recipient).
    CustomerId
);

generated_id!(ShipmentId, "stt");
generated_id!(ManifestId, "mnf");
generated_id!(DeliveryId, "dlv");
generated_id!(ReturnId, "ret");
generated_id!(CollectionId, "col");
generated_id!(VehicleId, "veh");
generated_id!(QueueEntryId, "que");

// =============================================================================
// IDENTITY
// =============================================================================

/// Staff role as assigned by the identity provider.
///
/// Unknown role strings are kept verbatim in `Other` and carry no
/// transition rights.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Manager,
    /// Branch head.
    KepalaCabang,
    StaffAdmin,
    /// Warehouse head.
    KepalaGudang,
    Checker,
    /// Driver.
    Supir,
    Other(String),
}

impl Role {
    /// Roles with unrestricted transition rights.
    #[must_use]
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager | Self::KepalaCabang)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::KepalaCabang => "kepala_cabang",
            Self::StaffAdmin => "staff_admin",
            Self::KepalaGudang => "kepala_gudang",
            Self::Checker => "checker",
            Self::Supir => "supir",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "kepala_cabang" => Self::KepalaCabang,
            "staff_admin" => Self::StaffAdmin,
            "kepala_gudang" => Self::KepalaGudang,
            "checker" => Self::Checker,
            "supir" => Self::Supir,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl FromStr for Role {
    type Err = ParseVocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseVocabularyError::new("role", s));
        }
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated staff member performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
    /// Home branch, if the user is bound to one.
    #[serde(default)]
    pub branch: Option<BranchId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            branch: None,
            name: None,
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<BranchId>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}
