//! # Status Vocabularies
//!
//! Every lifecycle enum in the system, with the exact wire names used by
//! the REST surface and the event bus.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseVocabularyError;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// All values in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseVocabularyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ParseVocabularyError::new($kind, s))
            }
        }
    };
}

vocabulary!(
    /// Lifecycle of a shipment receipt (STT).
    ///
    /// ```text
    /// PENDING → MUAT → TRANSIT → LANSIR → TERKIRIM
    ///                     │         │
    ///                     └──→ RETURN ←┘
    ///                            │
    ///                            └──(return closed)──→ PENDING
    /// ```
    ShipmentStatus, "shipment status" {
        Pending => "PENDING",
        /// Being loaded.
        Muat => "MUAT",
        Transit => "TRANSIT",
        /// Out for local delivery.
        Lansir => "LANSIR",
        /// Delivered.
        Terkirim => "TERKIRIM",
        Return => "RETURN",
    }
);

vocabulary!(
    /// Local delivery vehicle queue entry status.
    VehicleQueueStatus, "vehicle queue status" {
        /// Waiting for dispatch.
        Menunggu => "MENUNGGU",
        /// Held by an active delivery.
        Lansir => "LANSIR",
        /// Retired from the queue.
        Kembali => "KEMBALI",
    }
);

vocabulary!(
    /// Inter-branch truck queue entry status.
    TruckQueueStatus, "truck queue status" {
        Menunggu => "MENUNGGU",
        /// Held by a manifest that is loading.
        Muat => "MUAT",
        /// Held by a manifest that has departed.
        Berangkat => "BERANGKAT",
    }
);

vocabulary!(
    /// Manifest (loading) status.
    ManifestStatus, "manifest status" {
        Muat => "MUAT",
        /// Departed.
        Berangkat => "BERANGKAT",
        /// Arrived.
        Sampai => "SAMPAI",
    }
);

vocabulary!(
    /// Local delivery status.
    DeliveryStatus, "delivery status" {
        Lansir => "LANSIR",
        Terkirim => "TERKIRIM",
        /// Delivery attempt failed.
        BelumSelesai => "BELUM_SELESAI",
    }
);

vocabulary!(
    /// Return batch status.
    ReturnStatus, "return status" {
        /// In progress.
        Proses => "PROSES",
        /// Arrived back at origin.
        Sampai => "SAMPAI",
    }
);

vocabulary!(
    /// Stored settlement status of a collection.
    CollectionStatus, "collection status" {
        /// Paid in full.
        Lunas => "LUNAS",
        BelumLunas => "BELUM_LUNAS",
    }
);

vocabulary!(
    /// Who pays for a shipment.
    PaymentType, "payment type" {
        Cash => "CASH",
        /// Cash on delivery.
        Cod => "COD",
        /// Cash after delivery.
        Cad => "CAD",
    }
);

vocabulary!(
    /// Which side of the shipment a collection bills.
    CustomerRole, "customer role" {
        Pengirim => "PENGIRIM",
        Penerima => "PENERIMA",
    }
);

vocabulary!(
    /// The two independent queue types kept per branch.
    QueueKind, "queue kind" {
        Vehicle => "VEHICLE",
        Truck => "TRUCK",
    }
);

impl DeliveryStatus {
    /// TERKIRIM and BELUM_SELESAI are final.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Lansir)
    }
}
