//! # Shared Types Crate
//!
//! Identifiers, actors and status vocabularies used by every Lintas crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: status names as they appear on the wire
//!   (`PENDING`, `MENUNGGU`, `BELUM_SELESAI`, ...) are defined once, here.
//! - **Opaque Identifiers**: every id is a string newtype; callers never
//!   parse meaning out of them.
//! - **Plain Units**: time is milliseconds since the Unix epoch and money is
//!   whole Rupiah.

pub mod entities;
pub mod errors;
pub mod status;

pub use entities::*;
pub use errors::*;
pub use status::*;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Whole currency units (Rupiah). Signed so balances can go negative.
pub type Rupiah = i64;
