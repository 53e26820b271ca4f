//! Error types for the Lintas core.
//!
//! Every operation returns `LogisticsResult<T>`. Errors are reported
//! synchronously and never retried by the core; a failed operation leaves
//! the store untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogisticsError {
    /// Unknown identifier.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Target status is not reachable from the current one.
    #[error("invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// The actor's role lacks permission for the requested edge.
    #[error("role {role} may not move {entity} {from} -> {to}")]
    Forbidden {
        entity: &'static str,
        role: String,
        from: String,
        to: String,
    },

    /// The acting user is not in the identity directory.
    #[error("unknown user {0}")]
    UnknownUser(String),

    /// Missing or out-of-range input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// STT or queue entry held by another active aggregate.
    #[error("{entity} {id} is already claimed by {holder}")]
    AlreadyClaimed {
        entity: &'static str,
        id: String,
        holder: String,
    },

    /// No waiting vehicle or truck at the branch.
    #[error("no waiting {kind} entry at branch {branch}")]
    EmptyQueue { kind: String, branch: String },

    /// Attempted mutation of an aggregate in a final state.
    #[error("{entity} {id} is {status} and can no longer be changed")]
    Immutable {
        entity: &'static str,
        id: String,
        status: String,
    },

    /// Vehicle already has a live entry in this queue type.
    #[error("vehicle {vehicle} already queued as {entry}")]
    DuplicateVehicle { vehicle: String, entry: String },

    /// Release requested for an entry that is not held.
    #[error("queue entry {id} is not held (status {status})")]
    NotHeld { id: String, status: String },

    /// The external document renderer failed.
    #[error("document renderer failed: {0}")]
    Renderer(String),

    /// The persistence store failed.
    #[error("store error: {0}")]
    Store(String),
}

/// Result alias used across the core.
pub type LogisticsResult<T> = Result<T, LogisticsError>;

/// Stable, serializable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    InvalidTransition,
    Forbidden,
    ValidationError,
    AlreadyClaimed,
    EmptyQueue,
    Immutable,
    DuplicateVehicle,
    NotHeld,
    Renderer,
    Store,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::InvalidTransition => "InvalidTransition",
            Self::Forbidden => "Forbidden",
            Self::ValidationError => "ValidationError",
            Self::AlreadyClaimed => "AlreadyClaimed",
            Self::EmptyQueue => "EmptyQueue",
            Self::Immutable => "Immutable",
            Self::DuplicateVehicle => "DuplicateVehicle",
            Self::NotHeld => "NotHeld",
            Self::Renderer => "Renderer",
            Self::Store => "Store",
        }
    }
}

impl LogisticsError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Forbidden { .. } | Self::UnknownUser(_) => ErrorKind::Forbidden,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::AlreadyClaimed { .. } => ErrorKind::AlreadyClaimed,
            Self::EmptyQueue { .. } => ErrorKind::EmptyQueue,
            Self::Immutable { .. } => ErrorKind::Immutable,
            Self::DuplicateVehicle { .. } => ErrorKind::DuplicateVehicle,
            Self::NotHeld { .. } => ErrorKind::NotHeld,
            Self::Renderer(_) => ErrorKind::Renderer,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn forbidden(
        entity: &'static str,
        role: impl ToString,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        Self::Forbidden {
            entity,
            role: role.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn already_claimed(entity: &'static str, id: impl ToString, holder: impl ToString) -> Self {
        Self::AlreadyClaimed {
            entity,
            id: id.to_string(),
            holder: holder.to_string(),
        }
    }

    pub fn immutable(entity: &'static str, id: impl ToString, status: impl ToString) -> Self {
        Self::Immutable {
            entity,
            id: id.to_string(),
            status: status.to_string(),
        }
    }
}
