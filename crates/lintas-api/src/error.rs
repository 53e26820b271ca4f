//! Gateway errors and their HTTP mapping.
//!
//! Every failure leaves the gateway as
//! `{"error": {"kind": "...", "message": "..."}}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lintas_core::{ErrorKind, LogisticsError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] LogisticsError),

    #[error("missing x-actor-id header")]
    Unauthenticated,

    /// Body parsed but did not match the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("malformed request: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::InvalidTransition
                | ErrorKind::AlreadyClaimed
                | ErrorKind::EmptyQueue
                | ErrorKind::Immutable
                | ErrorKind::DuplicateVehicle
                | ErrorKind::NotHeld => StatusCode::CONFLICT,
                ErrorKind::Renderer => StatusCode::BAD_GATEWAY,
                ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(err) => err.kind().as_str(),
            Self::Unauthenticated => "Unauthenticated",
            Self::InvalidBody(_) => ErrorKind::ValidationError.as_str(),
            Self::BadRequest(_) => "BadRequest",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!(kind = self.kind(), %message, "Request failed");
        } else {
            warn!(kind = self.kind(), %message, "Request rejected");
        }
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Self::InvalidBody(err.body_text()),
            other => Self::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
