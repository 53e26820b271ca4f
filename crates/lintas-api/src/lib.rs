//! # Lintas API Gateway
//!
//! REST/JSON front door for the Lintas core.
//!
//! ```text
//!   HTTP ──► Trace → CORS → Timeout → BodyLimit ──► routes ──► LintasApi
//! ```
//!
//! Every resource route requires the `x-actor-id` header; the user is
//! resolved through the core's identity port before the handler runs.
//! Core errors map onto HTTP statuses in [`error::ApiError`].
//!
//! # Usage
//!
//! ```ignore
//! use lintas_api::{GatewayConfig, LintasGateway};
//!
//! let gateway = LintasGateway::new(GatewayConfig::default(), api);
//! gateway.run(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod service;

pub use config::{ConfigError, CorsConfig, GatewayConfig};
pub use error::{ApiError, ApiResult};
pub use extract::ACTOR_HEADER;
pub use service::{build_router, AppState, LintasGateway, SharedApi};
