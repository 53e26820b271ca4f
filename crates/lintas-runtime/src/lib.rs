//! # Lintas Runtime
//!
//! Process wiring for the Lintas back office: configuration from the
//! environment, tracing setup, snapshot persistence and the HTTP gateway.

pub mod config;
pub mod runtime;
pub mod telemetry;

pub use config::{ConfigError, IdentityConfig, LogFormat, LoggingConfig, RuntimeConfig, StorageConfig};
pub use runtime::{LintasRuntime, RuntimeService};
pub use telemetry::init_tracing;
