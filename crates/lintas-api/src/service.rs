//! Gateway service: router assembly and the HTTP server loop.

use std::future::Future;
use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use lintas_core::LintasApi;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GatewayConfig;
use crate::middleware::create_cors_layer;
use crate::routes;

/// The core as seen by handlers.
pub type SharedApi = Arc<dyn LintasApi + Send + Sync>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: SharedApi,
}

/// Build the full REST router with its middleware stack.
pub fn build_router(api: SharedApi, config: &GatewayConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&config.cors))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .map_response(IntoResponse::into_response)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    Router::new()
        .route("/health", get(health_check))
        .merge(routes::identity::routes())
        .merge(routes::shipments::routes())
        .merge(routes::fleet::routes())
        .merge(routes::manifests::routes())
        .merge(routes::deliveries::routes())
        .merge(routes::returns::routes())
        .merge(routes::collections::routes())
        .layer(middleware)
        .with_state(AppState { api })
}

/// HTTP front door for a running core.
pub struct LintasGateway {
    config: GatewayConfig,
    api: SharedApi,
}

impl LintasGateway {
    pub fn new(config: GatewayConfig, api: SharedApi) -> Self {
        Self { config, api }
    }

    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.api), &self.config)
    }

    /// Serve until `shutdown` resolves.
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.http_addr()).await?;
        info!(addr = %listener.local_addr()?, "Starting HTTP server");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("HTTP server stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lintas-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
