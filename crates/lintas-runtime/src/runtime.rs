//! # Lintas Runtime
//!
//! Wires the store, identity directory, event bus and gateway together.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Restore the store snapshot (if one exists)
//! 3. Load the staff directory
//! 4. Connect the core to the event bus
//! 5. Serve HTTP until shutdown, then write the snapshot

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lintas_api::LintasGateway;
use lintas_core::{BusEventSink, InMemoryStore, LintasService, StaticIdentityProvider, UrlDocumentRenderer};
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;

/// The core as wired by the runtime.
pub type RuntimeService = LintasService<InMemoryStore>;

pub struct LintasRuntime {
    config: RuntimeConfig,
    service: Arc<RuntimeService>,
    bus: Arc<InMemoryEventBus>,
}

impl LintasRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        info!("Creating Lintas runtime");

        let store = match config.storage.snapshot_path.as_deref() {
            Some(path) if path.exists() => InMemoryStore::restore_from(path)
                .with_context(|| format!("restoring snapshot {}", path.display()))?,
            Some(path) => {
                info!(path = %path.display(), "No snapshot found, starting empty");
                InMemoryStore::new()
            }
            None => InMemoryStore::new(),
        };

        let identity = match config.identity.users_file.as_deref() {
            Some(path) => StaticIdentityProvider::load(path)
                .with_context(|| format!("loading users file {}", path.display()))?,
            None => {
                warn!("No users file configured; every request will be rejected");
                StaticIdentityProvider::default()
            }
        };
        info!(users = identity.len(), "Staff directory loaded");

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.storage.event_capacity));
        let service = LintasService::new(
            Arc::new(store),
            Arc::new(identity),
            Arc::new(UrlDocumentRenderer::new(config.core.document_base_url.clone())),
            config.core.clone(),
        )
        .with_event_sink(Arc::new(BusEventSink::new(Arc::clone(&bus))));

        Ok(Self {
            config,
            service: Arc::new(service),
            bus,
        })
    }

    pub fn service(&self) -> &Arc<RuntimeService> {
        &self.service
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    /// Write the committed state to the configured snapshot path.
    pub fn save_snapshot(&self) -> Result<()> {
        let Some(path) = self.config.storage.snapshot_path.as_deref() else {
            return Ok(());
        };
        ensure_parent(path)?;
        self.service
            .store()
            .snapshot_to(path)
            .with_context(|| format!("writing snapshot {}", path.display()))
    }

    /// Log every committed event at debug level.
    fn spawn_event_audit(&self) -> JoinHandle<()> {
        let mut subscription = self.bus.subscribe(EventFilter::all());
        tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                debug!(
                    topic = ?event.topic(),
                    source = event.source_component(),
                    event = ?event,
                    "Event committed"
                );
            }
        })
    }

    /// Serve until `shutdown` resolves, then persist the store.
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let audit = self.spawn_event_audit();
        let gateway = LintasGateway::new(self.config.gateway.clone(), self.service.clone());

        let served = gateway.run(shutdown).await.context("HTTP server failed");
        audit.abort();

        self.save_snapshot()?;
        let stats = self.bus.stats();
        info!(
            events = stats.published,
            unheard = stats.unheard,
            by_topic = ?stats.by_topic,
            "Lintas runtime stopped"
        );
        served
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display())),
        _ => Ok(()),
    }
}
