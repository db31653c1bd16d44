//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::gate::DownloadGate;
use crate::services::{ReportGenerator, VinDecoder};
use crate::store::OrderStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The order store lives here - and only here -
/// so every handler mutates orders through the one injected instance.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: OrderStore,
    gate: DownloadGate,
    decoder: VinDecoder,
    reports: ReportGenerator,
}

impl AppState {
    /// Create a new application state around an opened order store.
    #[must_use]
    pub fn new(config: ServerConfig, store: OrderStore) -> Self {
        let gate = DownloadGate::new(store.clone());
        let decoder = VinDecoder::new(&config.vpic_base_url);
        let reports = ReportGenerator::new(config.spool_dir());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                gate,
                decoder,
                reports,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn store(&self) -> &OrderStore {
        &self.inner.store
    }

    /// Get a reference to the download gate.
    #[must_use]
    pub fn gate(&self) -> &DownloadGate {
        &self.inner.gate
    }

    /// Get a reference to the VIN decoder client.
    #[must_use]
    pub fn decoder(&self) -> &VinDecoder {
        &self.inner.decoder
    }

    /// Get a reference to the report generator.
    #[must_use]
    pub fn reports(&self) -> &ReportGenerator {
        &self.inner.reports
    }
}
