//! Integration tests for BenchLab.
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Order store transitions and persistence
//! - `download_gate` - Token consumption, expiry, and race behavior
//!
//! Tests drive the order store and download gate in-process against a
//! store file in a temp directory; no HTTP server or external service is
//! involved.

use benchlab_server::gate::DownloadGate;
use benchlab_server::store::OrderStore;

/// An order store plus gate over a fresh temp-backed store file.
///
/// The temp directory handle must be kept alive for the duration of the
/// test; dropping it deletes the backing file.
pub struct TestContext {
    pub store: OrderStore,
    pub gate: DownloadGate,
    _dir: tempfile::TempDir,
}

impl TestContext {
    /// Open a fresh store in a new temp directory.
    ///
    /// # Panics
    ///
    /// Panics if the temp directory or store cannot be created.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = OrderStore::open(dir.path().join("orders.json"))
            .await
            .expect("open order store");
        let gate = DownloadGate::new(store.clone());
        Self {
            store,
            gate,
            _dir: dir,
        }
    }
}
