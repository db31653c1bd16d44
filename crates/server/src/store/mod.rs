//! Persisted order storage.
//!
//! # Backing store
//!
//! Orders are a single JSON document on disk (`orders.json` under the data
//! directory): a map from order id to order record. Crash tolerance beyond
//! write-temp-then-rename is not a requirement here; what matters is that no
//! mutating operation reports success before the new order set has been
//! written out, and that a failed write rolls the in-memory map back.
//!
//! # Ownership
//!
//! [`OrderStore`] is the sole owner and sole mutator of order records. It is
//! an explicitly constructed instance injected through `AppState` - never
//! ambient process-wide state - and the download gate goes through its
//! operations only.

mod orders;

pub use orders::{ClaimError, OrderStore};

use benchlab_core::OrderStatus;
use thiserror::Error;

/// Errors from order store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order with the given id (or matching the given token).
    #[error("order not found")]
    NotFound,

    /// The operation is not valid for the order's current status.
    #[error("operation not valid for order in status '{current}'")]
    InvalidState {
        /// The status the order actually had.
        current: OrderStatus,
    },

    /// The backing file could not be read or written.
    ///
    /// The triggering operation did not take effect.
    #[error("order store I/O failed: {0}")]
    Storage(#[from] std::io::Error),

    /// The backing file exists but does not parse as an order set.
    #[error("order store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
