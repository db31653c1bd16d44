//! The order record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DownloadToken, OrderId, OrderStatus, Vin};

/// A customer's request for a paid vehicle-history report.
///
/// Owned exclusively by the order store; everything else (the download gate
/// included) reads and mutates orders through the store's operations only.
///
/// # Token invariants
///
/// - `token` is `Some` iff `token_expires_at` is `Some`.
/// - A token is single-use: once consumed or expired it is cleared to `None`.
/// - At most one live token exists per order; minting overwrites any prior
///   token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier, immutable after creation.
    pub id: OrderId,
    /// The VIN this report is about.
    pub vin: Vin,
    /// Payment status, forward-only transitions.
    pub status: OrderStatus,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order transitioned to `paid`, if it has.
    pub paid_at: Option<DateTime<Utc>>,
    /// Live download token, if one exists.
    pub token: Option<DownloadToken>,
    /// Expiry of the live token; `Some` iff `token` is `Some`.
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Opaque reference from the payment confirmation source.
    pub provider_reference: Option<String>,
}

impl Order {
    /// Create a fresh pending order for the given VIN.
    #[must_use]
    pub fn new(vin: Vin, created_at: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::generate(),
            vin,
            status: OrderStatus::Pending,
            created_at,
            paid_at: None,
            token: None,
            token_expires_at: None,
            provider_reference: None,
        }
    }

    /// Whether a live (present and unexpired) token exists at `now`.
    #[must_use]
    pub fn has_live_token(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.token_expires_at) {
            (Some(_), Some(expires_at)) => now <= expires_at,
            _ => false,
        }
    }

    /// Clear the token sub-state back to `NO_TOKEN`.
    ///
    /// Idempotent: clearing an already-clear order is a no-op.
    pub fn clear_token(&mut self) {
        self.token = None;
        self.token_expires_at = None;
    }
}
