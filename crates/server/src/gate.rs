//! Download gate: converts a bearer token into exactly one delivery.
//!
//! The gate decides authorization for a single report download and
//! irreversibly revokes the presented token in the same step. Per order the
//! token sub-state is a two-state machine:
//!
//! ```text
//! NO_TOKEN --(mint_token)--> TOKEN_LIVE
//! TOKEN_LIVE --(authorized download | expired presentation | re-mint)--> NO_TOKEN
//! ```
//!
//! All revocation goes through the order store's atomic
//! [`claim_token`](crate::store::OrderStore::claim_token) primitive, so two
//! racing presentations of one token can never both win.

use chrono::{DateTime, Utc};
use thiserror::Error;

use benchlab_core::Order;

use crate::store::{ClaimError, OrderStore, StoreError};

/// Why an authorization was denied.
///
/// None of these are retried internally; the only way back in is for the
/// order owner to request a fresh token through the paid-order flow.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    /// No token was presented.
    #[error("no download token presented")]
    MissingToken,

    /// No live token matches: it never existed, was already used, or was
    /// replaced. Deliberately a single reason so callers cannot probe which.
    #[error("download token is invalid or already used")]
    InvalidToken,

    /// The token existed but its expiry had passed. It is now cleared;
    /// the same value will report [`AuthorizeError::InvalidToken`] next time.
    #[error("download token expired")]
    TokenExpired,

    /// The store could not persist the revocation; nothing was consumed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authorization gate in front of report delivery.
///
/// Holds a handle to the order store; reads and conditionally mutates
/// (token clearing) exclusively through the store's interface.
#[derive(Clone)]
pub struct DownloadGate {
    store: OrderStore,
}

impl DownloadGate {
    /// Create a gate over the given store.
    #[must_use]
    pub const fn new(store: OrderStore) -> Self {
        Self { store }
    }

    /// Authorize exactly one download for the presented token.
    ///
    /// On success the token has already been cleared - authorization and
    /// revocation are one atomic step - and the returned order reflects
    /// that. The caller then produces and streams the report.
    ///
    /// # Errors
    ///
    /// - [`AuthorizeError::MissingToken`] - `token` absent or empty.
    /// - [`AuthorizeError::InvalidToken`] - no live token matches.
    /// - [`AuthorizeError::TokenExpired`] - `now` is past the expiry; the
    ///   token is cleared as a side effect.
    /// - [`AuthorizeError::Store`] - persistence failed; the token stays
    ///   live.
    pub async fn authorize(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Order, AuthorizeError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(AuthorizeError::MissingToken),
        };

        match self.store.claim_token(token, now).await {
            Ok(order) => Ok(order),
            Err(ClaimError::NotFound) => Err(AuthorizeError::InvalidToken),
            Err(ClaimError::Expired) => Err(AuthorizeError::TokenExpired),
            Err(ClaimError::Store(e)) => Err(AuthorizeError::Store(e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use benchlab_core::{OrderId, Vin};

    use super::*;

    async fn paid_order_with_token(
        dir: &tempfile::TempDir,
    ) -> (OrderStore, DownloadGate, OrderId, String) {
        let store = OrderStore::open(dir.path().join("orders.json"))
            .await
            .unwrap();
        let order = store
            .create(Vin::parse("1HGCM82633A004352").unwrap())
            .await
            .unwrap();
        store.mark_paid(order.id, None).await.unwrap();
        let token = store
            .mint_token(order.id, TimeDelta::hours(1))
            .await
            .unwrap();
        let gate = DownloadGate::new(store.clone());
        (store, gate, order.id, token.expose().to_string())
    }

    #[tokio::test]
    async fn test_missing_token() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, gate, _id, _token) = paid_order_with_token(&dir).await;

        let result = gate.authorize(None, Utc::now()).await;
        assert!(matches!(result, Err(AuthorizeError::MissingToken)));

        let result = gate.authorize(Some("  "), Utc::now()).await;
        assert!(matches!(result, Err(AuthorizeError::MissingToken)));
    }

    #[tokio::test]
    async fn test_authorize_consumes_token() {
        let dir = tempfile::tempdir().unwrap();
        let (store, gate, id, token) = paid_order_with_token(&dir).await;

        let order = gate.authorize(Some(&token), Utc::now()).await.unwrap();
        assert_eq!(order.id, id);
        assert!(order.token.is_none());

        // The stored record agrees
        let stored = store.get(id).await.unwrap();
        assert!(stored.token.is_none());

        // Re-presenting the same token is denied as invalid, not expired
        let result = gate.authorize(Some(&token), Utc::now()).await;
        assert!(matches!(result, Err(AuthorizeError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_unknown_token_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, gate, _id, _token) = paid_order_with_token(&dir).await;

        let result = gate.authorize(Some("never-minted"), Utc::now()).await;
        assert!(matches!(result, Err(AuthorizeError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_expired_token_single_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let (store, gate, id, token) = paid_order_with_token(&dir).await;

        let past_expiry = Utc::now() + TimeDelta::hours(2);
        let result = gate.authorize(Some(&token), past_expiry).await;
        assert!(matches!(result, Err(AuthorizeError::TokenExpired)));

        // The expired presentation already cleared the token
        let stored = store.get(id).await.unwrap();
        assert!(stored.token.is_none());

        let result = gate.authorize(Some(&token), Utc::now()).await;
        assert!(matches!(result, Err(AuthorizeError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_concurrent_presentations_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, gate, _id, token) = paid_order_with_token(&dir).await;

        let now = Utc::now();
        let (a, b) = tokio::join!(
            gate.authorize(Some(&token), now),
            gate.authorize(Some(&token), now)
        );

        let successes = usize::from(a.is_ok()) + usize::from(b.is_ok());
        assert_eq!(successes, 1, "exactly one presentation may win");

        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(AuthorizeError::InvalidToken)));
    }
}
