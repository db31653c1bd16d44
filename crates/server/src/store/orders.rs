//! The order store implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use rand::RngCore;
use tokio::sync::{Mutex, MutexGuard};

use benchlab_core::{DownloadToken, Order, OrderId, OrderStatus, Vin};

use super::StoreError;

/// Number of random bytes behind a download token (43 chars base64url).
const TOKEN_BYTES: usize = 32;

/// Result of an atomic token claim.
///
/// Distinct from [`StoreError`] because the download gate needs to tell
/// "no such token" apart from "token existed but had expired" - and because
/// the expired branch has already cleared the token as a side effect.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    /// No order holds this token: it never existed, was already consumed,
    /// or was overwritten by a newer mint.
    #[error("no order holds this token")]
    NotFound,

    /// The token existed but its expiry had passed. It has been cleared;
    /// re-presenting it will report [`ClaimError::NotFound`].
    #[error("token expired")]
    Expired,

    /// Persisting the cleared token failed; the claim did not take effect.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Store of order records, keyed by order id.
///
/// Cheaply cloneable via `Arc`; all clones share one map and one lock. Every
/// operation acquires the store mutex, so check-then-mutate sequences (most
/// importantly [`claim_token`](Self::claim_token)) execute as a single
/// critical section.
#[derive(Clone)]
pub struct OrderStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl OrderStore {
    /// Open the store backed by the given file, loading any persisted orders.
    ///
    /// Creates parent directories as needed. A missing file is an empty
    /// store, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the file cannot be read, or
    /// `StoreError::Corrupt` if it does not parse.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let orders = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str::<HashMap<OrderId, Order>>(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), count = orders.len(), "order store opened");

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                orders: Mutex::new(orders),
            }),
        })
    }

    /// Create a new pending order for the given VIN.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Storage` if the order set cannot be persisted;
    /// the order is not created in that case.
    pub async fn create(&self, vin: Vin) -> Result<Order, StoreError> {
        let mut orders = self.inner.orders.lock().await;

        let order = Order::new(vin, Utc::now());
        orders.insert(order.id, order.clone());

        if let Err(e) = self.persist(&orders).await {
            orders.remove(&order.id);
            return Err(e);
        }

        tracing::info!(order_id = %order.id, vin = %order.vin, "order created");
        Ok(order)
    }

    /// Look up an order by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no such order exists.
    pub async fn get(&self, id: OrderId) -> Result<Order, StoreError> {
        let orders = self.inner.orders.lock().await;
        orders.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    /// Transition a pending order to `paid`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id,
    /// `StoreError::InvalidState` if the order is not `pending`, and
    /// `StoreError::Storage` if persistence fails (the transition is rolled
    /// back).
    pub async fn mark_paid(
        &self,
        id: OrderId,
        provider_reference: Option<String>,
    ) -> Result<Order, StoreError> {
        let order = self
            .transition(id, OrderStatus::Paid, provider_reference)
            .await?;
        tracing::info!(order_id = %id, "order marked paid");
        Ok(order)
    }

    /// Transition a pending order to `failed`.
    ///
    /// # Errors
    ///
    /// Same error conditions as [`mark_paid`](Self::mark_paid).
    pub async fn mark_failed(&self, id: OrderId) -> Result<Order, StoreError> {
        let order = self.transition(id, OrderStatus::Failed, None).await?;
        tracing::info!(order_id = %id, "order marked failed");
        Ok(order)
    }

    /// Mint a fresh download token for a paid order.
    ///
    /// Overwrites any previous token; at most one live token exists per
    /// order. The caller is responsible for delivering the returned value
    /// out-of-band (e.g., embedded in a download URL).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id,
    /// `StoreError::InvalidState` if the order is not `paid`, and
    /// `StoreError::Storage` if persistence fails (no token is minted).
    pub async fn mint_token(
        &self,
        id: OrderId,
        ttl: TimeDelta,
    ) -> Result<DownloadToken, StoreError> {
        let mut orders = self.inner.orders.lock().await;

        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        if order.status != OrderStatus::Paid {
            return Err(StoreError::InvalidState {
                current: order.status,
            });
        }

        let previous = order.clone();
        let token = generate_token();
        order.token = Some(token.clone());
        order.token_expires_at = Some(Utc::now() + ttl);

        if let Err(e) = self.persist(&orders).await {
            orders.insert(id, previous);
            return Err(e);
        }

        tracing::info!(order_id = %id, "download token minted");
        Ok(token)
    }

    /// Look up the order holding the given token value.
    ///
    /// Orders without a token never match, so a consumed or overwritten
    /// token is indistinguishable from one that never existed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no order holds this token.
    pub async fn find_by_token(&self, token: &str) -> Result<Order, StoreError> {
        let orders = self.inner.orders.lock().await;
        orders
            .values()
            .find(|order| {
                order
                    .token
                    .as_ref()
                    .is_some_and(|t| t.expose() == token)
            })
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Clear an order's token and expiry.
    ///
    /// Idempotent: clearing an already-clear order persists the unchanged
    /// set and succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for an unknown id and
    /// `StoreError::Storage` if persistence fails (the token is restored).
    pub async fn consume_token(&self, id: OrderId) -> Result<(), StoreError> {
        let mut orders = self.inner.orders.lock().await;

        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        let previous = order.clone();
        order.clear_token();

        if let Err(e) = self.persist(&orders).await {
            orders.insert(id, previous);
            return Err(e);
        }

        Ok(())
    }

    /// Atomically look up, expiry-check, and clear a token.
    ///
    /// This is the compare-and-clear primitive behind the download gate:
    /// lookup, the expiry check, and the clear all happen under one lock
    /// acquisition, so two concurrent presentations of the same token get
    /// exactly one success - the loser finds the token already gone.
    ///
    /// On the expired path the token is cleared too: an expired token gets
    /// one attempt, after which it reports [`ClaimError::NotFound`] like any
    /// other dead token.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::NotFound`, `ClaimError::Expired`, or
    /// `ClaimError::Store` when persisting the clear fails (in which case
    /// the token remains live and claimable).
    pub async fn claim_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Order, ClaimError> {
        let mut orders = self.inner.orders.lock().await;

        let id = orders
            .values()
            .find(|order| {
                order
                    .token
                    .as_ref()
                    .is_some_and(|t| t.expose() == token)
            })
            .map(|order| order.id)
            .ok_or(ClaimError::NotFound)?;

        let order = orders.get_mut(&id).ok_or(ClaimError::NotFound)?;
        let previous = order.clone();
        let expired = !order.has_live_token(now);

        order.clear_token();
        let cleared = order.clone();

        if let Err(e) = self.persist(&orders).await {
            orders.insert(id, previous);
            return Err(ClaimError::Store(e));
        }

        if expired {
            tracing::info!(order_id = %id, "expired token presented and cleared");
            return Err(ClaimError::Expired);
        }

        tracing::info!(order_id = %id, "download token consumed");
        Ok(cleared)
    }

    /// Write the full order set to disk, atomically (temp file + rename).
    async fn persist(
        &self,
        orders: &MutexGuard<'_, HashMap<OrderId, Order>>,
    ) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(&**orders)?;

        let tmp_path = self.inner.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &contents).await?;
        tokio::fs::rename(&tmp_path, &self.inner.path).await?;

        Ok(())
    }

    /// Shared status-transition guard for `mark_paid` / `mark_failed`.
    async fn transition(
        &self,
        id: OrderId,
        next: OrderStatus,
        provider_reference: Option<String>,
    ) -> Result<Order, StoreError> {
        let mut orders = self.inner.orders.lock().await;

        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        if !order.status.can_transition_to(next) {
            return Err(StoreError::InvalidState {
                current: order.status,
            });
        }

        let previous = order.clone();
        order.status = next;
        if next == OrderStatus::Paid {
            order.paid_at = Some(Utc::now());
        }
        if provider_reference.is_some() {
            order.provider_reference = provider_reference;
        }
        let updated = order.clone();

        if let Err(e) = self.persist(&orders).await {
            orders.insert(id, previous);
            return Err(e);
        }

        Ok(updated)
    }
}

/// Generate a cryptographically random, URL-safe token value.
fn generate_token() -> DownloadToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    DownloadToken::new(URL_SAFE_NO_PAD.encode(bytes))
}
