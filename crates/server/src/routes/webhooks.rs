//! Payment confirmation webhook.
//!
//! The payment provider (or an operator via the admin route) confirms an
//! order outcome here. A positive outcome marks the order paid and mints its
//! download token in one flow; the response carries the constructed download
//! URL so the caller can deliver it to the paying party out-of-band. A
//! negative outcome marks the order failed.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use benchlab_core::{DownloadToken, OrderId};

use crate::error::{AppError, Result};
use crate::routes::orders::OrderResponse;
use crate::state::AppState;

/// Outcome reported by the payment confirmation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

/// Request body for `POST /webhooks/payment`.
#[derive(Debug, Deserialize)]
pub struct PaymentConfirmation {
    pub order_id: OrderId,
    pub outcome: PaymentOutcome,
    pub provider_reference: Option<String>,
}

/// Response body: the updated order plus, on a paid outcome, the single-use
/// download URL to hand to the customer.
#[derive(Debug, Serialize)]
pub struct PaymentConfirmationResponse {
    pub order: OrderResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Handle a payment confirmation.
#[instrument(skip(state, body), fields(order_id = %body.order_id))]
pub async fn payment(
    State(state): State<AppState>,
    Json(body): Json<PaymentConfirmation>,
) -> Result<Json<PaymentConfirmationResponse>> {
    match body.outcome {
        PaymentOutcome::Paid => {
            let response = confirm_paid(&state, body.order_id, body.provider_reference).await?;
            Ok(Json(response))
        }
        PaymentOutcome::Failed => {
            let order = state.store().mark_failed(body.order_id).await?;
            Ok(Json(PaymentConfirmationResponse {
                order: order.into(),
                download_url: None,
                token_expires_at: None,
            }))
        }
    }
}

/// Mark an order paid, mint its download token, and build the download URL.
///
/// Shared between the provider webhook and the admin manual override.
pub async fn confirm_paid(
    state: &AppState,
    order_id: OrderId,
    provider_reference: Option<String>,
) -> Result<PaymentConfirmationResponse> {
    state.store().mark_paid(order_id, provider_reference).await?;
    issue_download_token(state, order_id).await
}

/// Mint a fresh download token for a paid order and build its download URL.
///
/// This is also the recovery path for an order whose token expired or was
/// lost: the admin override calls it directly when the order is already
/// paid, replacing whatever token state the order had.
pub async fn issue_download_token(
    state: &AppState,
    order_id: OrderId,
) -> Result<PaymentConfirmationResponse> {
    let ttl = state.config().token_ttl;
    let token = state.store().mint_token(order_id, ttl).await?;
    let order = state.store().get(order_id).await?;
    let token_expires_at = order.token_expires_at;

    let download_url = build_download_url(&state.config().base_url, &token)?;

    Ok(PaymentConfirmationResponse {
        order: order.into(),
        download_url: Some(download_url),
        token_expires_at,
    })
}

/// Build the single-use download URL delivered to the paying party.
fn build_download_url(base_url: &str, token: &DownloadToken) -> Result<String> {
    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::Internal(format!("invalid base URL in config: {e}")))?;
    url.set_path("/download");
    url.query_pairs_mut().append_pair("token", token.expose());
    Ok(url.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_download_url() {
        let token = DownloadToken::new("abc-123_XYZ");
        let url = build_download_url("https://reports.benchlab.dev", &token).unwrap();
        assert_eq!(url, "https://reports.benchlab.dev/download?token=abc-123_XYZ");
    }

    #[test]
    fn test_build_download_url_replaces_path() {
        let token = DownloadToken::new("t");
        let url = build_download_url("https://reports.benchlab.dev/api/", &token).unwrap();
        assert_eq!(url, "https://reports.benchlab.dev/download?token=t");
    }

    #[test]
    fn test_build_download_url_rejects_garbage_base() {
        let token = DownloadToken::new("t");
        assert!(build_download_url("not a url", &token).is_err());
    }

    #[test]
    fn test_outcome_deserializes_snake_case() {
        let outcome: PaymentOutcome = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(outcome, PaymentOutcome::Paid);
        let outcome: PaymentOutcome = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(outcome, PaymentOutcome::Failed);
    }
}
