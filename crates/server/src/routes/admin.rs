//! Manual payment override for operators.
//!
//! Equivalent to a positive provider webhook, but authenticated with the
//! shared admin token instead of coming from the payment provider. Used
//! when a payment confirmation was missed or handled out-of-band, and to
//! re-issue a download link for an already-paid order whose token expired
//! or was consumed without a successful delivery.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use secrecy::ExposeSecret;
use tracing::instrument;

use benchlab_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::routes::webhooks::{PaymentConfirmationResponse, confirm_paid, issue_download_token};
use crate::state::AppState;

/// Header carrying the shared admin secret.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Manually mark an order paid and mint its download token.
///
/// An order that is already paid gets a fresh token instead of a conflict;
/// any previous token is invalidated by the re-mint.
#[instrument(skip(state, headers))]
pub async fn mark_paid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PaymentConfirmationResponse>> {
    require_admin(&state, &headers)?;

    let id: OrderId = id
        .parse()
        .map_err(|_| AppError::BadRequest("invalid order id".to_string()))?;

    let order = state.store().get(id).await?;
    let response = if order.status == OrderStatus::Paid {
        tracing::info!(order_id = %id, "manual override: re-issuing download token");
        issue_download_token(&state, id).await?
    } else {
        tracing::info!(order_id = %id, "manual mark-paid override");
        confirm_paid(&state, id, None).await?
    };
    Ok(Json(response))
}

/// Check the admin token header against the configured secret.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<()> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("admin token required".to_string()))?;

    if presented != state.config().admin_token.expose_secret() {
        return Err(AppError::Unauthorized("invalid admin token".to_string()));
    }

    Ok(())
}
