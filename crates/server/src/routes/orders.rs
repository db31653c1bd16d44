//! Order route handlers.

use axum::{Json, extract::Path, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use benchlab_core::{Order, OrderId, OrderStatus, Vin};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Request body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub vin: Option<String>,
}

/// Order as exposed over the API.
///
/// Deliberately not the core [`Order`]: the token value must never appear in
/// a response body. The expiry is included so owners can see whether their
/// download link is still live.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub vin: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub provider_reference: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            vin: order.vin.to_string(),
            status: order.status,
            created_at: order.created_at,
            paid_at: order.paid_at,
            token_expires_at: order.token_expires_at,
            provider_reference: order.provider_reference,
        }
    }
}

/// Create a pending order for a VIN report.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let raw = body
        .vin
        .ok_or_else(|| AppError::BadRequest("VIN is required".to_string()))?;
    let vin = Vin::parse(&raw).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let order = state.store().create(vin).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Fetch an order by id.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>> {
    let id: OrderId = id
        .parse()
        .map_err(|_| AppError::BadRequest("invalid order id".to_string()))?;
    let order = state.store().get(id).await?;
    Ok(Json(order.into()))
}
