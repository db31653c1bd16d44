//! VIN decoding route handlers.
//!
//! The public proxy surface: accepts a VIN, forwards it to NHTSA vPIC, and
//! returns the simplified field set. No order is involved.

use axum::{Json, extract::Path, extract::State};
use serde::Deserialize;
use tracing::instrument;

use benchlab_core::Vin;

use crate::error::{AppError, Result};
use crate::services::DecodedVehicle;
use crate::state::AppState;

/// Request body for `POST /vin`.
#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub vin: Option<String>,
}

/// Decode a VIN supplied in a JSON body.
#[instrument(skip(state, body))]
pub async fn decode(
    State(state): State<AppState>,
    Json(body): Json<DecodeRequest>,
) -> Result<Json<DecodedVehicle>> {
    let raw = body
        .vin
        .ok_or_else(|| AppError::BadRequest("VIN is required".to_string()))?;
    decode_value(&state, &raw).await
}

/// Decode a VIN supplied in the path.
#[instrument(skip(state))]
pub async fn decode_path(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<DecodedVehicle>> {
    decode_value(&state, &vin).await
}

async fn decode_value(state: &AppState, raw: &str) -> Result<Json<DecodedVehicle>> {
    let vin = Vin::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let decoded = state.decoder().decode(&vin).await?;
    Ok(Json(decoded))
}
