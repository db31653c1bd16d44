//! Token-gated report download.
//!
//! The only consumer of the download gate. On a successful authorization the
//! presented token is already revoked, so everything after that point -
//! decoding, spooling, streaming - happens exactly once per token. The spool
//! file is removed when the artifact guard drops, whichever way the handler
//! exits.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Query parameters for `GET /download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub token: Option<String>,
}

/// Authorize a token and deliver the report, exactly once.
#[instrument(skip(state, query))]
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    // Authorization and revocation are one atomic step inside the gate
    let order = state
        .gate()
        .authorize(query.token.as_deref(), Utc::now())
        .await?;

    let vehicle = state.decoder().decode(&order.vin).await?;
    let artifact = state.reports().generate(&order, &vehicle).await?;
    let body = artifact.read().await?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name());
    let response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response();

    // `artifact` drops here, removing the spooled file
    Ok(response)
}
