//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Service banner
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (data dir reachable)
//!
//! # VIN decoding (public proxy)
//! POST /vin                     - Decode a VIN from a JSON body
//! GET  /vin/{vin}               - Decode a VIN from the path
//!
//! # Orders
//! POST /orders                  - Create a pending order
//! GET  /orders/{id}             - Fetch an order (token never included)
//!
//! # Payment confirmation
//! POST /webhooks/payment        - Provider webhook: mark paid/failed,
//!                                 mint the download token on success
//! POST /admin/orders/{id}/mark-paid - Manual override (x-admin-token)
//!
//! # Delivery
//! GET  /download?token=…        - One-shot gated report download
//! ```

pub mod admin;
pub mod download;
pub mod orders;
pub mod vin;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{id}", get(orders::show))
}

/// Create the VIN decoding routes router.
pub fn vin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(vin::decode))
        .route("/{vin}", get(vin::decode_path))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // VIN decoding proxy
        .nest("/vin", vin_routes())
        // Orders
        .nest("/orders", order_routes())
        // Payment confirmation source
        .route("/webhooks/payment", post(webhooks::payment))
        // Manual override for operators
        .route("/admin/orders/{id}/mark-paid", post(admin::mark_paid))
        // Token-gated delivery
        .route("/download", get(download::download))
}
