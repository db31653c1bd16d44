//! NHTSA vPIC decoder client.
//!
//! Thin client for the public `decodevinvalues` endpoint. The upstream
//! response is a flat map of ~140 string fields; this client keeps the
//! handful the report surface uses and drops the rest. Decoded VINs are
//! cached with `moka` (5-minute TTL) since the data for a given VIN is
//! effectively static.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use benchlab_core::Vin;

/// Errors from VIN decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The request to vPIC failed (network, TLS, timeout).
    #[error("vPIC request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// vPIC answered with a non-success status.
    #[error("vPIC returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The response body did not have the expected shape.
    #[error("vPIC response missing Results[0]")]
    MissingResult,
}

/// Raw vPIC response envelope: `{ "Count": …, "Results": [ { … } ] }`.
#[derive(Debug, Deserialize)]
struct VpicResponse {
    #[serde(rename = "Results")]
    results: Vec<VpicRecord>,
}

/// The vPIC fields we keep, as they appear upstream.
///
/// vPIC uses empty strings rather than nulls for unknown fields; the
/// conversion below maps those to `None`.
#[derive(Debug, Deserialize)]
struct VpicRecord {
    #[serde(rename = "Make", default)]
    make: String,
    #[serde(rename = "Model", default)]
    model: String,
    #[serde(rename = "ModelYear", default)]
    model_year: String,
    #[serde(rename = "Manufacturer", default)]
    manufacturer: String,
    #[serde(rename = "VehicleType", default)]
    vehicle_type: String,
    #[serde(rename = "BodyClass", default)]
    body_class: String,
    #[serde(rename = "EngineCylinders", default)]
    engine_cylinders: String,
    #[serde(rename = "DisplacementL", default)]
    displacement_l: String,
    #[serde(rename = "FuelTypePrimary", default)]
    fuel_type: String,
    #[serde(rename = "PlantCountry", default)]
    plant_country: String,
    #[serde(rename = "ErrorCode", default)]
    error_code: String,
    #[serde(rename = "ErrorText", default)]
    error_text: String,
}

/// Simplified vehicle attribute set returned to clients and embedded in
/// reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedVehicle {
    /// The VIN as decoded.
    pub vin: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub model_year: Option<String>,
    pub manufacturer: Option<String>,
    pub vehicle_type: Option<String>,
    pub body_class: Option<String>,
    pub engine_cylinders: Option<String>,
    pub displacement_l: Option<String>,
    pub fuel_type: Option<String>,
    pub plant_country: Option<String>,
    /// vPIC error code; "0" means a clean decode.
    pub error_code: Option<String>,
    /// Human-readable decode caveats from vPIC.
    pub error_text: Option<String>,
}

impl DecodedVehicle {
    fn from_record(vin: &Vin, record: VpicRecord) -> Self {
        Self {
            vin: vin.as_str().to_string(),
            make: none_if_empty(record.make),
            model: none_if_empty(record.model),
            model_year: none_if_empty(record.model_year),
            manufacturer: none_if_empty(record.manufacturer),
            vehicle_type: none_if_empty(record.vehicle_type),
            body_class: none_if_empty(record.body_class),
            engine_cylinders: none_if_empty(record.engine_cylinders),
            displacement_l: none_if_empty(record.displacement_l),
            fuel_type: none_if_empty(record.fuel_type),
            plant_country: none_if_empty(record.plant_country),
            error_code: none_if_empty(record.error_code),
            error_text: none_if_empty(record.error_text),
        }
    }
}

fn none_if_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.len() < s.len() {
        return Some(trimmed.to_string());
    }
    Some(s)
}

/// Client for the NHTSA vPIC VIN decoding API.
///
/// Cheaply cloneable; decoded responses are cached for 5 minutes.
#[derive(Clone)]
pub struct VinDecoder {
    inner: Arc<VinDecoderInner>,
}

struct VinDecoderInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, DecodedVehicle>,
}

impl VinDecoder {
    /// Create a new decoder client against the given vPIC base URL
    /// (e.g., `https://vpic.nhtsa.dot.gov/api`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(VinDecoderInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    /// Decode a VIN, serving repeat lookups from cache.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` on network failure, a non-success upstream
    /// status, or a response without `Results[0]`.
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn decode(&self, vin: &Vin) -> Result<DecodedVehicle, DecodeError> {
        if let Some(cached) = self.inner.cache.get(vin.as_str()).await {
            tracing::debug!("vin decode served from cache");
            return Ok(cached);
        }

        let decoded = self.fetch(vin).await?;
        self.inner
            .cache
            .insert(vin.as_str().to_string(), decoded.clone())
            .await;
        Ok(decoded)
    }

    async fn fetch(&self, vin: &Vin) -> Result<DecodedVehicle, DecodeError> {
        let url = format!(
            "{}/vehicles/decodevinvalues/{}?format=json",
            self.inner.base_url,
            vin.as_str()
        );

        let response = self.inner.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "vPIC returned non-success status");
            return Err(DecodeError::Status(status));
        }

        let body: VpicResponse = response.json().await?;
        let record = body
            .results
            .into_iter()
            .next()
            .ok_or(DecodeError::MissingResult)?;

        Ok(DecodedVehicle::from_record(vin, record))
    }
}
