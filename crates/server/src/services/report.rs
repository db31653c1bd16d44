//! Vehicle report generation.
//!
//! A report is generated on demand after the download gate authorizes a
//! token: the decoded vehicle plus order metadata is rendered to a JSON file
//! under the spool directory, streamed to the client, and removed. The file
//! handle is a [`ReportArtifact`] guard that deletes its path on `Drop`, so
//! cleanup happens on every exit path - success, render error, or client
//! disconnect.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use benchlab_core::Order;

use super::vin::DecodedVehicle;

/// Errors from report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The spool directory or report file could not be written.
    #[error("report spool I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The report body failed to serialize.
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Generates transient report files under a spool directory.
#[derive(Clone)]
pub struct ReportGenerator {
    spool_dir: Arc<PathBuf>,
}

impl ReportGenerator {
    /// Create a generator spooling into the given directory.
    #[must_use]
    pub fn new(spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            spool_dir: Arc::new(spool_dir.into()),
        }
    }

    /// Render a report for an authorized order to a transient file.
    ///
    /// The returned artifact owns the file; it is removed when the artifact
    /// drops.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the spool directory cannot be created or the
    /// report cannot be written.
    pub async fn generate(
        &self,
        order: &Order,
        vehicle: &DecodedVehicle,
    ) -> Result<ReportArtifact, ReportError> {
        tokio::fs::create_dir_all(self.spool_dir.as_ref()).await?;

        let body = json!({
            "report": {
                "generated_at": Utc::now(),
                "order_id": order.id,
                "vin": order.vin,
                "ordered_at": order.created_at,
                "paid_at": order.paid_at,
            },
            "vehicle": vehicle,
        });
        let contents = serde_json::to_vec_pretty(&body)?;

        let file_name = format!("report-{}-{}.json", order.id, Uuid::new_v4());
        let path = self.spool_dir.join(&file_name);
        tokio::fs::write(&path, &contents).await?;

        tracing::debug!(order_id = %order.id, path = %path.display(), "report spooled");

        Ok(ReportArtifact { path, file_name })
    }
}

/// A transient report file, removed from the spool when dropped.
#[derive(Debug)]
pub struct ReportArtifact {
    path: PathBuf,
    file_name: String,
}

impl ReportArtifact {
    /// File name offered to the client in the attachment disposition.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path of the spooled file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full report body.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the spooled file cannot be read back.
    pub async fn read(&self) -> Result<Vec<u8>, ReportError> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

impl Drop for ReportArtifact {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            // Best effort; a leaked spool file is not worth failing over
            tracing::debug!(path = %self.path.display(), error = %e, "spool cleanup failed");
        }
    }
}
