//! Error types for the export pipeline

use std::path::PathBuf;

use scanbridge_client::ClientError;
use thiserror::Error;

/// Result alias for export pipeline operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors that abort an export run
///
/// Per-item enrichment failures are not represented here. They are logged
/// and counted inside the pipeline, and the run keeps going without them.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Platform access failed (authentication, authorization, missing
    /// release, or transport)
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The assembled document could not be serialized
    #[error("Failed to serialize SARIF document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The output artifact could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Path that failed, either the artifact or its parent directory
        path: PathBuf,
        /// Underlying filesystem error
        source: std::io::Error,
    },
}
