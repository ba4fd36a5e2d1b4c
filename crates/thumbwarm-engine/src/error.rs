//! Error types for the warm-up engine.

use thiserror::Error;
use thumbwarm_core::SourceMissingError;

/// Errors that abort a whole warm-up run.
///
/// Per-variant failures never surface here; they are recorded as outcomes.
#[derive(Debug, Error)]
pub enum WarmupError {
    /// An image field declares a cache directive but the record has no file
    /// for it.
    #[error("Image field '{field}' has a cache directive but no saved file")]
    SourceMissing { field: String },
}

impl From<SourceMissingError> for WarmupError {
    fn from(err: SourceMissingError) -> Self {
        Self::SourceMissing { field: err.field }
    }
}

/// Errors reported by a thumbnail backend for a single variant.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached or the transfer failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The configured base URL cannot address thumbnails.
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The backend failed to render the variant.
    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Errors loading host documents (schemas and aliases).
#[derive(Debug, Error)]
pub enum HostError {
    /// Failed to read the document.
    #[error("Failed to read host document: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON for the expected shape.
    #[error("Invalid host document: {0}")]
    Json(#[from] serde_json::Error),
}
