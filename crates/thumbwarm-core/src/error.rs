//! Core planning errors.

use thiserror::Error;

/// An image field declares a cache directive but the saved record has no
/// file for it. The only error that aborts a scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Image field '{field}' has a cache directive but no saved file")]
pub struct SourceMissingError {
    pub field: String,
}

/// Core errors for thumbwarm planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A variant request was built without a source file.
    #[error("Variant request has an empty source file")]
    EmptySourceFile,

    /// A size spec string could not be parsed.
    #[error("Invalid size spec: {0}")]
    InvalidSizeSpec(String),

    /// A crop mode name could not be parsed.
    #[error("Invalid crop mode: {0}")]
    InvalidCropMode(String),
}
