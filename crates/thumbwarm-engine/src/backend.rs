//! Thumbnail backend contract.

use async_trait::async_trait;
use thumbwarm_core::VariantRequest;

use crate::error::BackendError;

/// What the backend produced for a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Realization {
    /// The variant was rendered or is already cached.
    Ready,
    /// The backend served its "source image missing" placeholder.
    Placeholder(String),
}

/// Capability that turns a variant request into a cached thumbnail.
///
/// Implementations may render in-process or fetch over the network. Calls
/// must be idempotent per identity; the executor may drop an in-flight call
/// on cancellation.
#[async_trait]
pub trait ThumbnailBackend: Send + Sync {
    /// Realize one variant.
    async fn realize(&self, request: &VariantRequest) -> Result<Realization, BackendError>;
}
