//! Thumbwarm Core
//!
//! This crate contains the pure planning half of the thumbnail warm-up
//! engine, with no dependencies on:
//! - An async runtime
//! - Network transports
//! - Image processing
//!
//! A save event flows through [`scanner`], [`expander`] and [`dedup`] to
//! become an ordered list of [`PlannedVariant`]s; the engine crate executes
//! them and [`aggregate`] folds the outcomes into a [`WarmupResult`].

pub mod aggregate;
pub mod alias;
pub mod dedup;
pub mod error;
pub mod expander;
pub mod ids;
pub mod outcome;
pub mod scanner;
pub mod schema;
pub mod status;
pub mod variant;

// Re-export commonly used types
pub use aggregate::aggregate;
pub use alias::{AliasDefinition, AliasRegistry, CropMode};
pub use dedup::DeduplicationIndex;
pub use error::{CoreError, SourceMissingError};
pub use expander::{expand, PlannedVariant};
pub use ids::RunId;
pub use outcome::{WarmupOutcome, WarmupResult};
pub use scanner::{scan, CacheableImageField};
pub use schema::{
    CacheConfig, ContentTypeSchema, FieldDefinition, SaveEvent, SavedValues, SchemaSource,
};
pub use status::{OutcomeStatus, OverallStatus};
pub use variant::{SizeSpec, VariantEntry, VariantIdentity, VariantOrigin, VariantRequest};
