//! Thumbnail warm-up engine.
//!
//! This crate runs the plans built by `thumbwarm-core` against a
//! [`ThumbnailBackend`] with bounded parallelism, and exposes the single
//! entry point a host calls after a content record is saved.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use thumbwarm_core::{SaveEvent, SavedValues};
//! use thumbwarm_engine::{
//!     EngineConfig, HttpBackend, HttpBackendConfig, StaticHost, WarmupEngine,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! async fn warm() -> Result<(), Box<dyn std::error::Error>> {
//!     let host = Arc::new(StaticHost::from_path("site.json")?);
//!     let backend = Arc::new(HttpBackend::new(&HttpBackendConfig::default())?);
//!     let engine = WarmupEngine::new(host.clone(), host, backend, &EngineConfig::default());
//!
//!     let values = SavedValues::new().with_image("image", "2024-05/photo.jpg");
//!     let event = SaveEvent::new("pages", values);
//!
//!     let result = engine.on_save(&event, CancellationToken::new()).await?;
//!     println!("{}", result.summary());
//!     Ok(())
//! }
//! ```

mod backend;
mod config;
mod engine;
mod error;
mod executor;
mod host;
mod http;

// Re-export main types
pub use backend::{Realization, ThumbnailBackend};
pub use config::{EngineConfig, HttpBackendConfig};
pub use engine::{plan, WarmupEngine};
pub use error::{BackendError, HostError, WarmupError};
pub use executor::WarmupExecutor;
pub use host::StaticHost;
pub use http::HttpBackend;
