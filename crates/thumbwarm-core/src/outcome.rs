//! Per-variant outcomes and the aggregated run result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OutcomeStatus, OverallStatus, RunId, VariantOrigin, VariantRequest};

/// Outcome of one planned variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupOutcome {
    /// Field and entry the variant came from.
    pub origin: VariantOrigin,

    /// The executed request. Absent only for configuration errors, which
    /// never reach the backend.
    pub request: Option<VariantRequest>,

    /// Outcome status.
    pub status: OutcomeStatus,

    /// Human-readable detail, set for every non-success outcome.
    pub message: Option<String>,
}

impl WarmupOutcome {
    /// The backend produced the variant.
    pub fn success(request: VariantRequest) -> Self {
        Self::executed(request, OutcomeStatus::Success, None)
    }

    /// The backend reported the source image as missing.
    pub fn not_found(request: VariantRequest, message: impl Into<String>) -> Self {
        Self::executed(request, OutcomeStatus::NotFound, Some(message.into()))
    }

    /// Generation, transport or cancellation failure.
    pub fn backend_error(request: VariantRequest, message: impl Into<String>) -> Self {
        Self::executed(request, OutcomeStatus::BackendError, Some(message.into()))
    }

    /// A cache directive entry that could not be turned into a request.
    pub fn config_error(origin: VariantOrigin, message: impl Into<String>) -> Self {
        Self {
            origin,
            request: None,
            status: OutcomeStatus::ConfigError,
            message: Some(message.into()),
        }
    }

    fn executed(request: VariantRequest, status: OutcomeStatus, message: Option<String>) -> Self {
        Self {
            origin: request.origin().clone(),
            request: Some(request),
            status,
            message,
        }
    }

    /// Short description of the variant for reports: its thumbnail path, or
    /// the directive entry for configuration errors.
    pub fn describe(&self) -> String {
        match &self.request {
            Some(request) => request.identity().to_string(),
            None => self.origin.to_string(),
        }
    }
}

/// Aggregated result of one warm-up run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupResult {
    /// Run identifier.
    pub run_id: RunId,

    /// Content type of the saved record.
    pub content_type: String,

    /// One outcome per planned variant, in plan order.
    pub outcomes: Vec<WarmupOutcome>,

    /// Status folded from `outcomes`.
    pub overall_status: OverallStatus,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl WarmupResult {
    /// Outcomes that did not succeed.
    pub fn failures(&self) -> impl Iterator<Item = &WarmupOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    /// Number of successful outcomes.
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    /// Wall-clock duration of the run in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// One-line message for the user who saved the record.
    pub fn summary(&self) -> String {
        match self.overall_status {
            OverallStatus::NothingToDo => "No thumbnails to warm".to_string(),
            OverallStatus::AllSucceeded => {
                format!("Warmed {} thumbnail(s)", self.outcomes.len())
            }
            OverallStatus::PartialFailure | OverallStatus::TotalFailure => format!(
                "{} of {} thumbnail(s) failed to warm",
                self.outcomes.len() - self.success_count(),
                self.outcomes.len()
            ),
        }
    }
}
