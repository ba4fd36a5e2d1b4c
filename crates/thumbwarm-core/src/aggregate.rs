//! Reduction of per-variant outcomes into a run result.

use chrono::{DateTime, Utc};

use crate::{OverallStatus, RunId, WarmupOutcome, WarmupResult};

impl OverallStatus {
    /// Fold outcome statuses into an overall status.
    pub fn from_outcomes(outcomes: &[WarmupOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::NothingToDo;
        }

        let successes = outcomes.iter().filter(|o| o.status.is_success()).count();
        if successes == outcomes.len() {
            Self::AllSucceeded
        } else if successes == 0 {
            Self::TotalFailure
        } else {
            Self::PartialFailure
        }
    }
}

/// Build the result of a run that started at `started_at`.
pub fn aggregate(
    run_id: RunId,
    content_type: impl Into<String>,
    outcomes: Vec<WarmupOutcome>,
    started_at: DateTime<Utc>,
) -> WarmupResult {
    WarmupResult {
        run_id,
        content_type: content_type.into(),
        overall_status: OverallStatus::from_outcomes(&outcomes),
        outcomes,
        started_at,
        finished_at: Utc::now(),
    }
}
