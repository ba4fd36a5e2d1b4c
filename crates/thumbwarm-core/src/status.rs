//! Status enums for variant outcomes and whole runs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single variant in a warm-up run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// The backend rendered (or already had) the variant.
    Success,
    /// The backend answered with its placeholder: the source image is absent.
    NotFound,
    /// The variant references an alias with no registered definition.
    ConfigError,
    /// Generation or transport failed, or the run was cancelled.
    BackendError,
}

impl OutcomeStatus {
    /// Returns true if the variant was warmed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short lowercase label for tables and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotFound => "not_found",
            Self::ConfigError => "config_error",
            Self::BackendError => "backend_error",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Overall status of a warm-up run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    /// No variant was planned.
    #[default]
    NothingToDo,
    /// Every variant succeeded.
    AllSucceeded,
    /// Some variants succeeded, some did not.
    PartialFailure,
    /// No variant succeeded.
    TotalFailure,
}

impl OverallStatus {
    /// Returns true if at least one variant failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::PartialFailure | Self::TotalFailure)
    }

    /// Short lowercase label for tables and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NothingToDo => "nothing_to_do",
            Self::AllSucceeded => "all_succeeded",
            Self::PartialFailure => "partial_failure",
            Self::TotalFailure => "total_failure",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
