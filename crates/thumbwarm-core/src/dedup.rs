//! Deduplication of variant requests within one run.

use std::collections::HashSet;

use crate::{PlannedVariant, VariantIdentity, VariantRequest};

/// Set of identities already planned in the current run.
#[derive(Debug, Default)]
pub struct DeduplicationIndex {
    seen: HashSet<VariantIdentity>,
}

impl DeduplicationIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request. Returns false if its identity was already seen.
    pub fn insert(&mut self, request: &VariantRequest) -> bool {
        if self.seen.contains(request.identity()) {
            return false;
        }
        self.seen.insert(request.identity().clone())
    }

    /// Number of distinct identities seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Drop requests whose identity appeared earlier in the plan, keeping
    /// first occurrences in order. Rejected entries pass through.
    pub fn dedup(plan: Vec<PlannedVariant>) -> Vec<PlannedVariant> {
        let mut index = Self::new();
        plan.into_iter()
            .filter(|planned| match planned {
                PlannedVariant::Request(request) => index.insert(request),
                PlannedVariant::Rejected(_) => true,
            })
            .collect()
    }
}
