//! Bounded-parallel execution of variant requests.
//!
//! Every request is attempted and reported exactly once. Outcomes come back
//! in submission order regardless of completion order.

use std::sync::Arc;

use thumbwarm_core::{RunId, VariantRequest, WarmupOutcome};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backend::{Realization, ThumbnailBackend};

/// Executes variant requests against a backend with at most `max_in_flight`
/// calls outstanding.
#[derive(Clone)]
pub struct WarmupExecutor {
    backend: Arc<dyn ThumbnailBackend>,
    max_in_flight: usize,
}

impl WarmupExecutor {
    /// Create a new executor. A zero limit is raised to one.
    pub fn new(backend: Arc<dyn ThumbnailBackend>, max_in_flight: usize) -> Self {
        if max_in_flight == 0 {
            warn!("max_in_flight of 0 would never run anything, using 1");
        }
        Self {
            backend,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// The concurrency cap in effect.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Execute all requests and return one outcome per request, positionally
    /// aligned with `requests`.
    ///
    /// When `cancel` fires, in-flight calls are dropped and queued ones never
    /// start; both are reported as backend errors.
    pub async fn execute(
        &self,
        run_id: &RunId,
        requests: Vec<VariantRequest>,
        cancel: &CancellationToken,
    ) -> Vec<WarmupOutcome> {
        if requests.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for (index, request) in requests.iter().cloned().enumerate() {
            let backend = Arc::clone(&self.backend);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let run_id = run_id.clone();

            tasks.spawn(async move {
                let outcome = realize_one(&run_id, backend, semaphore, cancel, request).await;
                (index, outcome)
            });
        }

        // Each slot is written once, by the collector, at its submission index.
        let mut slots: Vec<Option<WarmupOutcome>> = vec![None; requests.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!(run_id = %run_id, error = %e, "Variant task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(requests)
            .map(|(slot, request)| {
                slot.unwrap_or_else(|| {
                    WarmupOutcome::backend_error(request, "Variant task aborted before reporting")
                })
            })
            .collect()
    }
}

async fn realize_one(
    run_id: &RunId,
    backend: Arc<dyn ThumbnailBackend>,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
    request: VariantRequest,
) -> WarmupOutcome {
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        permit = semaphore.acquire_owned() => permit.ok(),
    };
    let Some(permit) = permit else {
        debug!(
            run_id = %run_id,
            identity = %request.identity(),
            "Variant abandoned before start"
        );
        return WarmupOutcome::backend_error(request, "Cancelled before the backend call started");
    };

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = backend.realize(&request) => Some(result),
    };
    drop(permit);

    let outcome = match result {
        None => WarmupOutcome::backend_error(request, "Cancelled while the backend call was in flight"),
        Some(Ok(Realization::Ready)) => WarmupOutcome::success(request),
        Some(Ok(Realization::Placeholder(message))) => WarmupOutcome::not_found(request, message),
        Some(Err(e)) => WarmupOutcome::backend_error(request, e.to_string()),
    };

    debug!(
        run_id = %run_id,
        identity = %outcome.describe(),
        status = %outcome.status,
        "Variant finished"
    );
    outcome
}
