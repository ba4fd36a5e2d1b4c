//! Warm-up entry point called by the host after a record is saved.

use std::sync::Arc;

use chrono::Utc;
use thumbwarm_core::{
    aggregate, expand, scan, AliasRegistry, DeduplicationIndex, OutcomeStatus, PlannedVariant,
    RunId, SaveEvent, SchemaSource, WarmupOutcome, WarmupResult,
};
use tokio_util::sync::CancellationToken;
use tracing::field::display;
use tracing::{debug, info, warn};

use crate::backend::ThumbnailBackend;
use crate::config::EngineConfig;
use crate::error::WarmupError;
use crate::executor::WarmupExecutor;

/// Thumbnail warm-up engine.
///
/// Holds the host's read capabilities and the backend; every call to
/// [`WarmupEngine::on_save`] is an independent run.
pub struct WarmupEngine {
    schemas: Arc<dyn SchemaSource>,
    aliases: Arc<dyn AliasRegistry>,
    executor: WarmupExecutor,
}

impl WarmupEngine {
    /// Create a new engine.
    pub fn new(
        schemas: Arc<dyn SchemaSource>,
        aliases: Arc<dyn AliasRegistry>,
        backend: Arc<dyn ThumbnailBackend>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            schemas,
            aliases,
            executor: WarmupExecutor::new(backend, config.max_in_flight),
        }
    }

    /// Build the deduplicated plan for a save event without executing it.
    pub fn plan(&self, event: &SaveEvent) -> Result<Vec<PlannedVariant>, WarmupError> {
        plan(self.schemas.as_ref(), self.aliases.as_ref(), event)
    }

    /// Warm every thumbnail the saved record's image fields ask for.
    ///
    /// Only a cache directive without a saved file aborts the run; every
    /// other failure is reported in the returned result.
    pub async fn on_save(
        &self,
        event: &SaveEvent,
        cancel: CancellationToken,
    ) -> Result<WarmupResult, WarmupError> {
        let run_id = RunId::generate();
        let started_at = Utc::now();

        info!(
            run_id = %run_id,
            content_type = %event.content_type,
            max_in_flight = self.executor.max_in_flight(),
            "Starting thumbnail warm-up"
        );

        let planned = build_plan(
            self.schemas.as_ref(),
            self.aliases.as_ref(),
            event,
            Some(&run_id),
        );
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Thumbnail warm-up aborted");
                return Err(e);
            }
        };
        for rejected in plan.iter().filter_map(|p| match p {
            PlannedVariant::Rejected(outcome) => Some(outcome),
            PlannedVariant::Request(_) => None,
        }) {
            warn!(
                run_id = %run_id,
                origin = %rejected.origin,
                message = rejected.message.as_deref().unwrap_or_default(),
                "Variant rejected"
            );
        }

        let requests: Vec<_> = plan.iter().filter_map(PlannedVariant::request).cloned().collect();
        let executed = self.executor.execute(&run_id, requests, &cancel).await;

        let outcomes = merge(plan, executed);
        for failure in outcomes
            .iter()
            .filter(|o| o.status != OutcomeStatus::ConfigError && !o.status.is_success())
        {
            warn!(
                run_id = %run_id,
                variant = %failure.describe(),
                status = %failure.status,
                message = failure.message.as_deref().unwrap_or_default(),
                "Variant failed"
            );
        }

        let result = aggregate(run_id, event.content_type.clone(), outcomes, started_at);
        info!(
            run_id = %result.run_id,
            status = %result.overall_status,
            variants = result.outcomes.len(),
            failed = result.failures().count(),
            duration_ms = result.duration_ms(),
            "Thumbnail warm-up finished"
        );

        Ok(result)
    }
}

/// Build the deduplicated plan for a save event from the host's read
/// capabilities. An unknown content type plans nothing.
pub fn plan(
    schemas: &dyn SchemaSource,
    aliases: &dyn AliasRegistry,
    event: &SaveEvent,
) -> Result<Vec<PlannedVariant>, WarmupError> {
    build_plan(schemas, aliases, event, None)
}

/// Plan, tagging log lines with the run they belong to, if any.
fn build_plan(
    schemas: &dyn SchemaSource,
    aliases: &dyn AliasRegistry,
    event: &SaveEvent,
    run_id: Option<&RunId>,
) -> Result<Vec<PlannedVariant>, WarmupError> {
    let Some(schema) = schemas.schema(&event.content_type) else {
        warn!(
            run_id = run_id.map(display),
            content_type = %event.content_type,
            "No schema for content type"
        );
        return Ok(Vec::new());
    };

    let fields = scan(&schema, &event.values)?;
    let expanded = expand(&fields, aliases);
    let expanded_len = expanded.len();
    let plan = DeduplicationIndex::dedup(expanded);
    if plan.len() < expanded_len {
        debug!(
            run_id = run_id.map(display),
            content_type = %event.content_type,
            dropped = expanded_len - plan.len(),
            "Dropped duplicate variants"
        );
    }
    Ok(plan)
}

/// Put executed outcomes back at their requests' positions in the plan.
fn merge(plan: Vec<PlannedVariant>, executed: Vec<WarmupOutcome>) -> Vec<WarmupOutcome> {
    let mut executed = executed.into_iter();
    plan.into_iter()
        .filter_map(|planned| match planned {
            PlannedVariant::Request(_) => executed.next(),
            PlannedVariant::Rejected(outcome) => Some(outcome),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Realization;
    use crate::error::BackendError;
    use crate::host::StaticHost;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use thumbwarm_core::{
        AliasDefinition, CacheConfig, ContentTypeSchema, CropMode, FieldDefinition, OverallStatus,
        SavedValues, SizeSpec, VariantIdentity, VariantRequest,
    };

    /// Records every identity it is asked for; fails sources named `bad*`.
    #[derive(Default)]
    struct RecordingBackend {
        seen: Mutex<Vec<VariantIdentity>>,
    }

    #[async_trait]
    impl ThumbnailBackend for RecordingBackend {
        async fn realize(&self, request: &VariantRequest) -> Result<Realization, BackendError> {
            self.seen.lock().unwrap().push(request.identity().clone());
            if request.source_file().starts_with("bad") {
                return Err(BackendError::Generation("corrupt source".to_string()));
            }
            Ok(Realization::Ready)
        }
    }

    fn image(aliases: &[&str], sizes: Vec<SizeSpec>) -> FieldDefinition {
        FieldDefinition::new("image").with_cache(CacheConfig {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            sizes,
        })
    }

    fn host() -> Arc<StaticHost> {
        let schema = ContentTypeSchema::new()
            .with_field("title", FieldDefinition::new("text"))
            .with_field("hero", image(&["small", "missing"], vec![SizeSpec::new(200, 100, Some('f'))]))
            .with_field("teaser", image(&["small"], vec![]));

        Arc::new(
            StaticHost::new()
                .with_content_type("pages", schema)
                .with_alias(AliasDefinition::new("small", 100, 50, CropMode::Fit)),
        )
    }

    fn engine(backend: Arc<RecordingBackend>) -> WarmupEngine {
        let host = host();
        WarmupEngine::new(host.clone(), host, backend, &EngineConfig::default())
    }

    #[tokio::test]
    async fn test_outcomes_follow_plan_order() {
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(backend.clone());

        // hero@2x: small -> 200x100 Fit, missing, 200x100f -> 400x200 Fit
        // teaser: small -> 100x50 Fit on the same stripped file
        let values = SavedValues::new()
            .with_image("hero", "photo.jpg@2x")
            .with_image("teaser", "photo.jpg");
        let result = engine
            .on_save(&SaveEvent::new("pages", values), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(backend.seen.lock().unwrap().len(), 3);
        assert_eq!(result.outcomes.len(), 4);
        assert_eq!(result.overall_status, OverallStatus::PartialFailure);

        let statuses: Vec<OutcomeStatus> = result.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                OutcomeStatus::Success,
                OutcomeStatus::ConfigError,
                OutcomeStatus::Success,
                OutcomeStatus::Success,
            ]
        );

        let first = result.outcomes[0].request.as_ref().unwrap();
        assert_eq!(first.source_file(), "photo.jpg");
        assert_eq!((first.width(), first.height()), (200, 100));
        assert_eq!(first.crop_mode(), CropMode::Fit);
    }

    #[tokio::test]
    async fn test_same_variant_from_two_fields_is_deduplicated() {
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(backend.clone());

        let values = SavedValues::new()
            .with_image("hero", "shared.jpg")
            .with_image("teaser", "shared.jpg");
        let result = engine
            .on_save(&SaveEvent::new("pages", values), CancellationToken::new())
            .await
            .unwrap();

        // hero: small, missing, 200x100f; teaser: small (duplicate of hero's)
        assert_eq!(result.outcomes.len(), 3);
        assert_eq!(backend.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_source_aborts_run() {
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(backend.clone());

        let values = SavedValues::new().with_image("hero", "photo.jpg");
        let err = engine
            .on_save(&SaveEvent::new("pages", values), CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WarmupError::SourceMissing { ref field } if field == "teaser"));
        assert!(backend.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failures_are_reported() {
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(backend);

        let values = SavedValues::new()
            .with_image("hero", "bad.jpg")
            .with_image("teaser", "bad.jpg");
        let result = engine
            .on_save(&SaveEvent::new("pages", values), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.overall_status, OverallStatus::TotalFailure);
        assert_eq!(result.failures().count(), result.outcomes.len());
        assert!(result
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::BackendError)
            .all(|o| o.message.as_deref() == Some("Generation failed: corrupt source")));
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_nothing_to_do() {
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(backend);

        let result = engine
            .on_save(
                &SaveEvent::new("entries", SavedValues::new()),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.overall_status, OverallStatus::NothingToDo);
        assert_eq!(result.summary(), "No thumbnails to warm");
    }

    /// Formatted log output shared with the subscriber under test.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_every_run_log_line_carries_run_id() {
        let engine = engine(Arc::new(RecordingBackend::default()));

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let values = SavedValues::new()
            .with_image("hero", "shared.jpg")
            .with_image("teaser", "shared.jpg");
        let result = engine
            .on_save(&SaveEvent::new("pages", values), CancellationToken::new())
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let run_id = result.run_id.to_string();
        assert!(output.contains("Dropped duplicate variants"));
        assert!(output.contains("Variant rejected"));
        assert!(output.contains("Variant finished"));
        for line in output.lines() {
            assert!(line.contains(&run_id), "log line without run id: {line}");
        }
    }

    #[test]
    fn test_plan_does_not_touch_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let engine = engine(backend.clone());

        let values = SavedValues::new()
            .with_image("hero", "a.jpg")
            .with_image("teaser", "b.jpg");
        let plan = engine.plan(&SaveEvent::new("pages", values)).unwrap();

        assert_eq!(plan.len(), 4);
        assert_eq!(plan.iter().filter_map(PlannedVariant::request).count(), 3);
        assert!(backend.seen.lock().unwrap().is_empty());
    }
}
