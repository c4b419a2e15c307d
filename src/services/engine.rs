//! Embeddings engine: the single public entry point.
//!
//! Wires the collector, batcher, executor, coordinator and merger together:
//!
//! ```text
//! Collecting -> Batching -> Running -> Merged -> Done(Success | Failure)
//! ```
//!
//! Provider-side failures never surface as `Err`; the caller always receives
//! an [`EmbeddingsResult`] describing what happened.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{ConfigError, EngineError, ErrorInfo};
use crate::domain::models::{
    ContentEmbedding, EmbeddingsRequest, EmbeddingsResult, EngineConfig, EngineEvent, RunStats,
    SemanticForest,
};
use crate::domain::ports::{EmbeddingProvider, Logger};
use crate::infrastructure::logging::TracingLogger;
use crate::services::batch_executor::{BatchExecutor, RetryPolicy};
use crate::services::batcher::Batcher;
use crate::services::content_collector::ContentCollector;
use crate::services::coordinator::{ConcurrencyCoordinator, CoordinatorConfig, CoordinatorReport};
use crate::services::events::EventEmitter;
use crate::services::result_merger::ResultMerger;

/// Lifecycle state of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Collecting,
    Batching,
    Running,
    Merged,
    Done { success: bool },
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collecting => write!(f, "collecting"),
            Self::Batching => write!(f, "batching"),
            Self::Running => write!(f, "running"),
            Self::Merged => write!(f, "merged"),
            Self::Done { success: true } => write!(f, "done(success)"),
            Self::Done { success: false } => write!(f, "done(failure)"),
        }
    }
}

/// Batch embeddings engine bound to one provider.
pub struct EmbeddingsEngine {
    provider: Arc<dyn EmbeddingProvider>,
    config: EngineConfig,
    logger: Arc<dyn Logger>,
}

impl EmbeddingsEngine {
    /// Create an engine, validating `config`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            logger: Arc::new(TracingLogger::new()),
        })
    }

    /// Replace the diagnostic log sink (defaults to [`TracingLogger`]).
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Embed every content string and chunk of `request`.
    pub async fn generate_embeddings(
        &self,
        request: EmbeddingsRequest,
        cancel: &CancellationToken,
    ) -> EmbeddingsResult {
        self.run(request, cancel, EventEmitter::disabled()).await
    }

    /// Same as [`generate_embeddings`](Self::generate_embeddings), streaming
    /// [`EngineEvent`]s to `events`. Events are dropped if the channel is full.
    pub async fn generate_embeddings_with_events(
        &self,
        request: EmbeddingsRequest,
        cancel: &CancellationToken,
        events: mpsc::Sender<EngineEvent>,
    ) -> EmbeddingsResult {
        self.run(request, cancel, EventEmitter::new(events)).await
    }

    #[instrument(
        skip_all,
        fields(
            run_id = tracing::field::Empty,
            provider = self.provider.name(),
            model = %request.model,
        )
    )]
    async fn run(
        &self,
        request: EmbeddingsRequest,
        cancel: &CancellationToken,
        events: EventEmitter,
    ) -> EmbeddingsResult {
        let mut run = Run::start();
        tracing::Span::current().record("run_id", tracing::field::display(run.run_id));

        let EmbeddingsRequest {
            content,
            semantic_cell_forest,
            model,
        } = request;
        let forest = SemanticForest::from_cells(semantic_cell_forest);

        let worklist = match ContentCollector::new().collect(&content, &forest) {
            Ok(worklist) => worklist,
            Err(err) => {
                self.logger.warn(&format!("Nothing to embed: {err}"));
                return run.finish(forest, Vec::new(), Some(err), &events);
            }
        };
        run.stats.worklist_items = worklist.len();

        run.transition(EngineState::Batching);
        let batches = Batcher::new(self.config.batch_size).partition(&worklist);
        let merger = ResultMerger::new(&worklist, forest);
        if batches.is_empty() {
            let (forest, content_embeddings) = merger.into_parts();
            return run.finish(forest, content_embeddings, None, &events);
        }

        run.transition(EngineState::Running);
        info!(
            items = worklist.len(),
            batches = batches.len(),
            batch_size = self.config.batch_size,
            max_parallel_tasks = self.config.max_parallel_tasks,
            "starting embedding run"
        );
        events.emit(EngineEvent::Started {
            run_id: run.run_id,
            batch_count: batches.len(),
            item_count: worklist.len(),
        });

        let executor = Arc::new(
            BatchExecutor::new(
                Arc::clone(&self.provider),
                model,
                RetryPolicy::from(&self.config),
                self.config.timeout(),
                Arc::clone(&self.logger),
            )
            .with_events(events.clone()),
        );
        let coordinator =
            ConcurrencyCoordinator::new(CoordinatorConfig::from(&self.config), Arc::clone(&self.logger))
                .with_events(events.clone());
        let merger = Arc::new(Mutex::new(merger));

        let report = coordinator
            .run(batches, executor, Arc::clone(&merger), cancel)
            .await;
        run.record(&report);

        run.transition(EngineState::Merged);
        let merger = match Arc::try_unwrap(merger) {
            Ok(merger) => merger.into_inner(),
            Err(shared) => {
                warn!("merge target still shared after fan-in, copying results");
                shared.lock().await.clone()
            }
        };
        let (forest, content_embeddings) = merger.into_parts();

        // A cancel that lands after every batch finished leaves the run complete.
        let error = if cancel.is_cancelled() && report.cancelled + report.skipped > 0 {
            Some(EngineError::Cancelled)
        } else if report.budget_exceeded {
            Some(EngineError::BudgetExceeded {
                failed: report.failed,
                max_failures: self.config.max_failures,
            })
        } else {
            None
        };
        run.finish(forest, content_embeddings, error, &events)
    }
}

/// Per-run bookkeeping.
struct Run {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    state: EngineState,
    batch_count: usize,
    stats: RunStats,
}

impl Run {
    fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            state: EngineState::Collecting,
            batch_count: 0,
            stats: RunStats::default(),
        }
    }

    fn transition(&mut self, next: EngineState) {
        debug!(from = %self.state, to = %next, "engine state transition");
        self.state = next;
    }

    fn record(&mut self, report: &CoordinatorReport) {
        self.batch_count = report.processed();
        self.stats.batches_succeeded = report.succeeded;
        self.stats.batches_failed = report.failed;
        self.stats.batches_skipped = report.skipped + report.cancelled;
        self.stats.provider_calls = report.provider_calls;
    }

    fn finish(
        mut self,
        forest: SemanticForest,
        content_embeddings: Vec<ContentEmbedding>,
        error: Option<EngineError>,
        events: &EventEmitter,
    ) -> EmbeddingsResult {
        let success = error.is_none();
        self.transition(EngineState::Done { success });

        match &error {
            None => info!(
                batches = self.batch_count,
                failed = self.stats.batches_failed,
                "embedding run succeeded"
            ),
            Some(err) => warn!(
                batches = self.batch_count,
                error = %err,
                "embedding run failed"
            ),
        }
        events.emit(EngineEvent::Completed {
            run_id: self.run_id,
            success,
            batch_count: self.batch_count,
        });

        EmbeddingsResult {
            run_id: self.run_id,
            success,
            error: error.as_ref().map(ErrorInfo::from),
            batch_count: self.batch_count,
            semantic_cell_forest: forest.into_cells(),
            content_embeddings,
            stats: self.stats,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NullEmbeddingProvider;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            batch_size: 0,
            ..EngineConfig::default()
        };
        let result = EmbeddingsEngine::new(Arc::new(NullEmbeddingProvider::new()), config);
        assert!(matches!(result, Err(ConfigError::InvalidBatchSize(0))));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(EngineState::Collecting.to_string(), "collecting");
        assert_eq!(EngineState::Done { success: false }.to_string(), "done(failure)");
    }

    #[tokio::test]
    async fn test_null_provider_run_succeeds() {
        let engine = EmbeddingsEngine::new(
            Arc::new(NullEmbeddingProvider::new()),
            EngineConfig {
                batch_size: 2,
                ..EngineConfig::default()
            },
        )
        .unwrap();
        let request = EmbeddingsRequest::new("m").with_content(["a", "b", "c"]);

        let result = engine
            .generate_embeddings(request, &CancellationToken::new())
            .await;

        assert!(result.success);
        assert_eq!(result.batch_count, 2);
        assert_eq!(result.content_embeddings.len(), 3);
        assert_eq!(result.stats.provider_calls, 2);
        assert!(result.finished_at >= result.started_at);
    }

    #[tokio::test]
    async fn test_cancelled_run_is_failure_with_no_calls() {
        let engine =
            EmbeddingsEngine::new(Arc::new(NullEmbeddingProvider::new()), EngineConfig::default())
                .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine
            .generate_embeddings(EmbeddingsRequest::new("m").with_content(["a"]), &cancel)
            .await;

        assert!(!result.success);
        assert_eq!(result.error.unwrap().kind, "cancelled");
        assert_eq!(result.batch_count, 0);
        assert_eq!(result.stats.batches_skipped, 1);
        assert_eq!(result.content_embeddings.len(), 1);
    }
}
