//! Concurrency coordinator for batch execution.
//!
//! Dispatches batches in order under a semaphore, merges each successful batch
//! inside one critical section, and counts failed batches against a shared
//! failure budget. Once the budget is reached the run is marked failed, but
//! in-flight batches finish and their vectors are kept.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::errors::EngineError;
use crate::domain::models::{Batch, EngineConfig, EngineEvent};
use crate::domain::ports::Logger;
use crate::services::batch_executor::{BatchExecutor, BatchOutcome};
use crate::services::events::EventEmitter;
use crate::services::result_merger::ResultMerger;

/// Configuration for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Maximum batches in flight.
    pub max_parallel_tasks: usize,
    /// Failed batches that trip the budget.
    pub max_failures: usize,
    /// Skip not-yet-started batches once the budget trips.
    pub cancel_pending_on_budget_exceeded: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for CoordinatorConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_parallel_tasks: config.max_parallel_tasks.max(1),
            max_failures: config.max_failures.max(1),
            cancel_pending_on_budget_exceeded: config.cancel_pending_on_budget_exceeded,
        }
    }
}

/// Failure counter shared by all batch tasks.
#[derive(Debug)]
pub struct FailureBudget {
    failed: AtomicUsize,
    max_failures: usize,
}

impl FailureBudget {
    pub const fn new(max_failures: usize) -> Self {
        Self {
            failed: AtomicUsize::new(0),
            max_failures,
        }
    }

    /// Record one failed batch and return the new total.
    pub fn record_failure(&self) -> usize {
        self.failed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn is_exhausted(&self) -> bool {
        self.failed() >= self.max_failures
    }

    pub const fn max_failures(&self) -> usize {
        self.max_failures
    }
}

/// Aggregate counters for one coordinated run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorReport {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub skipped: usize,
    pub provider_calls: u32,
    pub budget_exceeded: bool,
}

impl CoordinatorReport {
    /// Batches that ran to a success or failure.
    pub const fn processed(&self) -> usize {
        self.succeeded + self.failed
    }
}

enum BatchCompletion {
    Succeeded { attempts: u32 },
    Failed { attempts: u32 },
    Cancelled { attempts: u32 },
}

/// Bounded fan-out / fan-in over a [`BatchExecutor`].
pub struct ConcurrencyCoordinator {
    config: CoordinatorConfig,
    logger: Arc<dyn Logger>,
    events: EventEmitter,
}

impl ConcurrencyCoordinator {
    pub fn new(config: CoordinatorConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            config,
            logger,
            events: EventEmitter::disabled(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    /// Run every batch and wait for all dispatched batches to finish.
    ///
    /// Batches are dispatched in order; a batch waits for a free slot before
    /// its task is spawned. When `cancel` fires, batches not yet dispatched are
    /// skipped and in-flight batches stop at their next suspension point.
    pub async fn run(
        &self,
        batches: Vec<Batch>,
        executor: Arc<BatchExecutor>,
        merger: Arc<Mutex<ResultMerger>>,
        cancel: &CancellationToken,
    ) -> CoordinatorReport {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_tasks));
        let budget = Arc::new(FailureBudget::new(self.config.max_failures));
        let mut report = CoordinatorReport::default();
        let mut handles = Vec::with_capacity(batches.len());

        for batch in batches {
            if self.should_skip(&budget, cancel) {
                report.skipped += 1;
                continue;
            }

            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                report.skipped += 1;
                continue;
            };

            // Budget may have tripped while this batch waited for a slot.
            if self.should_skip(&budget, cancel) {
                report.skipped += 1;
                continue;
            }

            report.dispatched += 1;
            self.logger.debug(&format!(
                "Dispatching batch {} ({} items)",
                batch.index,
                batch.len()
            ));
            self.events.emit(EngineEvent::BatchDispatched {
                batch: batch.index,
                items: batch.len(),
            });

            let index = batch.index;
            let task = BatchTask {
                batch,
                executor: Arc::clone(&executor),
                merger: Arc::clone(&merger),
                budget: Arc::clone(&budget),
                logger: Arc::clone(&self.logger),
                events: self.events.clone(),
                cancel: cancel.clone(),
            };
            let handle = tokio::spawn(async move {
                let _permit = permit;
                task.run().await
            });
            handles.push((index, handle));
        }

        for (index, handle) in handles {
            match handle.await {
                Ok(BatchCompletion::Succeeded { attempts }) => {
                    report.succeeded += 1;
                    report.provider_calls += attempts;
                }
                Ok(BatchCompletion::Failed { attempts }) => {
                    report.failed += 1;
                    report.provider_calls += attempts;
                }
                Ok(BatchCompletion::Cancelled { attempts }) => {
                    report.cancelled += 1;
                    report.provider_calls += attempts;
                }
                Err(join_err) => {
                    let err = EngineError::Internal(format!("batch task aborted: {join_err}"));
                    self.logger.error(&format!("Batch {index} failed: {err}"));
                    report.failed += 1;
                    if budget.record_failure() == budget.max_failures() {
                        self.announce_budget_exceeded(&budget);
                    }
                }
            }
        }

        report.budget_exceeded = budget.is_exhausted();
        debug!(
            dispatched = report.dispatched,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            budget_exceeded = report.budget_exceeded,
            "all batches finished"
        );
        report
    }

    fn should_skip(&self, budget: &FailureBudget, cancel: &CancellationToken) -> bool {
        cancel.is_cancelled()
            || (self.config.cancel_pending_on_budget_exceeded && budget.is_exhausted())
    }

    fn announce_budget_exceeded(&self, budget: &FailureBudget) {
        announce_budget_exceeded(self.logger.as_ref(), &self.events, budget);
    }
}

fn announce_budget_exceeded(logger: &dyn Logger, events: &EventEmitter, budget: &FailureBudget) {
    logger.error(&format!(
        "Failure budget exceeded: {} batches failed (max {}); run will be marked failed",
        budget.failed(),
        budget.max_failures()
    ));
    events.emit(EngineEvent::BudgetExceeded {
        failed: budget.failed(),
        max_failures: budget.max_failures(),
    });
}

struct BatchTask {
    batch: Batch,
    executor: Arc<BatchExecutor>,
    merger: Arc<Mutex<ResultMerger>>,
    budget: Arc<FailureBudget>,
    logger: Arc<dyn Logger>,
    events: EventEmitter,
    cancel: CancellationToken,
}

impl BatchTask {
    async fn run(self) -> BatchCompletion {
        let index = self.batch.index;
        match self.executor.execute(&self.batch, &self.cancel).await {
            BatchOutcome::Succeeded {
                embeddings,
                attempts,
            } => {
                let stats = {
                    let mut merger = self.merger.lock().await;
                    merger.merge(&embeddings)
                };
                debug!(
                    batch = index,
                    attempts,
                    matched = stats.matched,
                    unmatched = stats.unmatched,
                    chunks_updated = stats.chunks_updated,
                    "batch merged"
                );
                self.events.emit(EngineEvent::BatchCompleted {
                    batch: index,
                    attempts,
                    matched: stats.matched,
                });
                BatchCompletion::Succeeded { attempts }
            }
            BatchOutcome::Failed { attempts, error } => {
                self.logger.error(&format!("Batch {index} failed: {error}"));
                self.events.emit(EngineEvent::BatchFailed {
                    batch: index,
                    attempts,
                    error: error.to_string(),
                });
                if self.budget.record_failure() == self.budget.max_failures() {
                    announce_budget_exceeded(self.logger.as_ref(), &self.events, &self.budget);
                }
                BatchCompletion::Failed { attempts }
            }
            BatchOutcome::Cancelled { attempts } => {
                debug!(batch = index, attempts, "batch cancelled");
                BatchCompletion::Cancelled { attempts }
            }
        }
    }
}
