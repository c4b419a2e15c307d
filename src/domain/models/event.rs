//! Progress events emitted during an engine run.

use uuid::Uuid;

/// Event emitted during a run. Purely observational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Batching finished and dispatch is about to start.
    Started {
        run_id: Uuid,
        batch_count: usize,
        item_count: usize,
    },
    /// A batch acquired a concurrency slot.
    BatchDispatched { batch: usize, items: usize },
    /// A batch attempt failed and will be retried.
    BatchRetrying {
        batch: usize,
        attempt: u32,
        max_attempts: u32,
        error: String,
    },
    /// A batch succeeded and its vectors were merged.
    BatchCompleted {
        batch: usize,
        attempts: u32,
        matched: usize,
    },
    /// A batch exhausted its retries.
    BatchFailed {
        batch: usize,
        attempts: u32,
        error: String,
    },
    /// Failed batches reached the failure budget.
    BudgetExceeded { failed: usize, max_failures: usize },
    /// The run finished.
    Completed {
        run_id: Uuid,
        success: bool,
        batch_count: usize,
    },
}
