//! Service layer: the embeddings batch-processing pipeline.
//!
//! Leaf first: [`ContentCollector`] → [`Batcher`] → [`BatchExecutor`] under the
//! [`ConcurrencyCoordinator`] → [`ResultMerger`], wired by [`EmbeddingsEngine`].

pub mod batch_executor;
pub mod batcher;
pub mod content_collector;
pub mod coordinator;
pub mod engine;
pub mod events;
pub mod result_merger;

pub use batch_executor::{BatchExecutor, BatchOutcome, RetryPolicy};
pub use batcher::Batcher;
pub use content_collector::ContentCollector;
pub use coordinator::{ConcurrencyCoordinator, CoordinatorConfig, CoordinatorReport, FailureBudget};
pub use engine::{EmbeddingsEngine, EngineState};
pub use events::EventEmitter;
pub use result_merger::{MergeStats, ResultMerger};
