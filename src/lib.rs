//! cellvec - batch embeddings engine
//!
//! cellvec turns an arbitrarily large set of text content (flat strings plus
//! the chunks of a nested semantic cell tree) into embedding vectors using a
//! pluggable provider, under bounded concurrency with per-batch retries and a
//! run-level failure budget.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the provider/logger ports
//! - **Service Layer** (`services`): collection, batching, execution, coordination, merge
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cellvec::{EmbeddingsEngine, EmbeddingsRequest, EngineConfig, NullEmbeddingProvider};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = EmbeddingsEngine::new(Arc::new(NullEmbeddingProvider::new()), EngineConfig::default())?;
//! let request = EmbeddingsRequest::new("text-small").with_content(["hello", "world"]);
//! let result = engine.generate_embeddings(request, &CancellationToken::new()).await;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ConfigError, DomainResult, EngineError, ErrorInfo};
pub use domain::models::{
    BatchRequest, BatchResult, Config, ContentEmbedding, EmbeddingsRequest, EmbeddingsResult,
    EngineConfig, EngineEvent, LoggingConfig, RunStats, SemanticCell, SemanticChunk,
    SemanticForest,
};
pub use domain::ports::{EmbeddingProvider, Level, Logger, NullEmbeddingProvider};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::logging::TracingLogger;
pub use services::{EmbeddingsEngine, EngineState};
