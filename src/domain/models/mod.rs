pub mod batch;
pub mod config;
pub mod content;
pub mod event;
pub mod forest;
pub mod request;
pub mod semantic;

pub use batch::{Batch, BatchRequest, BatchResult};
pub use config::{Config, EngineConfig, LoggingConfig};
pub use content::{ContentEmbedding, EmbeddingVector};
pub use event::EngineEvent;
pub use forest::{CellId, ChunkId, SemanticForest};
pub use request::{EmbeddingsRequest, EmbeddingsResult, RunStats};
pub use semantic::{SemanticCell, SemanticChunk};
