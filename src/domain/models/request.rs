//! Engine request and result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentEmbedding;
use super::semantic::SemanticCell;
use crate::domain::errors::ErrorInfo;

/// Input to [`EmbeddingsEngine::generate_embeddings`](crate::services::EmbeddingsEngine::generate_embeddings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsRequest {
    /// Explicit content strings.
    #[serde(default)]
    pub content: Vec<String>,

    /// Semantic cell forest whose chunks are embedded in place.
    #[serde(default)]
    pub semantic_cell_forest: Vec<SemanticCell>,

    /// Model identifier passed to the provider.
    #[serde(default)]
    pub model: String,
}

impl EmbeddingsRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_content<I, S>(mut self, content: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content.extend(content.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_cells(mut self, cells: Vec<SemanticCell>) -> Self {
        self.semantic_cell_forest.extend(cells);
        self
    }
}

/// Batch level counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Distinct non-blank content strings submitted.
    pub worklist_items: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    /// Batches never dispatched (cancellation or early budget stop).
    pub batches_skipped: usize,
    /// Provider calls made across all batches, retries included.
    pub provider_calls: u32,
}

/// Aggregate outcome of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsResult {
    pub run_id: Uuid,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    /// Number of batches processed (succeeded or failed).
    pub batch_count: usize,
    /// The caller's forest, same topology, vectors filled in.
    pub semantic_cell_forest: Vec<SemanticCell>,
    /// One entry per distinct worklist item, in worklist order.
    pub content_embeddings: Vec<ContentEmbedding>,
    pub stats: RunStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl EmbeddingsResult {
    /// Look up the flat entry for a content string.
    pub fn embedding_for(&self, content: &str) -> Option<&ContentEmbedding> {
        self.content_embeddings
            .iter()
            .find(|entry| entry.content == content)
    }

    /// Number of flat entries that received a vector.
    pub fn embedded_count(&self) -> usize {
        self.content_embeddings
            .iter()
            .filter(|entry| entry.is_embedded())
            .count()
    }
}
