//! Flat content embedding models.

use serde::{Deserialize, Serialize};

/// An embedding vector. Its length is defined by the provider and model.
pub type EmbeddingVector = Vec<f32>;

/// Pairs one content string with its embedding vector.
///
/// The vector stays empty until a batch containing `content` succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEmbedding {
    /// The exact text that was embedded.
    pub content: String,
    /// The embedding vector (empty until filled).
    #[serde(default)]
    pub embedding: EmbeddingVector,
}

impl ContentEmbedding {
    /// Create an entry with an empty vector.
    pub fn pending(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            embedding: Vec::new(),
        }
    }

    /// Create an entry with a vector.
    pub fn new(content: impl Into<String>, embedding: EmbeddingVector) -> Self {
        Self {
            content: content.into(),
            embedding,
        }
    }

    /// Whether a vector has been written into this entry.
    pub fn is_embedded(&self) -> bool {
        !self.embedding.is_empty()
    }
}
