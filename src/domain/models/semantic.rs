//! Semantic cell tree models
//!
//! Cells and chunks come from the document extraction step. The engine only
//! ever writes chunk vectors into this tree; it never adds, removes or
//! reorders nodes.

use serde::{Deserialize, Serialize};

use super::content::EmbeddingVector;

/// A leaf unit of extracted text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticChunk {
    /// Caller-assigned identifier, never interpreted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Text content of this chunk
    pub content: String,

    /// Embedding vector, empty until filled
    #[serde(default)]
    pub embedding: EmbeddingVector,
}

impl SemanticChunk {
    /// Create a chunk with no vector
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            embedding: Vec::new(),
        }
    }

    /// Set the caller identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A node in a document's logical structure (section, paragraph, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticCell {
    /// Caller-assigned identifier, never interpreted by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Chunks owned directly by this cell
    #[serde(default)]
    pub chunks: Vec<SemanticChunk>,

    /// Nested cells
    #[serde(default)]
    pub children: Vec<SemanticCell>,
}

impl SemanticCell {
    /// Create an empty cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the caller identifier
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a chunk
    #[must_use]
    pub fn with_chunk(mut self, chunk: SemanticChunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Append a child cell
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}
