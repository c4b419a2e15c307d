//! Batch models exchanged with embedding providers.

use serde::{Deserialize, Serialize};

use super::content::ContentEmbedding;

/// An ordered group of worklist items submitted in one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in dispatch order (0-based).
    pub index: usize,
    /// Content strings, in worklist order.
    pub items: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Request sent to an [`EmbeddingProvider`](crate::domain::ports::EmbeddingProvider).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Model identifier, passed through untouched.
    pub model: String,
    /// Texts to embed.
    pub items: Vec<String>,
}

/// Provider response for one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Whether the provider reports success.
    pub success: bool,
    /// One entry per embedded text.
    #[serde(default)]
    pub content_embeddings: Vec<ContentEmbedding>,
    /// Provider error message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    /// Successful result carrying embeddings.
    pub fn succeeded(content_embeddings: Vec<ContentEmbedding>) -> Self {
        Self {
            success: true,
            content_embeddings,
            error: None,
        }
    }

    /// Failed result with a message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content_embeddings: Vec::new(),
            error: Some(error.into()),
        }
    }
}
