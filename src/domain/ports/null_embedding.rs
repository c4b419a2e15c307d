//! Null embedding provider implementation.
//!
//! Used for dry runs where the pipeline should execute end to end
//! without a real backend.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::embedding::EmbeddingProvider;
use crate::domain::errors::DomainResult;
use crate::domain::models::{BatchRequest, BatchResult, ContentEmbedding};

/// A no-op embedding provider that returns empty vectors.
#[derive(Debug, Clone, Default)]
pub struct NullEmbeddingProvider;

impl NullEmbeddingProvider {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        Ok(BatchResult::succeeded(
            request
                .items
                .iter()
                .map(|item| ContentEmbedding::pending(item.clone()))
                .collect(),
        ))
    }
}
