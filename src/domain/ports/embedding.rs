//! Embedding provider port.
//!
//! Concrete adapters (local model servers, hosted APIs) translate a
//! [`BatchRequest`] into their own wire format. The engine only sees this
//! trait and is agnostic to transport and authentication.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::DomainResult;
use crate::domain::models::{BatchRequest, BatchResult};

/// Trait for embedding providers bound to one engine run.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "ollama", "openai", "null").
    fn name(&self) -> &'static str;

    /// Generate embeddings for every item in `request`.
    ///
    /// `timeout` is the budget for this call; the engine also enforces it.
    /// Implementations should stop work promptly once `cancel` fires.
    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> DomainResult<BatchResult>;
}
