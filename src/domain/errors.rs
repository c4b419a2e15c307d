//! Domain errors for the cellvec embeddings engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while collecting, batching, embedding or merging content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("No content to embed: request has no non-blank content")]
    NoContent,

    #[error("Batch {batch} failed after {attempts} attempts: {reason}")]
    BatchFailed {
        batch: usize,
        attempts: u32,
        reason: String,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider call timed out after {0} ms")]
    Timeout(u64),

    #[error("Incomplete provider response: {missing} of {expected} items have no embedding")]
    IncompleteResponse { missing: usize, expected: usize },

    #[error("Failure budget exceeded: {failed} batches failed (max {max_failures})")]
    BudgetExceeded { failed: usize, max_failures: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable snake_case name of the error category.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NoContent => "no_content",
            Self::BatchFailed { .. } => "batch_failed",
            Self::Provider(_) => "provider",
            Self::Timeout(_) => "timeout",
            Self::IncompleteResponse { .. } => "incomplete_response",
            Self::BudgetExceeded { .. } => "budget_exceeded",
            Self::Cancelled => "cancelled",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this error was caused by the request itself rather than the provider.
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::NoContent)
    }
}

pub type DomainResult<T> = Result<T, EngineError>;

/// Serializable error summary carried by a run result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error category, see [`EngineError::kind`].
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&EngineError> for ErrorInfo {
    fn from(err: &EngineError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<EngineError> for ErrorInfo {
    fn from(err: EngineError) -> Self {
        Self::from(&err)
    }
}

/// Configuration error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(usize),

    #[error("Invalid max_parallel_tasks: {0}. Must be at least 1")]
    InvalidMaxParallelTasks(usize),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error("Invalid max_failures: {0}. Must be at least 1")]
    InvalidMaxFailures(usize),

    #[error("Invalid timeout_ms: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error(
        "Invalid backoff configuration: retry_backoff_ms ({0}) must not exceed max_retry_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Default model cannot be empty")]
    EmptyModel,
}
