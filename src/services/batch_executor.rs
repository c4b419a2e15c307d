//! Batch executor: runs one batch against the provider with bounded retries.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::errors::{DomainResult, EngineError};
use crate::domain::models::{
    Batch, BatchRequest, BatchResult, ContentEmbedding, EngineConfig, EngineEvent,
};
use crate::domain::ports::{EmbeddingProvider, Logger};
use crate::services::events::EventEmitter;

/// Retry policy for provider calls
///
/// A batch gets at most `max_attempts` provider calls. Between attempts the
/// executor waits `initial_backoff_ms * 2^retry`, capped at `max_backoff_ms`;
/// an initial backoff of 0 retries immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    /// Retry immediately, no delay.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, 0, 0)
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (0-indexed).
    ///
    /// Formula: min(initial_backoff * 2^retry, max_backoff)
    pub fn calculate_backoff(&self, retry: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }
}

impl From<&EngineConfig> for RetryPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self::new(
            config.max_retries,
            config.retry_backoff_ms,
            config.max_retry_backoff_ms,
        )
    }
}

/// Final state of one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The provider returned a vector for every item.
    Succeeded {
        embeddings: Vec<ContentEmbedding>,
        attempts: u32,
    },
    /// Every attempt failed; `error` is [`EngineError::BatchFailed`].
    Failed { attempts: u32, error: EngineError },
    /// The run was cancelled before the batch could finish.
    Cancelled { attempts: u32 },
}

impl BatchOutcome {
    /// Provider calls made for this batch.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Runs batches against one provider.
///
/// The executor holds no shared mutable state; merging is done by the caller.
pub struct BatchExecutor {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    retry: RetryPolicy,
    timeout: Duration,
    logger: Arc<dyn Logger>,
    events: EventEmitter,
}

impl BatchExecutor {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        model: impl Into<String>,
        retry: RetryPolicy,
        timeout: Duration,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            retry,
            timeout,
            logger,
            events: EventEmitter::disabled(),
        }
    }

    /// Attach an event emitter for retry notifications.
    #[must_use]
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = events;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Execute a batch until it succeeds, runs out of attempts, or `cancel` fires.
    pub async fn execute(&self, batch: &Batch, cancel: &CancellationToken) -> BatchOutcome {
        let request = BatchRequest {
            model: self.model.clone(),
            items: batch.items.clone(),
        };
        let max_attempts = self.retry.max_attempts();
        let mut failures = 0u32;
        let mut last_error = EngineError::Provider("no attempt made".to_string());

        while failures < max_attempts {
            let attempt = failures + 1;
            if cancel.is_cancelled() {
                return BatchOutcome::Cancelled { attempts: failures };
            }

            // Cancelling from here on interrupts an in-flight call, which still counts.
            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => return BatchOutcome::Cancelled { attempts: attempt },
                response = timeout(
                    self.timeout,
                    self.provider.generate_embeddings(&request, self.timeout, cancel),
                ) => response,
            };

            let checked = match response {
                Ok(result) => result.and_then(|result| check_response(batch, result)),
                Err(_) => Err(EngineError::Timeout(duration_millis(self.timeout))),
            };

            match checked {
                Ok(embeddings) => {
                    if attempt > 1 {
                        debug!(batch = batch.index, attempt, "batch succeeded after retries");
                    }
                    return BatchOutcome::Succeeded {
                        embeddings,
                        attempts: attempt,
                    };
                }
                Err(err) => {
                    failures = attempt;
                    if failures < max_attempts {
                        self.logger.warn(&format!(
                            "Batch {} attempt {}/{} failed: {}. Retrying",
                            batch.index, attempt, max_attempts, err
                        ));
                        self.events.emit(EngineEvent::BatchRetrying {
                            batch: batch.index,
                            attempt,
                            max_attempts,
                            error: err.to_string(),
                        });

                        let backoff = self.retry.calculate_backoff(failures - 1);
                        if !backoff.is_zero() {
                            tokio::select! {
                                biased;
                                () = cancel.cancelled() => {
                                    return BatchOutcome::Cancelled { attempts: failures };
                                }
                                () = sleep(backoff) => {}
                            }
                        }
                    }
                    last_error = err;
                }
            }
        }

        warn!(
            batch = batch.index,
            attempts = failures,
            error = %last_error,
            "batch exhausted retries"
        );
        BatchOutcome::Failed {
            attempts: failures,
            error: EngineError::BatchFailed {
                batch: batch.index,
                attempts: failures,
                reason: last_error.to_string(),
            },
        }
    }
}

/// Reject failure flags, empty responses and responses missing batch items.
fn check_response(batch: &Batch, result: BatchResult) -> DomainResult<Vec<ContentEmbedding>> {
    if !result.success {
        return Err(EngineError::Provider(
            result
                .error
                .unwrap_or_else(|| "provider reported failure".to_string()),
        ));
    }
    if result.content_embeddings.is_empty() {
        return Err(EngineError::Provider(
            "provider returned no embeddings".to_string(),
        ));
    }

    let returned: HashSet<&str> = result
        .content_embeddings
        .iter()
        .map(|entry| entry.content.as_str())
        .collect();
    let missing = batch
        .items
        .iter()
        .filter(|item| !returned.contains(item.as_str()))
        .count();
    if missing > 0 {
        return Err(EngineError::IncompleteResponse {
            missing,
            expected: batch.len(),
        });
    }

    Ok(result.content_embeddings)
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
