//! Common test utilities for integration tests
//!
//! Provides scripted embedding providers and helpers shared across the
//! integration test files.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cellvec::{
    BatchRequest, BatchResult, ContentEmbedding, DomainResult, EmbeddingProvider, EngineConfig,
    EngineError, Level, Logger,
};
use tokio_util::sync::CancellationToken;

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Engine config with fast, immediate retries for tests.
pub fn test_config(batch_size: usize, max_parallel_tasks: usize) -> EngineConfig {
    EngineConfig {
        batch_size,
        max_parallel_tasks,
        timeout_ms: 5_000,
        ..EngineConfig::default()
    }
}

/// Deterministic vector for a content string.
pub fn vector_for(content: &str) -> Vec<f32> {
    let len = content.chars().count() as f32;
    let first = content.bytes().next().map_or(0.0, f32::from);
    vec![len, first, 1.0]
}

fn embed_all(request: &BatchRequest) -> BatchResult {
    BatchResult::succeeded(
        request
            .items
            .iter()
            .map(|item| ContentEmbedding::new(item.clone(), vector_for(item)))
            .collect(),
    )
}

/// Embeds every item with [`vector_for`] and records each request.
#[derive(Default)]
pub struct DeterministicProvider {
    calls: AtomicU32,
    requests: Mutex<Vec<Vec<String>>>,
}

impl DeterministicProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicProvider {
    fn name(&self) -> &'static str {
        "deterministic"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.items.clone());
        Ok(embed_all(request))
    }
}

/// Fails every call.
#[derive(Default)]
pub struct FailingProvider {
    calls: AtomicU32,
}

impl FailingProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate_embeddings(
        &self,
        _request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(EngineError::Provider("provider unavailable".to_string()))
    }
}

/// Fails the first `failures` calls, then behaves like [`DeterministicProvider`].
pub struct FlakyProvider {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyProvider {
    pub fn new(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FlakyProvider {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Ok(BatchResult::failed(format!("transient failure {call}")));
        }
        Ok(embed_all(request))
    }
}

/// Fails every batch containing one of the given items.
pub struct PoisonedProvider {
    poisoned: HashSet<String>,
    calls: AtomicU32,
}

impl PoisonedProvider {
    pub fn new<I, S>(poisoned: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            poisoned: poisoned.into_iter().map(Into::into).collect(),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for PoisonedProvider {
    fn name(&self) -> &'static str {
        "poisoned"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.items.iter().any(|item| self.poisoned.contains(item)) {
            return Err(EngineError::Provider("poisoned batch".to_string()));
        }
        Ok(embed_all(request))
    }
}

/// Panics on any batch whose first item is `trigger`, embeds everything else.
pub struct PanickingProvider {
    trigger: String,
}

impl PanickingProvider {
    pub fn new(trigger: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            trigger: trigger.into(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for PanickingProvider {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        if request.items.first() == Some(&self.trigger) {
            panic!("provider crashed on {}", self.trigger);
        }
        Ok(embed_all(request))
    }
}

/// Embeds every item, cancelling `token` during the call it serves.
pub struct CancellingProvider {
    token: CancellationToken,
}

impl CancellingProvider {
    pub fn new(token: CancellationToken) -> Arc<Self> {
        Arc::new(Self { token })
    }
}

#[async_trait]
impl EmbeddingProvider for CancellingProvider {
    fn name(&self) -> &'static str {
        "cancelling"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        self.token.cancel();
        Ok(embed_all(request))
    }
}

/// Sleeps on every call and records the peak number of concurrent calls.
pub struct ConcurrencyProbe {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicU32,
}

impl ConcurrencyProbe {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicU32::new(0),
        })
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for ConcurrencyProbe {
    fn name(&self) -> &'static str {
        "probe"
    }

    async fn generate_embeddings(
        &self,
        request: &BatchRequest,
        _timeout: Duration,
        cancel: &CancellationToken,
    ) -> DomainResult<BatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);

        let outcome = tokio::select! {
            () = cancel.cancelled() => Err(EngineError::Cancelled),
            () = tokio::time::sleep(self.delay) => Ok(embed_all(request)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Logger that keeps every message for assertions.
#[derive(Default)]
pub struct CapturingLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl CapturingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl Logger for CapturingLogger {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().unwrap().push((level, message.to_string()));
    }
}
