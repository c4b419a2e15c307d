//! End-to-end engine runs against scripted providers.

mod common;

use std::sync::Arc;

use cellvec::{
    EmbeddingsEngine, EmbeddingsRequest, EngineConfig, EngineEvent, Level, SemanticCell,
    SemanticChunk,
};
use common::{
    setup_test_logging, test_config, vector_for, CancellingProvider, CapturingLogger,
    DeterministicProvider, FailingProvider, FlakyProvider, PanickingProvider, PoisonedProvider,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn engine(provider: Arc<dyn cellvec::EmbeddingProvider>, config: EngineConfig) -> EmbeddingsEngine {
    EmbeddingsEngine::new(provider, config).expect("valid config")
}

fn letters(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{i}")).collect()
}

#[tokio::test]
async fn test_empty_request_is_input_error() {
    setup_test_logging();
    let provider = DeterministicProvider::new();
    let engine = engine(provider.clone(), EngineConfig::default());

    let result = engine
        .generate_embeddings(EmbeddingsRequest::new("m"), &CancellationToken::new())
        .await;

    assert!(!result.success);
    assert_eq!(result.batch_count, 0);
    assert_eq!(result.error.as_ref().unwrap().kind, "no_content");
    assert!(result.content_embeddings.is_empty());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_blank_only_request_is_input_error() {
    let provider = DeterministicProvider::new();
    let engine = engine(provider.clone(), EngineConfig::default());
    let request = EmbeddingsRequest::new("m")
        .with_content(["   ", ""])
        .with_cells(vec![SemanticCell::new().with_chunk(SemanticChunk::new("\t\n"))]);

    let result = engine
        .generate_embeddings(request, &CancellationToken::new())
        .await;

    assert!(!result.success);
    assert_eq!(result.batch_count, 0);
    assert_eq!(result.error.as_ref().unwrap().kind, "no_content");
    assert_eq!(provider.calls(), 0);
    // Forest is handed back untouched.
    assert_eq!(result.semantic_cell_forest.len(), 1);
    assert!(result.semantic_cell_forest[0].chunks[0].embedding.is_empty());
}

#[tokio::test]
async fn test_shared_content_fans_out_to_every_occurrence() {
    let provider = DeterministicProvider::new();
    let engine = engine(provider.clone(), test_config(4, 2));

    let forest = vec![
        SemanticCell::new()
            .with_id("section")
            .with_chunk(SemanticChunk::new("shared").with_id("c1"))
            .with_child(
                SemanticCell::new()
                    .with_chunk(SemanticChunk::new("shared").with_id("c2"))
                    .with_chunk(SemanticChunk::new("unique")),
            ),
        SemanticCell::new().with_chunk(SemanticChunk::new("shared").with_id("c3")),
    ];
    let request = EmbeddingsRequest::new("m")
        .with_content(["shared"])
        .with_cells(forest);

    let result = engine
        .generate_embeddings(request, &CancellationToken::new())
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.batch_count, 1);
    assert_eq!(provider.calls(), 1);
    assert_eq!(provider.requests(), vec![vec!["shared".to_string(), "unique".to_string()]]);

    let expected = vector_for("shared");
    let shared_flat: Vec<_> = result
        .content_embeddings
        .iter()
        .filter(|entry| entry.content == "shared")
        .collect();
    assert_eq!(shared_flat.len(), 1);
    assert_eq!(shared_flat[0].embedding, expected);

    let root = &result.semantic_cell_forest[0];
    assert_eq!(root.id.as_deref(), Some("section"));
    assert_eq!(root.chunks[0].id.as_deref(), Some("c1"));
    assert_eq!(root.chunks[0].embedding, expected);
    assert_eq!(root.children[0].chunks[0].embedding, expected);
    assert_eq!(root.children[0].chunks[1].embedding, vector_for("unique"));
    assert_eq!(result.semantic_cell_forest[1].chunks[0].embedding, expected);
}

#[tokio::test]
async fn test_batches_follow_worklist_order() {
    let provider = DeterministicProvider::new();
    let engine = engine(provider.clone(), test_config(3, 1));
    let items = letters(7);

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(items.clone()),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.batch_count, 3);
    assert_eq!(provider.requests(), vec![items[0..3].to_vec(), items[3..6].to_vec(), items[6..].to_vec()]);
    let flat: Vec<_> = result
        .content_embeddings
        .iter()
        .map(|entry| entry.content.clone())
        .collect();
    assert_eq!(flat, items);
    assert_eq!(result.embedded_count(), 7);
}

#[tokio::test]
async fn test_budget_trip_keeps_partial_results() {
    setup_test_logging();
    let items = letters(5);
    let provider = PoisonedProvider::new([items[2].clone(), items[3].clone(), items[4].clone()]);
    let config = EngineConfig {
        max_failures: 2,
        ..test_config(1, 1)
    };
    let engine = engine(provider.clone(), config);

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(items.clone()),
            &CancellationToken::new(),
        )
        .await;

    assert!(!result.success);
    let error = result.error.as_ref().unwrap();
    assert_eq!(error.kind, "budget_exceeded");
    assert!(error.message.contains("3 batches failed"));
    // Dispatch continues after the trip by default.
    assert_eq!(result.batch_count, 5);
    assert_eq!(result.stats.batches_succeeded, 2);
    assert_eq!(result.stats.batches_failed, 3);
    assert_eq!(result.stats.batches_skipped, 0);
    assert_eq!(provider.calls(), 2 + 3 * 3);

    assert_eq!(result.embedding_for(&items[0]).unwrap().embedding, vector_for(&items[0]));
    assert_eq!(result.embedding_for(&items[1]).unwrap().embedding, vector_for(&items[1]));
    assert!(!result.embedding_for(&items[4]).unwrap().is_embedded());
}

#[tokio::test]
async fn test_always_failing_provider_trips_budget() {
    let provider = FailingProvider::new();
    let config = EngineConfig {
        max_failures: 2,
        ..test_config(2, 4)
    };
    let engine = engine(provider.clone(), config);

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(letters(10)),
            &CancellationToken::new(),
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_ref().unwrap().kind, "budget_exceeded");
    assert_eq!(result.batch_count, 5);
    assert_eq!(result.stats.batches_failed, 5);
    assert_eq!(result.embedded_count(), 0);
    assert_eq!(provider.calls(), 15);
}

#[tokio::test]
async fn test_cancel_pending_on_budget_exceeded_skips_unstarted_batches() {
    let provider = FailingProvider::new();
    let config = EngineConfig {
        max_failures: 2,
        cancel_pending_on_budget_exceeded: true,
        ..test_config(1, 1)
    };
    let engine = engine(provider.clone(), config);

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(letters(5)),
            &CancellationToken::new(),
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_ref().unwrap().kind, "budget_exceeded");
    assert_eq!(result.batch_count, 2);
    assert_eq!(result.stats.batches_skipped, 3);
    assert_eq!(provider.calls(), 6);
}

#[tokio::test]
async fn test_batch_succeeds_on_last_allowed_attempt() {
    let provider = FlakyProvider::new(2);
    let engine = engine(provider.clone(), test_config(8, 1));

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(["a", "b"]),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.success);
    assert_eq!(provider.calls(), 3);
    assert_eq!(result.stats.provider_calls, 3);
    assert_eq!(result.stats.batches_succeeded, 1);
    assert_eq!(result.embedding_for("a").unwrap().embedding, vector_for("a"));
}

#[tokio::test]
async fn test_batch_fails_after_max_retries() {
    let provider = FlakyProvider::new(3);
    let config = EngineConfig {
        max_failures: 1,
        ..test_config(8, 1)
    };
    let logger = CapturingLogger::new();
    let engine = engine(provider.clone(), config).with_logger(logger.clone());

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(["a", "b"]),
            &CancellationToken::new(),
        )
        .await;

    assert!(!result.success);
    assert_eq!(provider.calls(), 3);
    assert_eq!(result.stats.batches_failed, 1);
    assert_eq!(result.embedded_count(), 0);
    assert_eq!(logger.count(Level::Warn), 2);
    assert!(logger.contains("Failure budget exceeded"));
}

#[tokio::test]
async fn test_failed_batch_under_budget_still_succeeds() {
    let provider = PoisonedProvider::new(["bad"]);
    let engine = engine(provider, test_config(1, 2));

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(["good", "bad"]),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.success);
    assert_eq!(result.batch_count, 2);
    assert_eq!(result.stats.batches_failed, 1);
    assert!(result.embedding_for("good").unwrap().is_embedded());
    assert!(!result.embedding_for("bad").unwrap().is_embedded());
}

#[tokio::test]
async fn test_panicking_batch_counts_as_failure() {
    let provider = PanickingProvider::new("boom");
    let logger = CapturingLogger::new();
    let engine = engine(provider, test_config(1, 1)).with_logger(logger.clone());

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(["ok", "boom"]),
            &CancellationToken::new(),
        )
        .await;

    assert!(result.success);
    assert!(result.error.is_none());
    assert_eq!(result.batch_count, 2);
    assert_eq!(result.stats.batches_succeeded, 1);
    assert_eq!(result.stats.batches_failed, 1);
    assert_eq!(result.embedding_for("ok").unwrap().embedding, vector_for("ok"));
    assert!(!result.embedding_for("boom").unwrap().is_embedded());
    assert_eq!(logger.count(Level::Error), 1);
}

#[tokio::test]
async fn test_cancel_after_last_batch_keeps_run_successful() {
    let cancel = CancellationToken::new();
    let provider = CancellingProvider::new(cancel.clone());
    let engine = engine(provider, test_config(4, 1));

    let result = engine
        .generate_embeddings(EmbeddingsRequest::new("m").with_content(["a", "b"]), &cancel)
        .await;

    assert!(cancel.is_cancelled());
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.batch_count, 1);
    assert_eq!(result.stats.batches_skipped, 0);
    assert_eq!(result.embedded_count(), 2);
}

#[tokio::test]
async fn test_events_describe_the_run() {
    let provider = FlakyProvider::new(1);
    let engine = engine(provider, test_config(2, 1));
    let (tx, mut rx) = mpsc::channel(64);

    let result = engine
        .generate_embeddings_with_events(
            EmbeddingsRequest::new("m").with_content(letters(3)),
            &CancellationToken::new(),
            tx,
        )
        .await;
    assert!(result.success);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(
        events.first(),
        Some(&EngineEvent::Started {
            run_id: result.run_id,
            batch_count: 2,
            item_count: 3,
        })
    );
    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::BatchRetrying { batch: 0, attempt: 1, max_attempts: 3, .. }
    )));
    let completed = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::BatchCompleted { .. }))
        .count();
    assert_eq!(completed, 2);
    assert_eq!(
        events.last(),
        Some(&EngineEvent::Completed {
            run_id: result.run_id,
            success: true,
            batch_count: 2,
        })
    );
}

#[tokio::test]
async fn test_dropped_event_receiver_does_not_affect_run() {
    let provider = DeterministicProvider::new();
    let engine = engine(provider, test_config(1, 2));
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = engine
        .generate_embeddings_with_events(
            EmbeddingsRequest::new("m").with_content(letters(4)),
            &CancellationToken::new(),
            tx,
        )
        .await;

    assert!(result.success);
    assert_eq!(result.embedded_count(), 4);
}

#[tokio::test]
async fn test_result_serializes_as_json() {
    let provider = DeterministicProvider::new();
    let engine = engine(provider, EngineConfig::default());

    let result = engine
        .generate_embeddings(
            EmbeddingsRequest::new("m").with_content(["a"]),
            &CancellationToken::new(),
        )
        .await;

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["batch_count"], 1);
    assert!(json.get("error").is_none());
    assert_eq!(json["content_embeddings"][0]["content"], "a");
}
