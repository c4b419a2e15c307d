//! Progress bar for engine runs, driven by [`EngineEvent`]s.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::domain::models::EngineEvent;

const PROGRESS_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} batches {msg} (ETA: {eta})";
const PROGRESS_CHARS: &str = "█▓▒░ ";

/// Create a batch progress bar; hidden when `visible` is false.
pub fn create_batch_progress(total: u64, visible: bool) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(
        Some(total),
        if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        },
    );
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars(PROGRESS_CHARS));
    pb.set_style(style);
    if visible {
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb
}

/// Drain engine events into `pb` until the sender side closes.
///
/// The bar length is taken from the `Started` event; batches advance it on
/// completion or failure.
pub async fn track_events(mut events: mpsc::Receiver<EngineEvent>, pb: ProgressBar) -> ProgressBar {
    let mut failed = 0usize;
    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::Started { batch_count, .. } => {
                pb.set_length(batch_count as u64);
            }
            EngineEvent::BatchRetrying {
                batch,
                attempt,
                max_attempts,
                ..
            } => {
                pb.set_message(format!("retrying batch {batch} ({attempt}/{max_attempts})"));
            }
            EngineEvent::BatchCompleted { .. } => pb.inc(1),
            EngineEvent::BatchFailed { .. } => {
                failed += 1;
                pb.set_message(format!("{failed} failed"));
                pb.inc(1);
            }
            EngineEvent::BudgetExceeded {
                failed,
                max_failures,
            } => {
                pb.set_message(format!("failure budget exceeded ({failed}/{max_failures})"));
            }
            EngineEvent::Completed { success, .. } => {
                if success {
                    pb.finish_with_message("done");
                } else {
                    pb.abandon_with_message("failed");
                }
            }
            EngineEvent::BatchDispatched { .. } => {}
        }
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_track_events_advances_per_finished_batch() {
        let (tx, rx) = mpsc::channel(16);
        let pb = create_batch_progress(0, false);
        let run_id = Uuid::new_v4();

        for event in [
            EngineEvent::Started {
                run_id,
                batch_count: 3,
                item_count: 5,
            },
            EngineEvent::BatchDispatched { batch: 0, items: 2 },
            EngineEvent::BatchCompleted {
                batch: 0,
                attempts: 1,
                matched: 2,
            },
            EngineEvent::BatchFailed {
                batch: 1,
                attempts: 3,
                error: "boom".to_string(),
            },
            EngineEvent::Completed {
                run_id,
                success: false,
                batch_count: 2,
            },
        ] {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let pb = track_events(rx, pb).await;
        assert_eq!(pb.length(), Some(3));
        assert_eq!(pb.position(), 2);
        assert!(pb.is_finished());
    }
}
