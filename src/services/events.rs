//! Non-blocking fan-out of [`EngineEvent`]s to an optional listener.

use tokio::sync::mpsc;

use crate::domain::models::EngineEvent;

/// Sends engine events without ever blocking a run.
///
/// Events are dropped when no listener is attached, the channel is full, or
/// the receiver has been dropped.
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    tx: Option<mpsc::Sender<EngineEvent>>,
}

impl EventEmitter {
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    pub const fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.tx {
            if let Err(err) = tx.try_send(event) {
                tracing::trace!(error = %err, "engine event dropped");
            }
        }
    }
}
