//! `Logger` port adapter that forwards to `tracing`.

use crate::domain::ports::{Level, Logger};

/// Forwards engine diagnostics to the global tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub const fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Trace => tracing::trace!(target: "cellvec::engine", "{message}"),
            Level::Debug => tracing::debug!(target: "cellvec::engine", "{message}"),
            Level::Info => tracing::info!(target: "cellvec::engine", "{message}"),
            Level::Warn => tracing::warn!(target: "cellvec::engine", "{message}"),
            Level::Error => tracing::error!(target: "cellvec::engine", "{message}"),
        }
    }
}
