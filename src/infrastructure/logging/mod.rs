//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty log formatting
//! - Rolling file output
//! - `Logger` port adapter forwarding engine diagnostics to tracing

pub mod config;
pub mod logger;
pub mod tracing_logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use tracing_logger::TracingLogger;
