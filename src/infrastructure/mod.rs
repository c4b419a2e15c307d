//! Infrastructure layer module
//!
//! This module contains the adapters around the engine:
//! - Configuration management (figment)
//! - Logging infrastructure (tracing) and the `Logger` port adapter
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
