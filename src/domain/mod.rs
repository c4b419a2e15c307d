//! Domain layer for the cellvec embeddings engine
//!
//! This module contains the data model, error types and the ports that
//! provider adapters and log sinks implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigError, DomainResult, EngineError, ErrorInfo};
