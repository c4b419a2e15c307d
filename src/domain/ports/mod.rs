//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters implement:
//! - EmbeddingProvider: turns a batch of texts into vectors
//! - Logger: receives the engine's diagnostic events
//!
//! The engine depends only on these traits, never on a concrete backend.

pub mod embedding;
pub mod logger;
pub mod null_embedding;

pub use embedding::EmbeddingProvider;
pub use logger::{Level, Logger};
pub use null_embedding::NullEmbeddingProvider;
