//! Content collection: builds the provider worklist from a request.

use std::collections::HashSet;

use crate::domain::errors::{DomainResult, EngineError};
use crate::domain::models::SemanticForest;

/// Flattens explicit content and every chunk of a forest into one worklist.
///
/// Order: explicit content first, then chunks depth-first. Blank and
/// whitespace-only strings are dropped; kept strings are not trimmed. Each
/// distinct string appears once, at its first position.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentCollector;

impl ContentCollector {
    pub const fn new() -> Self {
        Self
    }

    /// Collect the worklist, failing with [`EngineError::NoContent`] if it is empty.
    pub fn collect(&self, content: &[String], forest: &SemanticForest) -> DomainResult<Vec<String>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let worklist: Vec<String> = content
            .iter()
            .map(String::as_str)
            .chain(forest.chunks().map(|(_, chunk)| chunk.content.as_str()))
            .filter(|text| !text.trim().is_empty())
            .filter(|text| seen.insert(*text))
            .map(str::to_owned)
            .collect();

        if worklist.is_empty() {
            return Err(EngineError::NoContent);
        }
        Ok(worklist)
    }
}
