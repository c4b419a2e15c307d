//! Result merging: writes batch vectors into the flat list and the forest.
//!
//! Matching is by exact content equality. Both targets are indexed once at
//! construction, so a merge costs one hash lookup per returned entry.

use std::collections::HashMap;

use crate::domain::models::{ChunkId, ContentEmbedding, SemanticForest};

/// Counters for one merge call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Returned entries that matched at least one target.
    pub matched: usize,
    /// Returned entries with no matching content anywhere.
    pub unmatched: usize,
    /// Flat list entries written.
    pub contents_updated: usize,
    /// Forest chunks written.
    pub chunks_updated: usize,
}

/// Owns the merge targets for one run.
#[derive(Debug, Clone)]
pub struct ResultMerger {
    forest: SemanticForest,
    chunk_index: HashMap<String, Vec<ChunkId>>,
    content_embeddings: Vec<ContentEmbedding>,
    content_index: HashMap<String, usize>,
}

impl ResultMerger {
    /// Build merge targets: one pending flat entry per worklist item plus the forest.
    pub fn new(worklist: &[String], forest: SemanticForest) -> Self {
        let chunk_index = forest.content_index();
        let content_embeddings: Vec<ContentEmbedding> = worklist
            .iter()
            .map(|content| ContentEmbedding::pending(content.clone()))
            .collect();
        let mut content_index = HashMap::with_capacity(content_embeddings.len());
        for (position, entry) in content_embeddings.iter().enumerate() {
            content_index.entry(entry.content.clone()).or_insert(position);
        }

        Self {
            forest,
            chunk_index,
            content_embeddings,
            content_index,
        }
    }

    /// Write every returned vector into all matching flat entries and chunks.
    ///
    /// Vectors are assigned, never appended, so merging the same result twice
    /// leaves the targets unchanged.
    pub fn merge(&mut self, embeddings: &[ContentEmbedding]) -> MergeStats {
        let mut stats = MergeStats::default();

        for returned in embeddings {
            let mut hit = false;

            if let Some(&position) = self.content_index.get(&returned.content) {
                self.content_embeddings[position]
                    .embedding
                    .clone_from(&returned.embedding);
                stats.contents_updated += 1;
                hit = true;
            }

            if let Some(chunk_ids) = self.chunk_index.get(&returned.content) {
                for &id in chunk_ids {
                    if let Some(chunk) = self.forest.chunk_mut(id) {
                        chunk.embedding.clone_from(&returned.embedding);
                        stats.chunks_updated += 1;
                        hit = true;
                    }
                }
            }

            if hit {
                stats.matched += 1;
            } else {
                stats.unmatched += 1;
            }
        }

        stats
    }

    pub fn content_embeddings(&self) -> &[ContentEmbedding] {
        &self.content_embeddings
    }

    pub const fn forest(&self) -> &SemanticForest {
        &self.forest
    }

    /// Release the merge targets.
    pub fn into_parts(self) -> (SemanticForest, Vec<ContentEmbedding>) {
        (self.forest, self.content_embeddings)
    }
}
