//! Stable partitioning of the worklist into provider batches.

use crate::domain::models::Batch;

/// Splits a worklist into ordered groups of at most `batch_size` items.
#[derive(Debug, Clone, Copy)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    /// Create a batcher. A `batch_size` of 0 is treated as 1.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `items` worklist entries produce.
    pub const fn batch_count(&self, items: usize) -> usize {
        items.div_ceil(self.batch_size)
    }

    /// Partition the worklist. Item and batch order follow the worklist.
    pub fn partition(&self, worklist: &[String]) -> Vec<Batch> {
        worklist
            .chunks(self.batch_size)
            .enumerate()
            .map(|(index, items)| Batch {
                index,
                items: items.to_vec(),
            })
            .collect()
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self::new(16)
    }
}
