//! Arena representation of a semantic cell forest.
//!
//! The nested `Vec<SemanticCell>` handed in by the caller is flattened into an
//! arena with stable [`CellId`] and [`ChunkId`] handles. Merging writes vectors
//! through chunk handles found in a content index, so no tree walk is needed
//! per batch. [`SemanticForest::into_cells`] rebuilds the exact original
//! topology.

use std::collections::HashMap;

use super::semantic::{SemanticCell, SemanticChunk};

/// Handle to a cell in a [`SemanticForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(usize);

/// Handle to a chunk in a [`SemanticForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

#[derive(Debug, Clone)]
struct CellNode {
    id: Option<String>,
    chunks: Vec<ChunkId>,
    children: Vec<CellId>,
}

/// Arena holding every cell and chunk of a forest.
///
/// Chunks are stored in depth-first order: a cell's own chunks come before
/// the chunks of its children.
#[derive(Debug, Clone, Default)]
pub struct SemanticForest {
    roots: Vec<CellId>,
    cells: Vec<CellNode>,
    chunks: Vec<SemanticChunk>,
}

impl SemanticForest {
    /// Flatten a nested forest into an arena.
    pub fn from_cells(cells: Vec<SemanticCell>) -> Self {
        let mut forest = Self::default();
        for cell in cells {
            let id = forest.insert_cell(cell);
            forest.roots.push(id);
        }
        forest
    }

    fn insert_cell(&mut self, cell: SemanticCell) -> CellId {
        let id = CellId(self.cells.len());
        self.cells.push(CellNode {
            id: cell.id,
            chunks: Vec::with_capacity(cell.chunks.len()),
            children: Vec::with_capacity(cell.children.len()),
        });

        let mut chunk_ids = Vec::with_capacity(cell.chunks.len());
        for chunk in cell.chunks {
            chunk_ids.push(ChunkId(self.chunks.len()));
            self.chunks.push(chunk);
        }

        let child_ids: Vec<CellId> = cell
            .children
            .into_iter()
            .map(|child| self.insert_cell(child))
            .collect();

        let node = &mut self.cells[id.0];
        node.chunks = chunk_ids;
        node.children = child_ids;
        id
    }

    /// Rebuild the nested forest, preserving the original topology and order.
    pub fn into_cells(self) -> Vec<SemanticCell> {
        let Self {
            roots,
            mut cells,
            chunks,
        } = self;
        let mut slots: Vec<Option<SemanticChunk>> = chunks.into_iter().map(Some).collect();
        roots
            .into_iter()
            .map(|root| Self::build_cell(root, &mut cells, &mut slots))
            .collect()
    }

    fn build_cell(
        id: CellId,
        cells: &mut [CellNode],
        slots: &mut [Option<SemanticChunk>],
    ) -> SemanticCell {
        let node = &mut cells[id.0];
        let cell_id = node.id.take();
        let chunk_ids = std::mem::take(&mut node.chunks);
        let child_ids = std::mem::take(&mut node.children);

        SemanticCell {
            id: cell_id,
            chunks: chunk_ids
                .into_iter()
                .filter_map(|chunk| slots[chunk.0].take())
                .collect(),
            children: child_ids
                .into_iter()
                .map(|child| Self::build_cell(child, cells, slots))
                .collect(),
        }
    }

    /// Iterate chunks in depth-first order.
    pub fn chunks(&self) -> impl Iterator<Item = (ChunkId, &SemanticChunk)> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| (ChunkId(index), chunk))
    }

    /// Look up a chunk for writing.
    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut SemanticChunk> {
        self.chunks.get_mut(id.0)
    }

    /// Build the `content -> chunks` side index used by the merge step.
    pub fn content_index(&self) -> HashMap<String, Vec<ChunkId>> {
        let mut index: HashMap<String, Vec<ChunkId>> = HashMap::new();
        for (id, chunk) in self.chunks() {
            index.entry(chunk.content.clone()).or_default().push(id);
        }
        index
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
