//! Implementation of the `cellvec plan` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::load_request;
use crate::cli::output::table::BatchRow;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, EmbeddingsRequest, SemanticForest};
use crate::services::{Batcher, ContentCollector};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Request file (JSON `EmbeddingsRequest`)
    pub request: PathBuf,

    /// Override the configured batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub model: String,
    pub worklist_items: usize,
    pub forest_chunks: usize,
    pub batch_size: usize,
    pub batch_count: usize,
    pub batches: Vec<BatchRow>,
}

impl CommandOutput for PlanOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Model {}: {} distinct item(s) ({} forest chunk(s)) in {} batch(es) of up to {}",
            self.model, self.worklist_items, self.forest_chunks, self.batch_count, self.batch_size
        )];
        if !self.batches.is_empty() {
            lines.push(TableFormatter::new().format_batches(&self.batches));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Collect and batch a request without calling any provider.
pub fn build_plan(
    request: &EmbeddingsRequest,
    batch_size: usize,
) -> Result<PlanOutput> {
    let forest = SemanticForest::from_cells(request.semantic_cell_forest.clone());
    let worklist = ContentCollector::new()
        .collect(&request.content, &forest)
        .context("Request has nothing to embed")?;

    let batcher = Batcher::new(batch_size);
    let batches = batcher
        .partition(&worklist)
        .into_iter()
        .map(|batch| BatchRow {
            index: batch.index,
            items: batch.len(),
            first: batch.items.first().cloned().unwrap_or_default(),
            last: batch.items.last().cloned().unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    Ok(PlanOutput {
        model: request.model.clone(),
        worklist_items: worklist.len(),
        forest_chunks: forest.chunk_count(),
        batch_size: batcher.batch_size(),
        batch_count: batches.len(),
        batches,
    })
}

pub async fn execute(args: PlanArgs, config: &Config, json_mode: bool) -> Result<()> {
    let request = load_request(&args.request, &config.default_model).await?;
    let batch_size = args.batch_size.unwrap_or(config.engine.batch_size);

    let plan = build_plan(&request, batch_size)?;
    output(&plan, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{SemanticCell, SemanticChunk};

    #[test]
    fn test_build_plan_counts_distinct_items() {
        let request = EmbeddingsRequest::new("m")
            .with_content(["a", "b", "a", "  "])
            .with_cells(vec![SemanticCell::new()
                .with_chunk(SemanticChunk::new("b"))
                .with_chunk(SemanticChunk::new("c"))]);

        let plan = build_plan(&request, 2).unwrap();
        assert_eq!(plan.worklist_items, 3);
        assert_eq!(plan.forest_chunks, 2);
        assert_eq!(plan.batch_count, 2);
        assert_eq!(plan.batches[0].first, "a");
        assert_eq!(plan.batches[1].items, 1);
        assert_eq!(plan.batches[1].last, "c");
    }

    #[test]
    fn test_build_plan_rejects_empty_request() {
        let request = EmbeddingsRequest::new("m").with_content(["", " "]);
        let err = build_plan(&request, 4).unwrap_err();
        assert!(err.to_string().contains("nothing to embed"));
    }
}
