//! Implementation of the `cellvec run` command.

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::load_request;
use crate::cli::output::progress::{create_batch_progress, track_events};
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::ErrorInfo;
use crate::domain::models::{Config, EmbeddingsResult};
use crate::domain::ports::NullEmbeddingProvider;
use crate::services::EmbeddingsEngine;

const EVENT_BUFFER: usize = 256;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Request file (JSON `EmbeddingsRequest`)
    pub request: PathBuf,

    /// Write the full result as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub provider: &'static str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub batch_count: usize,
    pub worklist_items: usize,
    pub embedded: usize,
    pub batches_failed: usize,
    pub batches_skipped: usize,
    pub provider_calls: u32,
    pub duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl RunOutput {
    fn from_result(
        result: &EmbeddingsResult,
        provider: &'static str,
        output_path: Option<PathBuf>,
    ) -> Self {
        Self {
            run_id: result.run_id,
            provider,
            success: result.success,
            error: result.error.clone(),
            batch_count: result.batch_count,
            worklist_items: result.stats.worklist_items,
            embedded: result.embedded_count(),
            batches_failed: result.stats.batches_failed,
            batches_skipped: result.stats.batches_skipped,
            provider_calls: result.stats.provider_calls,
            duration_ms: (result.finished_at - result.started_at).num_milliseconds(),
            output_path,
        }
    }
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let status = if self.success {
            console::style("succeeded").green().bold()
        } else {
            console::style("failed").red().bold()
        };
        let mut lines = vec![
            format!("Run {} {status} ({} ms)", self.run_id, self.duration_ms),
            format!("  Provider:        {}", self.provider),
            format!("  Items:           {}", self.worklist_items),
            format!("  Embedded:        {}", self.embedded),
            format!("  Batches:         {}", self.batch_count),
            format!("  Failed batches:  {}", self.batches_failed),
            format!("  Provider calls:  {}", self.provider_calls),
        ];
        if self.batches_skipped > 0 {
            lines.push(format!("  Skipped batches: {}", self.batches_skipped));
        }
        if let Some(ref error) = self.error {
            lines.push(format!("  Error ({}): {}", error.kind, error.message));
        }
        if let Some(ref path) = self.output_path {
            lines.push(format!("\nResult written to {}", path.display()));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let request = load_request(&args.request, &config.default_model).await?;

    let provider = Arc::new(NullEmbeddingProvider::new());
    let engine = EmbeddingsEngine::new(provider, config.engine.clone())
        .context("Invalid engine configuration")?;

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling run");
                cancel.cancel();
            }
        })
    };

    let show_progress = !json_mode && console::Term::stderr().features().is_attended();
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let progress = track_events(rx, create_batch_progress(0, show_progress));

    let (result, pb) = tokio::join!(
        engine.generate_embeddings_with_events(request, &cancel, tx),
        progress
    );
    ctrl_c.abort();
    pb.finish_and_clear();

    if let Some(ref path) = args.output {
        let body = serde_json::to_vec_pretty(&result).context("Failed to serialize result")?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("Failed to write result to {}", path.display()))?;
    }

    let summary = RunOutput::from_result(&result, engine.provider_name(), args.output);
    output(&summary, json_mode);

    if !result.success {
        let message = result
            .error
            .map_or_else(|| "unknown error".to_string(), |error| error.message);
        bail!("Embedding run failed: {message}");
    }
    Ok(())
}
