//! CLI command implementations.

pub mod config;
pub mod plan;
pub mod run;

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

use crate::domain::models::EmbeddingsRequest;

/// Read a JSON request file, filling in `default_model` when the request names none.
pub async fn load_request(path: &Path, default_model: &str) -> Result<EmbeddingsRequest> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read request file {}", path.display()))?;
    let mut request: EmbeddingsRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse request file {}", path.display()))?;

    if request.model.trim().is_empty() {
        request.model = default_model.to_string();
    }
    Ok(request)
}
