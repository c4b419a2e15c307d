//! Implementation of the `cellvec config` commands.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::types::ConfigCommands;
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    #[serde(flatten)]
    pub config: Config,
}

impl ConfigShowOutput {
    fn settings(&self) -> Vec<(String, String)> {
        let engine = &self.config.engine;
        let logging = &self.config.logging;
        vec![
            ("default_model".into(), self.config.default_model.clone()),
            ("engine.batch_size".into(), engine.batch_size.to_string()),
            ("engine.max_parallel_tasks".into(), engine.max_parallel_tasks.to_string()),
            ("engine.max_retries".into(), engine.max_retries.to_string()),
            ("engine.max_failures".into(), engine.max_failures.to_string()),
            ("engine.timeout_ms".into(), engine.timeout_ms.to_string()),
            ("engine.retry_backoff_ms".into(), engine.retry_backoff_ms.to_string()),
            ("engine.max_retry_backoff_ms".into(), engine.max_retry_backoff_ms.to_string()),
            (
                "engine.cancel_pending_on_budget_exceeded".into(),
                engine.cancel_pending_on_budget_exceeded.to_string(),
            ),
            ("logging.level".into(), logging.level.clone()),
            ("logging.format".into(), logging.format.clone()),
            (
                "logging.log_dir".into(),
                logging
                    .log_dir
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |dir| dir.display().to_string()),
            ),
        ]
    }
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        TableFormatter::new().format_settings(&self.settings())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigValidateOutput {
    pub valid: bool,
    pub message: String,
}

impl CommandOutput for ConfigValidateOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run a config subcommand against an already loaded and validated config.
pub fn execute(command: &ConfigCommands, config: Config, json_mode: bool) -> Result<()> {
    match command {
        ConfigCommands::Show { yaml: true } if !json_mode => {
            let rendered = serde_yaml::to_string(&config).context("Failed to render config as YAML")?;
            print!("{rendered}");
        }
        ConfigCommands::Show { .. } => output(&ConfigShowOutput { config }, json_mode),
        ConfigCommands::Validate => output(
            &ConfigValidateOutput {
                valid: true,
                message: format!(
                    "Configuration is valid (batch_size {}, max_parallel_tasks {}, max_failures {})",
                    config.engine.batch_size,
                    config.engine.max_parallel_tasks,
                    config.engine.max_failures
                ),
            },
            json_mode,
        ),
    }
    Ok(())
}
