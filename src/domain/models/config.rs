use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::errors::ConfigError;

/// Main configuration structure for cellvec
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Model used when a request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_model() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Batching, concurrency, retry and failure budget settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Maximum items per provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum batches in flight at once
    #[serde(default = "default_max_parallel_tasks")]
    pub max_parallel_tasks: usize,

    /// Attempts per batch before it counts as failed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Failed batches tolerated before the run is marked failed
    #[serde(default = "default_max_failures")]
    pub max_failures: usize,

    /// Per provider call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay before the first retry (0 retries immediately), doubled per attempt
    #[serde(default)]
    pub retry_backoff_ms: u64,

    /// Upper bound for the retry delay
    #[serde(default = "default_max_retry_backoff_ms")]
    pub max_retry_backoff_ms: u64,

    /// Skip batches that have not started once the failure budget is exceeded
    #[serde(default)]
    pub cancel_pending_on_budget_exceeded: bool,
}

const fn default_batch_size() -> usize {
    16
}

const fn default_max_parallel_tasks() -> usize {
    16
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_max_failures() -> usize {
    3
}

const fn default_timeout_ms() -> u64 {
    300_000
}

const fn default_max_retry_backoff_ms() -> u64 {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_parallel_tasks: default_max_parallel_tasks(),
            max_retries: default_max_retries(),
            max_failures: default_max_failures(),
            timeout_ms: default_timeout_ms(),
            retry_backoff_ms: 0,
            max_retry_backoff_ms: default_max_retry_backoff_ms(),
            cancel_pending_on_budget_exceeded: false,
        }
    }
}

impl EngineConfig {
    /// Check every bound; all counts and the timeout must be at least 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.max_parallel_tasks == 0 {
            return Err(ConfigError::InvalidMaxParallelTasks(self.max_parallel_tasks));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(self.max_retries));
        }
        if self.max_failures == 0 {
            return Err(ConfigError::InvalidMaxFailures(self.max_failures));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(self.timeout_ms));
        }
        if self.retry_backoff_ms > self.max_retry_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                self.retry_backoff_ms,
                self.max_retry_backoff_ms,
            ));
        }
        Ok(())
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
