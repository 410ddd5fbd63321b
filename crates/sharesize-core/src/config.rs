//! Traversal configuration types.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for a traversal run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TraversalConfig {
    /// Root folder path to traverse, relative to the drive.
    pub root: String,

    /// Maximum number of folders being listed at the same time.
    #[builder(default = "8")]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Attempts per page fetch before giving up.
    #[builder(default = "4")]
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff delay after the first failed attempt, in milliseconds.
    #[builder(default = "500")]
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay, in milliseconds.
    #[builder(default = "30_000")]
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Number of largest files to keep.
    #[builder(default = "10")]
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Skip system folders and files (`_` prefix, `Forms`).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub exclude_system: bool,
}

fn default_concurrency() -> usize {
    8
}

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_top_n() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl TraversalConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.root.is_none() {
            return Err("Root path is required".to_string());
        }
        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }
        if self.max_attempts == Some(0) {
            return Err("Max attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

impl TraversalConfig {
    /// Create a new traversal config builder.
    pub fn builder() -> TraversalConfigBuilder {
        TraversalConfigBuilder::default()
    }

    /// Create a config with defaults for the given root.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            top_n: default_top_n(),
            exclude_system: true,
        }
    }

    /// Backoff delay after the first failed attempt.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Upper bound on a single backoff delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Check whether an entry with this name is excluded from traversal.
    pub fn should_skip(&self, name: &str) -> bool {
        self.exclude_system && crate::entry::is_system_name(name)
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self::new("")
    }
}
