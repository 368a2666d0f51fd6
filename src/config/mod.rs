//! Configuration
//!
//! `config.toml` under `~/.remedy-check/`, then environment overrides applied
//! by the binary at startup. Library components only ever see the resulting
//! values; nothing below `main` reads the process environment.

pub mod schema;

pub use schema::{ApiConfig, Config, IngestConfig, ProgressConfig, RetryConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::RetryPolicy;
use crate::ingest::FileIngestor;

pub const API_KEY_ENV: &str = "REMEDY_CHECK_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "REMEDY_CHECK_MODEL";
pub const BASE_URL_ENV: &str = "REMEDY_CHECK_BASE_URL";

/// `~/.remedy-check/config.toml`, if a home directory can be resolved.
pub fn default_config_path() -> Option<PathBuf> {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".remedy-check").join("config.toml"))
}

impl Config {
    /// Load from `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).to_string()),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse config TOML")
    }

    /// Apply environment-style overrides through `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_ENV).or_else(|| get(FALLBACK_API_KEY_ENV)) {
            self.api.api_key = Some(key);
        }
        if let Some(model) = get(MODEL_ENV) {
            self.api.model = model;
        }
        if let Some(url) = get(BASE_URL_ENV) {
            self.api.base_url = url;
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_millis(self.retry.base_delay_ms),
        )
    }

    pub fn ingestor(&self) -> FileIngestor {
        FileIngestor::new(self.ingest.max_file_bytes)
    }

    pub fn progress_tick(&self) -> Duration {
        Duration::from_millis(self.progress.tick_ms.max(1))
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(key) = copy.api.api_key.as_mut() {
            *key = "***".to_string();
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// JSON schema of the config file.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        serde_json::to_string_pretty(&schema).context("Failed to serialize config schema")
    }
}
