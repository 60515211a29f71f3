use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::language::{CompileConfig, FileExtension, Language, RunConfig};
use crate::types::JudgeLimits;

pub mod language;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../gavel.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid characters in file extension")]
    InvalidFileExtChars,

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("language '{0}' not found in configuration")]
    LanguageNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for Gavel
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory under which per-job workspaces are created.
    /// Falls back to `<system temp dir>/gavel` when unset.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,

    /// Wall-clock limit for the compile step in milliseconds.
    #[serde(default = "default_compile_time_limit_ms")]
    pub compile_time_limit_ms: u64,

    /// Per-stream cap on captured stdout/stderr in kilobytes.
    #[serde(default = "default_output_cap_kb")]
    pub output_cap_kb: u64,

    /// Limits applied when a submission does not specify its own.
    #[serde(default)]
    pub default_limits: JudgeLimits,

    /// Language configurations keyed by language ID
    #[serde(default)]
    pub languages: HashMap<String, Language>,
}

impl Config {
    /// Create a new config with embedded default languages
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty config with no languages
    pub fn empty() -> Self {
        Self {
            workspace_root: None,
            compile_time_limit_ms: default_compile_time_limit_ms(),
            output_cap_kb: default_output_cap_kb(),
            default_limits: JudgeLimits::default(),
            languages: HashMap::new(),
        }
    }

    /// Get a language by ID
    pub fn get_language(&self, id: &str) -> Result<&Language, ConfigError> {
        self.languages
            .get(id)
            .ok_or_else(|| ConfigError::LanguageNotFound(id.to_string()))
    }

    /// Get the directory job workspaces are created under
    pub fn workspace_root(&self) -> PathBuf {
        self.workspace_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("gavel"))
    }

    /// Get the per-stream output cap in bytes
    pub fn output_cap_bytes(&self) -> u64 {
        self.output_cap_kb.saturating_mul(1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_compile_time_limit_ms() -> u64 {
    30_000
}

fn default_output_cap_kb() -> u64 {
    1024
}
