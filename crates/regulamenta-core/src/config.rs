//! Pipeline configuration shared by every batch job.
//!
//! Loaded from an optional JSON file; every field has a default so an empty
//! object (or no file at all) is a valid configuration. The CLI layers flag
//! and environment overrides on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decree::DecreePattern;
use crate::law::Law;
use crate::snippet::{SnippetOptions, SnippetStrategy};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the `<LAW>/` trees.
    pub root: PathBuf,
    pub laws: Vec<Law>,
    /// Minimum text-block coverage for a PDF's embedded text to be trusted.
    pub min_text_coverage: f64,
    /// Tesseract language model.
    pub ocr_language: String,
    pub ocr_dpi: u32,
    pub snippet_window: usize,
    pub snippet_keyword: String,
    pub snippet_strategy: SnippetStrategy,
    pub decree_pattern: DecreePattern,
    /// Pause between outbound requests.
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            laws: Law::ALL.to_vec(),
            min_text_coverage: 0.1,
            ocr_language: "por".to_string(),
            ocr_dpi: 300,
            snippet_window: 300,
            snippet_keyword: "decreto".to_string(),
            snippet_strategy: SnippetStrategy::default(),
            decree_pattern: DecreePattern::default(),
            request_delay_ms: 1000,
            request_timeout_secs: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_text_coverage) {
            return Err(ConfigError::Invalid(format!(
                "min_text_coverage must be within [0, 1], got {}",
                self.min_text_coverage
            )));
        }
        if self.snippet_window == 0 {
            return Err(ConfigError::Invalid("snippet_window must be positive".into()));
        }
        if self.ocr_dpi == 0 {
            return Err(ConfigError::Invalid("ocr_dpi must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".into()));
        }
        if self.laws.is_empty() {
            return Err(ConfigError::Invalid("at least one law is required".into()));
        }
        Ok(())
    }

    pub fn snippet_options(&self) -> SnippetOptions {
        SnippetOptions {
            window: self.snippet_window,
            keyword: self.snippet_keyword.clone(),
            strategy: self.snippet_strategy,
        }
    }
}
