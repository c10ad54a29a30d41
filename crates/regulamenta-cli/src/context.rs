//! State shared by one batch run.

use std::time::Duration;

use anyhow::{Context, bail};
use regulamenta_core::{Law, PipelineConfig};
use regulamenta_fetch::{DocumentFetcher, FetchConfig};
use regulamenta_store::Layout;
use tracing::debug;

/// Created when a subcommand starts and dropped when it ends; owns the
/// configuration, the data layout and the HTTP session.
pub struct RunContext {
    pub config: PipelineConfig,
    pub layout: Layout,
    pub fetcher: DocumentFetcher,
}

impl RunContext {
    pub fn new(config: PipelineConfig) -> anyhow::Result<Self> {
        if !config.root.is_dir() {
            bail!("data root {} is not a directory", config.root.display());
        }
        let fetcher = DocumentFetcher::new(&FetchConfig {
            user_agent: config.user_agent.clone(),
            delay: Duration::from_millis(config.request_delay_ms),
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
        .context("building HTTP client")?;
        debug!(root = %config.root.display(), laws = config.laws.len(), "run context ready");
        Ok(Self {
            layout: Layout::new(config.root.clone()),
            config,
            fetcher,
        })
    }

    pub fn laws(&self) -> &[Law] {
        &self.config.laws
    }
}

#[cfg(test)]
pub(crate) fn test_context(root: &std::path::Path) -> RunContext {
    let config = PipelineConfig {
        root: root.to_path_buf(),
        request_delay_ms: 0,
        ..PipelineConfig::default()
    };
    RunContext::new(config).unwrap()
}
