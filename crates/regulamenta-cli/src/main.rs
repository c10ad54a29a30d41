use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use regulamenta_core::{Law, PipelineConfig, SnippetStrategy};
use tracing_subscriber::EnvFilter;

mod clean;
mod context;
mod download;
mod extract;
mod gazette;
mod identify;
mod report;

use context::RunContext;
use report::Summary;

#[derive(Parser)]
#[command(
    name = "regulamenta",
    version,
    about = "Collects municipal and state regulations of Brazilian transparency laws and locates their decrees"
)]
struct Cli {
    /// JSON pipeline configuration.
    #[arg(long, global = true, env = "REGULAMENTA_CONFIG")]
    config: Option<PathBuf>,

    /// Data root holding the per-law directories.
    #[arg(long, global = true, env = "REGULAMENTA_ROOT")]
    root: Option<PathBuf>,

    /// Restrict the run to these laws (repeatable).
    #[arg(long = "law", global = true)]
    laws: Vec<Law>,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalise the validated survey sheets into identified tables.
    Clean,
    /// Download every linked regulation document.
    Download {
        /// Pause between requests, in milliseconds.
        #[arg(long, env = "REGULAMENTA_DELAY_MS")]
        delay_ms: Option<u64>,
        #[arg(long, env = "REGULAMENTA_USER_AGENT")]
        user_agent: Option<String>,
    },
    /// Convert downloaded documents to plain text, with OCR when needed.
    Extract {
        /// Minimum text-block coverage for trusting embedded PDF text.
        #[arg(long, env = "REGULAMENTA_MIN_COVERAGE")]
        min_coverage: Option<f64>,
        /// Tesseract language.
        #[arg(long, env = "REGULAMENTA_OCR_LANG")]
        ocr_lang: Option<String>,
    },
    /// Locate each listed decree inside the extracted texts.
    Identify {
        /// Snippet width in characters.
        #[arg(long, env = "REGULAMENTA_SNIPPET_WINDOW")]
        window: Option<usize>,
        /// `keyword` or `centered`.
        #[arg(long, env = "REGULAMENTA_SNIPPET_STRATEGY")]
        strategy: Option<SnippetStrategy>,
    },
    /// Search official gazettes for decree numbers.
    Gazettes(gazette::GazetteArgs),
}

impl Command {
    fn apply(&self, config: &mut PipelineConfig) {
        match self {
            Command::Download {
                delay_ms,
                user_agent,
            } => {
                if let Some(ms) = delay_ms {
                    config.request_delay_ms = *ms;
                }
                if let Some(ua) = user_agent {
                    config.user_agent = ua.clone();
                }
            }
            Command::Extract {
                min_coverage,
                ocr_lang,
            } => {
                if let Some(min) = min_coverage {
                    config.min_text_coverage = *min;
                }
                if let Some(lang) = ocr_lang {
                    config.ocr_language = lang.clone();
                }
            }
            Command::Identify { window, strategy } => {
                if let Some(w) = window {
                    config.snippet_window = *w;
                }
                if let Some(s) = strategy {
                    config.snippet_strategy = *s;
                }
            }
            Command::Clean | Command::Gazettes(_) => {}
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if !cli.laws.is_empty() {
        config.laws = cli.laws.clone();
    }
    cli.command.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::info!("regulamenta v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let ctx = RunContext::new(config)?;

    let summary: Summary = match &cli.command {
        Command::Clean => clean::run(&ctx),
        Command::Download { .. } => download::run(&ctx).await,
        Command::Extract { .. } => extract::run(&ctx),
        Command::Identify { .. } => identify::run(&ctx),
        Command::Gazettes(args) => gazette::run(&ctx, args).await?,
    };
    println!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_flags_override_config() {
        let cli = Cli::parse_from([
            "regulamenta",
            "--root",
            "/data",
            "--law",
            "lgpd",
            "identify",
            "--window",
            "120",
            "--strategy",
            "centered",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.laws, vec![Law::Lgpd]);
        assert_eq!(config.snippet_window, 120);
        assert_eq!(config.snippet_strategy, SnippetStrategy::Centered);
    }

    #[test]
    fn tuning_flags_read_environment() {
        use clap::CommandFactory;
        let cmd = Cli::command();
        let expected = [
            ("download", "delay_ms", "REGULAMENTA_DELAY_MS"),
            ("download", "user_agent", "REGULAMENTA_USER_AGENT"),
            ("extract", "min_coverage", "REGULAMENTA_MIN_COVERAGE"),
            ("extract", "ocr_lang", "REGULAMENTA_OCR_LANG"),
            ("identify", "window", "REGULAMENTA_SNIPPET_WINDOW"),
            ("identify", "strategy", "REGULAMENTA_SNIPPET_STRATEGY"),
        ];
        for (sub, id, var) in expected {
            let arg = cmd
                .find_subcommand(sub)
                .and_then(|s| s.get_arguments().find(|a| a.get_id() == id))
                .unwrap_or_else(|| panic!("{sub} --{id} missing"));
            assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(var)), "{sub} --{id}");
        }
    }

    #[test]
    fn out_of_range_coverage_is_rejected() {
        let cli = Cli::parse_from(["regulamenta", "extract", "--min-coverage", "1.5"]);
        assert!(load_config(&cli).is_err());
    }
}
