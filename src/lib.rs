pub mod config;
pub mod leaderboard;
pub mod model;
pub mod search;
pub mod service;
pub mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use leaderboard::bar_percent;
use service::{HttpSuggestionService, InMemoryService, SuggestionService};
use ui::render::{bar, format_count};

const DEFAULT_LOG_FILTER: &str = "typeahead=info";
const CLI_BAR_WIDTH: usize = 24;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "typeahead",
    version,
    about = "Debounced incremental search over a ranked term suggestion service"
)]
pub struct Cli {
    /// Config file (defaults to typeahead.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suggestion service base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Quiet period before a suggestion request, in milliseconds
    #[arg(long, global = true)]
    pub debounce_ms: Option<u64>,

    /// Use the built-in in-memory term store instead of the HTTP service
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Print machine-readable JSON (one-shot commands)
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch interactive TUI
    Tui {
        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Print ranked suggestions for a prefix
    Suggest {
        prefix: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Record one use of a term
    Submit { term: String },
    /// Print the most used terms
    Top {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Seed the service with sample terms
    Init,
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "typeahead", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            return Ok(());
        }
        _ => {}
    }

    let config = resolve_config(&cli)?;
    let interactive = matches!(cli.command, Commands::Tui { .. });
    let _log_guard = init_tracing(interactive, &config)?;

    if cli.offline {
        tracing::debug!("using in-memory term store");
        dispatch(Arc::new(InMemoryService::seeded()), &cli, &config).await
    } else {
        let service = HttpSuggestionService::from_config(&config)
            .with_context(|| format!("invalid api url {}", config.api_url))?;
        dispatch(Arc::new(service), &cli, &config).await
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(ms) = cli.debounce_ms {
        config.debounce_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

/// TUI sessions log to a daily file so the alternate screen stays clean;
/// everything else logs to stderr.
fn init_tracing(interactive: bool, config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if interactive {
        let dir = config.log_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating log dir {}", dir.display()))?;
        let appender = tracing_appender::rolling::daily(&dir, "typeahead.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(None)
    }
}

async fn dispatch<S: SuggestionService>(
    service: Arc<S>,
    cli: &Cli,
    config: &AppConfig,
) -> Result<()> {
    match &cli.command {
        Commands::Tui { once } => ui::tui::run_tui(service, config, *once).await,
        Commands::Suggest { prefix, limit } => {
            let limit = limit.unwrap_or(config.suggest_limit);
            let resp = service
                .suggest(prefix, limit)
                .await
                .with_context(|| format!("fetching suggestions for {prefix:?}"))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            if resp.suggestions.is_empty() {
                println!("{}", format!("No results for \"{}\"", resp.prefix).dimmed());
                return Ok(());
            }
            println!(
                "{} {}",
                format!("{} suggestions for \"{}\"", resp.suggestions.len(), resp.prefix).bold(),
                format!("({}ms)", resp.execution_time_ms).dimmed()
            );
            for (i, item) in resp.suggestions.iter().enumerate() {
                println!(
                    "{:>3}. {}  {}",
                    i + 1,
                    item.term.cyan(),
                    format!("{} searches", format_count(item.frequency)).dimmed()
                );
            }
            Ok(())
        }
        Commands::Submit { term } => {
            let record = service
                .submit(term)
                .await
                .with_context(|| format!("recording use of {term:?}"))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!(
                    "{} {} (used {} times)",
                    "Recorded".green(),
                    record.term.bold(),
                    format_count(record.frequency)
                );
            }
            Ok(())
        }
        Commands::Top { limit } => {
            let limit = limit.unwrap_or(config.top_limit);
            let entries = service.top(limit).await.context("fetching popular terms")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("{}", "No terms ranked yet".dimmed());
                return Ok(());
            }
            let term_width = entries.iter().map(|e| e.term.chars().count()).max().unwrap_or(0);
            for (i, entry) in entries.iter().enumerate() {
                let pct = bar_percent(&entries, i).unwrap_or(0.0);
                println!(
                    "{:>3} {:<term_width$}  {:>9}  {}",
                    format!("#{}", i + 1),
                    entry.term,
                    format_count(entry.frequency),
                    bar(pct, CLI_BAR_WIDTH).yellow()
                );
            }
            Ok(())
        }
        Commands::Init => {
            let message = service.init().await.context("seeding sample data")?;
            if cli.json {
                println!("{}", serde_json::json!({ "message": message }));
            } else {
                println!("{}", message.green());
            }
            Ok(())
        }
        Commands::Completions { .. } | Commands::Man => Ok(()),
    }
}
