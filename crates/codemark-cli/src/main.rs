//! codemark CLI tool.
//!
//! Usage:
//! ```bash
//! codemark review [OPTIONS] [PATH]
//! codemark smart-review [OPTIONS] [PATH]
//! codemark list-rules
//! codemark init
//! ```
//!
//! Exit codes: `0` no outstanding issues, `1` issues found, `2` fatal error.

use anyhow::Result;
use clap::{Parser, Subcommand};
use codemark_core::{Format, Outcome, RunContext};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Reflective code review for Python sources
#[derive(Parser)]
#[command(name = "codemark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "CODEMARK_CONFIG")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in rules and plugins
    Review {
        /// File or directory to review (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "terminal")]
        format: OutputFormat,

        /// Fix what can be fixed and record the outcome on each issue
        #[arg(long)]
        fix: bool,
    },

    /// Run the configured advisory reviewer
    SmartReview {
        /// File or directory to review (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "terminal")]
        format: OutputFormat,
    },

    /// List available rules and plugins
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for review results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Terminal,
    /// JSON array of issues.
    Json,
    /// SARIF 2.1.0 document.
    Sarif,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => Self::Terminal,
            OutputFormat::Json => Self::Json,
            OutputFormat::Sarif => Self::Sarif,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Reports go to stdout; keep logs off it.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(outcome) => exit_code(outcome.exit_code()),
        Err(e) => {
            tracing::error!("{e:#}");
            exit_code(Outcome::FATAL_EXIT_CODE)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let color = !cli.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();

    match cli.command {
        Commands::Review { path, format, fix } => {
            let ctx = RunContext::new("review").with_color(color);
            let config = config_resolver::resolve(&path, cli.config.as_deref()).load()?;
            commands::review::run(&path, format.into(), fix, &config, &ctx)
        }
        Commands::SmartReview { path, format } => {
            let ctx = RunContext::new("smart-review").with_color(color);
            let config = config_resolver::resolve(&path, cli.config.as_deref()).load()?;
            commands::smart_review::run(&path, format.into(), &config, &ctx)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(Outcome::Clean)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(Outcome::Clean)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}
