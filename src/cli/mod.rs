//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod score;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Lendscore - Collateral risk scoring for lending pool assets.
#[derive(Parser, Debug)]
#[command(name = "lendscore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a pool from a recorded JSON snapshot
    Score(ScoreArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `lendscore check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(default_value = "config.toml")]
    pub config: PathBuf,
}

/// Output format for `score`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Letter grades as a table
    #[default]
    Table,
    /// Full numeric scores as JSON
    Json,
    /// Letter grades as JSON
    Grades,
}

/// Arguments for the `score` subcommand.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pool snapshot to score
    pub snapshot: PathBuf,

    /// Fetch metrics and prices from the configured providers; the
    /// snapshot then supplies only the pool listing
    #[arg(long)]
    pub live: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}
