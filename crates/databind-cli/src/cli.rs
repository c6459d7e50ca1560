//! Command-line arguments of the `databind` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use crate::config::JoinStrategyName;

#[derive(Parser)]
#[command(
    name = "databind",
    version,
    about = "Join configured data sources and print the bound rows",
    long_about = "Load a TOML data configuration, join its sources and bind values.\n\n\
                  Sources may be inline value lists, CSV files or XML files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print one line per bound row.
    Rows(RowsArgs),

    /// Report which member answers each binding.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct RowsArgs {
    /// Path to the data configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Join strategy (overrides the configuration).
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Output layout.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the data configuration.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Combinatorial,
    Sequential,
    Pairwise,
}

impl From<StrategyArg> for JoinStrategyName {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Combinatorial => JoinStrategyName::Combinatorial,
            StrategyArg::Sequential => JoinStrategyName::Sequential,
            StrategyArg::Pairwise => JoinStrategyName::Pairwise,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Plain,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
