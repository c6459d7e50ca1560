//! `databind` command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use databind_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputFormatArg};
use databind_cli::commands::{run_check, run_rows};
use databind_cli::logging::{LogConfig, LogFormat, init_logging};
use databind_cli::render::{RenderOptions, checks_table, rows_plain, rows_table};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let options = RenderOptions {
        styled: use_color(cli.color.color, io::stdout().is_terminal()),
    };
    let exit_code = match cli.command {
        Command::Rows(args) => match run_rows(&args.config, args.strategy.map(Into::into)) {
            Ok(report) => {
                let output = match args.format {
                    OutputFormatArg::Table => rows_table(&report, options),
                    OutputFormatArg::Plain => rows_plain(&report),
                };
                if !output.is_empty() {
                    println!("{output}");
                }
                i32::from(report.failures > 0)
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Check(args) => match run_check(&args.config) {
            Ok(checks) => {
                println!("{}", checks_table(&checks, options));
                i32::from(checks.iter().any(|check| !check.can_bind))
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn use_color(choice: ColorChoice, is_terminal: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_terminal,
    }
}

/// Explicit `--log-level` wins over `-v`/`-q`; `RUST_LOG` applies only when
/// neither is given.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        ..LogConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = use_color(
        cli.color.color,
        cli.log_file.is_none() && io::stderr().is_terminal(),
    );
    config
}
