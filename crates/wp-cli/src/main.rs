//! Waypoint CLI - versioned SQL change scripts for DuckDB

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, history, mark_executed, status, unknown, upgrade};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let outcome = match &cli.command {
        cli::Commands::Upgrade(args) => upgrade::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::History(args) => history::execute(args, &cli.global),
        cli::Commands::Unknown(args) => unknown::execute(args, &cli.global),
        cli::Commands::MarkExecuted(args) => mark_executed::execute(args, &cli.global),
        cli::Commands::Check(args) => check::execute(args, &cli.global),
    };

    match outcome {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(exit_byte(*code)),
            None => {
                eprintln!("Error: {err:#}");
                std::process::ExitCode::FAILURE
            }
        },
    }
}

fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

/// Route `log` records to stderr, keeping stdout for command output.
///
/// `RUST_LOG` wins over the verbosity flag when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
