//! Home Assistant automation converter
//!
//! Main entry point for `ha-convert`.

mod cli;
mod commands;
mod output;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::Cli;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to initialize logging: {}", e);
    }

    if let Some(input) = cli.input.as_deref() {
        if input.is_dir() && !cli.directory {
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!(
                        "{} is a directory; pass -d/--directory to convert it",
                        input.display()
                    ),
                )
                .exit();
        }
    }

    match commands::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
