//! defparse CLI
//!
//! Reads feature-flag change definitions or change events and prints the
//! parsed record as JSON.

mod cli;
mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use config::Config;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    let output = execute_command(cli.command)?;
    println!("{output}");
    Ok(())
}

fn execute_command(cmd: Commands) -> Result<String> {
    match cmd {
        Commands::Parse {
            file,
            report,
            compact,
        } => {
            let input = commands::read_input(file.as_deref())?;
            commands::run_parse(&input, report, compact)
        }
        Commands::Event {
            file,
            config,
            instance_guid,
            compact,
        } => {
            let config = Config::resolve(config.as_deref(), instance_guid)?;
            let input = commands::read_input(file.as_deref())?;
            commands::run_event(&input, &config.envelope, compact)
        }
    }
}
