//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse feature-flag change definitions into structured JSON
#[derive(Parser, Debug)]
#[command(name = "defparse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Parse definition text into a JSON record
    ///
    /// Examples:
    ///   defparse parse definition.txt
    ///   cat definition.txt | defparse parse --report
    Parse {
        /// Definition file ("-" or omitted reads stdin)
        file: Option<PathBuf>,

        /// Include parse warnings in the output
        #[arg(long)]
        report: bool,

        /// Print compact JSON instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },

    /// Turn a change event into a job-run record
    ///
    /// The input is the event body (an object with a `definition` field),
    /// optionally wrapped as `{"body": ...}`.
    ///
    /// Examples:
    ///   defparse event change.json --instance-guid 1234
    ///   defparse event change.json --config defparse.toml
    Event {
        /// Event file ("-" or omitted reads stdin)
        file: Option<PathBuf>,

        /// TOML file with an [envelope] table
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Instance GUID written into the record
        #[arg(long, env = "INSTANCE_GUID")]
        instance_guid: Option<String>,

        /// Print compact JSON instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },
}
