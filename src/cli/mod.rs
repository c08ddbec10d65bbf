//! Command-line parsing for the `ine` binary.
//!
//! Argument parsing and command dispatch stay separate from the reshaping code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::DataKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ine", version, about = "Fetch and reshape Statistics Portugal (INE) indicators")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Request timeout in seconds (overrides INE_TIMEOUT_SECS).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Response language (overrides INE_LANG).
    #[arg(long, global = true)]
    pub lang: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build an indicator table, print a summary, and optionally export it.
    Fetch(FetchArgs),
    /// Print one raw (classified) INE payload as JSON.
    Request(RequestArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// Indicator code (e.g. 0006341). Optional when both payload files are given.
    pub code: Option<String>,

    /// Dimension filter, e.g. `-d Dim3=1` or `-d 3=1`. Repeatable.
    #[arg(short = 'd', long = "dim", value_name = "DIM=CODE")]
    pub dims: Vec<String>,

    /// Use a saved data payload instead of fetching it.
    #[arg(long, value_name = "JSON")]
    pub data_file: Option<PathBuf>,

    /// Use a saved metadata payload instead of fetching it.
    #[arg(long, value_name = "JSON")]
    pub metadata_file: Option<PathBuf>,

    /// Export metadata + flat records to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export flat records to CSV.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Periods shown in the terminal preview.
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct RequestArgs {
    /// Indicator code (e.g. 0006341).
    pub code: String,

    /// Which endpoint to query.
    #[arg(long, value_enum, default_value_t = DataKind::Data)]
    pub kind: DataKind,

    /// Dimension filter, e.g. `-d Dim3=1`. Ignored for metadata.
    #[arg(short = 'd', long = "dim", value_name = "DIM=CODE")]
    pub dims: Vec<String>,
}
