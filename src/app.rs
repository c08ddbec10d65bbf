//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - resolves client configuration
//! - fetches and reshapes the indicator
//! - prints summaries and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, FetchArgs, RequestArgs};
use crate::config::ClientConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `ine` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Fetch(args) => handle_fetch(&config, &args),
        Command::Request(args) => handle_request(&config, &args),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. in tests) is harmless; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Environment first, then CLI flags on top.
pub fn resolve_config(cli: &Cli) -> Result<ClientConfig, AppError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(secs) = cli.timeout {
        config.timeout = crate::config::parse_timeout(&secs.to_string())?;
    }
    if let Some(lang) = &cli.lang {
        config.lang = lang.trim().to_uppercase();
    }
    Ok(config)
}

fn handle_fetch(config: &ClientConfig, args: &FetchArgs) -> Result<(), AppError> {
    let indicator = pipeline::run_fetch(config, args)?;

    println!("{}", crate::report::format_summary(&indicator));
    println!("{}", crate::report::format_preview(&indicator, args.rows));

    if let Some(path) = &args.export {
        crate::io::export::write_indicator_json(path, &indicator)?;
        tracing::info!(path = %path.display(), "wrote JSON export");
    }
    if let Some(path) = &args.csv {
        crate::io::export::write_records_csv(path, &indicator)?;
        tracing::info!(path = %path.display(), "wrote CSV export");
    }

    Ok(())
}

fn handle_request(config: &ClientConfig, args: &RequestArgs) -> Result<(), AppError> {
    let body = pipeline::run_request(config, args)?;
    let text = serde_json::to_string_pretty(&body)
        .map_err(|e| AppError::new(4, format!("Failed to render INE response: {e}")))?;
    println!("{text}");
    Ok(())
}
