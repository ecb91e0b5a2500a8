//! Binary crate for the `greengenius` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;
use greengenius_core::InputError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cmd = cli::Cli::parse();

    let filter = if cmd.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<InputError>() {
            Some(input) => {
                eprintln!("Invalid input: {input}");
                ExitCode::from(2)
            }
            None => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
