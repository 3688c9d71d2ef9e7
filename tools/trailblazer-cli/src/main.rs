//! Trailblazer CLI - Operator tooling for exploration sessions
//!
//! # Commands
//!
//! - `trailblazer inspect` - Summarize a session blob or stored session
//! - `trailblazer export` - Copy a stored session into a portable blob
//! - `trailblazer import` - Validate a blob and store it as the session
//! - `trailblazer reset` - Delete a stored session
//! - `trailblazer config` - Print the effective configuration
//!
//! # Usage
//!
//! ```bash
//! # Back up the current session
//! trailblazer export -o run.tbs
//!
//! # Look at what it contains
//! trailblazer inspect run.tbs --json
//!
//! # Restore it later (or on another machine)
//! trailblazer import run.tbs
//! ```
//!
//! Sessions live in the platform data directory unless `--store` or
//! `[storage] dir` in `config.toml` says otherwise.

mod config;
mod export;
mod import;
mod inspect;
mod reset;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trailblazer CLI - Operator tooling for exploration sessions
#[derive(Parser)]
#[command(name = "trailblazer")]
#[command(about = "Inspect and manage Trailblazer exploration sessions")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a session blob or stored session
    Inspect(inspect::InspectArgs),

    /// Copy a stored session into a portable blob
    Export(export::ExportArgs),

    /// Validate a session blob and store it
    Import(import::ImportArgs),

    /// Delete a stored session
    Reset(reset::ResetArgs),

    /// Print the effective configuration as TOML
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let explorer_config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args, &explorer_config),
        Commands::Export(args) => export::execute(args, &explorer_config),
        Commands::Import(args) => import::execute(args, &explorer_config),
        Commands::Reset(args) => reset::execute(args, &explorer_config),
        Commands::Config(args) => config::execute(args, &explorer_config, cli.config.as_deref()),
    }
}
