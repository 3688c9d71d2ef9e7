//! Config command - print the effective configuration

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use trailblazer_core::ExplorerConfig;
use trailblazer_core::config as core_config;

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Print the config file location instead of its contents
    #[arg(long)]
    pub path: bool,

    /// Write the effective configuration to the platform config directory
    #[arg(long, conflicts_with = "path")]
    pub write: bool,
}

/// Load an explicit config file, or the platform one with defaults.
pub fn load(explicit: Option<&Path>) -> Result<ExplorerConfig> {
    match explicit {
        Some(path) => core_config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(core_config::load()),
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| core_config::config_dir().map(|dir| dir.join("config.toml")))
}

/// Execute the config command
pub fn execute(args: ConfigArgs, config: &ExplorerConfig, explicit: Option<&Path>) -> Result<()> {
    if args.path {
        match config_path(explicit) {
            Some(path) => println!("{}", path.display()),
            None => anyhow::bail!("No config directory available on this platform"),
        }
        return Ok(());
    }

    if args.write {
        core_config::save(config).context("Failed to write configuration")?;
        match core_config::config_dir() {
            Some(dir) => tracing::info!("Wrote {}", dir.join("config.toml").display()),
            None => tracing::warn!("No config directory available; nothing written"),
        }
        return Ok(());
    }

    let rendered = render(config)?;
    print!("{}", rendered);
    Ok(())
}

fn render(config: &ExplorerConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to render configuration")
}
