//! Export command - copy a stored session into a portable blob

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use trailblazer_core::ExplorerConfig;

use crate::store::{ResolvedStore, StoreArgs};

/// Arguments for the export command
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Output file (defaults to `<key>.tbs` in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the export command
pub fn execute(args: ExportArgs, config: &ExplorerConfig) -> Result<()> {
    let resolved = args.store.resolve(config)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.tbs", resolved.key)));

    let exported = export_to(&resolved, &output)?;
    tracing::info!(
        "Exported {} commands ({} checkpoints) to {}",
        exported.0,
        exported.1,
        output.display()
    );
    Ok(())
}

/// Validate the stored record and write it to `output`. Returns the command
/// and checkpoint counts.
pub(crate) fn export_to(resolved: &ResolvedStore, output: &Path) -> Result<(usize, usize)> {
    // decoding first refuses to export a damaged record
    let blob = resolved.read()?;
    let session = trailblazer_core::Session::decode(&blob)
        .with_context(|| format!("Stored session {} is unreadable", resolved.describe()))?;

    std::fs::write(output, &blob)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok((session.commands.len(), session.checkpoint_count()))
}
