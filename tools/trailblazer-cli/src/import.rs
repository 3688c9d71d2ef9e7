//! Import command - validate a session blob and store it

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use trailblazer_core::{ExplorerConfig, Session, SessionStore};

use crate::store::{ResolvedStore, StoreArgs};

/// Arguments for the import command
#[derive(Args)]
pub struct ImportArgs {
    /// Session blob to import
    pub input: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute the import command
pub fn execute(args: ImportArgs, config: &ExplorerConfig) -> Result<()> {
    let mut resolved = args.store.resolve(config)?;
    let session = import_from(&mut resolved, &args.input)?;
    tracing::info!(
        "Imported {} commands ({} checkpoints) into {}",
        session.commands.len(),
        session.checkpoint_count(),
        resolved.describe()
    );
    Ok(())
}

/// Decode `input` fully before touching the store.
pub(crate) fn import_from(resolved: &mut ResolvedStore, input: &Path) -> Result<Session> {
    let blob =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let session = Session::decode(&blob)
        .with_context(|| format!("{} is not a valid session", input.display()))?;

    resolved
        .store
        .put(&resolved.key, &blob)
        .with_context(|| format!("Failed to write {}", resolved.describe()))?;
    Ok(session)
}
