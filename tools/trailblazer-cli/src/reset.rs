//! Reset command - delete a stored session
//!
//! The next explorer start then begins from the seed command with zeroed
//! counters.

use anyhow::{Context, Result};
use clap::Args;
use trailblazer_core::{ExplorerConfig, SessionStore};

use crate::store::StoreArgs;

/// Arguments for the reset command
#[derive(Args)]
pub struct ResetArgs {
    #[command(flatten)]
    pub store: StoreArgs,
}

/// Execute the reset command
pub fn execute(args: ResetArgs, config: &ExplorerConfig) -> Result<()> {
    let mut resolved = args.store.resolve(config)?;
    let existed = resolved
        .store
        .get(&resolved.key)
        .with_context(|| format!("Failed to read {}", resolved.describe()))?
        .is_some();

    resolved
        .store
        .delete(&resolved.key)
        .with_context(|| format!("Failed to delete {}", resolved.describe()))?;

    if existed {
        tracing::info!("Deleted session {}", resolved.describe());
    } else {
        tracing::info!("No session stored at {}", resolved.describe());
    }
    Ok(())
}
