//! Store location arguments shared by the session commands

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use trailblazer_core::{ExplorerConfig, FileStore, Session, SessionStore};

/// Where a stored session lives
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Session store directory (defaults to `[storage] dir` or the data directory)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Session key (defaults to `[storage] session_key`)
    #[arg(long)]
    pub key: Option<String>,
}

/// An opened store plus the key the command works on
pub struct ResolvedStore {
    pub store: FileStore,
    pub key: String,
}

impl StoreArgs {
    pub fn resolve(&self, config: &ExplorerConfig) -> Result<ResolvedStore> {
        let dir = match &self.store {
            Some(dir) => dir.clone(),
            None => config
                .storage
                .resolve_dir()
                .context("No data directory available; pass --store")?,
        };
        let key = self
            .key
            .clone()
            .unwrap_or_else(|| config.storage.session_key.clone());
        Ok(ResolvedStore {
            store: FileStore::new(dir),
            key,
        })
    }
}

impl ResolvedStore {
    /// Human-readable location of the record.
    pub fn describe(&self) -> String {
        match self.store.path_for(&self.key) {
            Ok(path) => path.display().to_string(),
            Err(_) => format!("{} [{}]", self.store.dir().display(), self.key),
        }
    }

    /// Raw bytes of the stored record.
    pub fn read(&self) -> Result<Vec<u8>> {
        self.store
            .get(&self.key)
            .with_context(|| format!("Failed to read session {}", self.describe()))?
            .with_context(|| format!("No session stored at {}", self.describe()))
    }

    /// Decoded stored session.
    pub fn load(&self) -> Result<Session> {
        let blob = self.read()?;
        Session::decode(&blob)
            .with_context(|| format!("Stored session {} is unreadable", self.describe()))
    }
}
