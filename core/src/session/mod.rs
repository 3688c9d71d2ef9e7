//! Persisted exploration sessions
//!
//! A [`Session`] is everything needed to resume a search: the full timeline,
//! the active checkpoint (with its machine snapshot) and the exploration
//! counters. The same encoding is used for the store record and for portable
//! export blobs:
//!
//! ```text
//! magic "TBSS" | u32 LE version | u64 LE xxh3(payload) | bincode payload
//! ```

mod store;

pub use store::{FileStore, MemoryStore, SessionStore, StoreError};

use serde::{Deserialize, Serialize};

use crate::checkpoint::Checkpoint;
use crate::command::Command;
use crate::prune::ExplorationCounters;

pub const SESSION_MAGIC: [u8; 4] = *b"TBSS";
pub const SESSION_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub commands: Vec<Command>,
    pub checkpoint: Option<Checkpoint>,
    pub counters: ExplorationCounters,
    /// Group id for the next scheduling decision
    pub next_group: u32,
}

/// Error decoding or validating a session blob
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session blob truncated ({0} bytes)")]
    Truncated(usize),
    #[error("not a session blob (bad magic)")]
    BadMagic,
    #[error("unsupported session version {0}")]
    UnsupportedVersion(u32),
    #[error("session checksum mismatch")]
    ChecksumMismatch,
    #[error("failed to encode session: {0}")]
    Encode(bincode::Error),
    #[error("failed to decode session: {0}")]
    Decode(bincode::Error),
    #[error("invalid session: {0}")]
    Invalid(String),
}

/// Error persisting a session to its store
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Session {
    /// Serialize into a self-describing blob.
    pub fn encode(&self) -> Result<Vec<u8>, SessionError> {
        let payload = bincode::serialize(self).map_err(SessionError::Encode)?;

        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(&SESSION_MAGIC);
        out.extend_from_slice(&SESSION_VERSION.to_le_bytes());
        out.extend_from_slice(&xxhash_rust::xxh3::xxh3_64(&payload).to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    /// Parse and validate a blob produced by [`Session::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, SessionError> {
        if bytes.len() < HEADER_LEN {
            return Err(SessionError::Truncated(bytes.len()));
        }

        let (header, payload) = bytes.split_at(HEADER_LEN);
        if header[..4] != SESSION_MAGIC {
            return Err(SessionError::BadMagic);
        }

        let version = read_u32_le(&header[4..8]);
        if version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion(version));
        }

        let checksum = read_u64_le(&header[8..16]);
        if xxhash_rust::xxh3::xxh3_64(payload) != checksum {
            return Err(SessionError::ChecksumMismatch);
        }

        let session: Session = bincode::deserialize(payload).map_err(SessionError::Decode)?;
        session.validate()?;
        Ok(session)
    }

    /// Structural checks a decoded session must pass before it is adopted.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.commands.is_empty() {
            return Err(SessionError::Invalid("timeline is empty".into()));
        }
        if self.commands.windows(2).any(|w| w[0].cycle > w[1].cycle) {
            return Err(SessionError::Invalid("timeline is not ordered by cycle".into()));
        }

        if let Some(checkpoint) = &self.checkpoint {
            let flagged = self
                .commands
                .get(checkpoint.command_index)
                .is_some_and(|c| c.is_checkpoint);
            if !flagged {
                return Err(SessionError::Invalid(format!(
                    "checkpoint refers to command {} which is not a checkpoint",
                    checkpoint.command_index
                )));
            }
            if checkpoint.fields.cursor != checkpoint.command_index + 1 {
                return Err(SessionError::Invalid(format!(
                    "checkpoint cursor {} does not follow its marker",
                    checkpoint.fields.cursor
                )));
            }
            if !checkpoint.snapshot.verify() {
                return Err(SessionError::Invalid("checkpoint snapshot is corrupt".into()));
            }
        }

        let max_group = self.commands.iter().map(|c| c.group).max().unwrap_or(0);
        if self.next_group <= max_group {
            return Err(SessionError::Invalid(format!(
                "next group {} is already in use",
                self.next_group
            )));
        }
        Ok(())
    }

    /// Number of checkpoint-flagged commands.
    pub fn checkpoint_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_checkpoint).count()
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
