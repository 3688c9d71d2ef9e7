//! Trailblazer Core - Checkpoint/rollback exploration controller
//!
//! This crate plays a deterministic, memory-mapped machine (a game console
//! running a fixed program) by injecting timed inputs, watching a few memory
//! probes for progress, and rolling back to saved checkpoints to retry
//! failed branches with different random choices.
//!
//! # Architecture
//!
//! - [`Machine`] - Trait implemented by the embedding emulator
//! - [`Explorer`] - The controller, driven by `on_pulse` / `on_sync`
//! - [`Timeline`] - Ordered command log with checkpoint floors
//! - [`Session`] - Persisted search state, stored through a [`SessionStore`]

pub mod checkpoint;
pub mod command;
pub mod config;
pub mod explorer;
#[cfg(test)]
mod integration;
pub mod machine;
pub mod progress;
pub mod prune;
pub mod random;
pub mod scheduler;
pub mod session;
pub mod timeline;

// Re-export the controller and its machine interface
pub use explorer::{Explorer, RestartKind, RestartReport};
pub use machine::{Control, LoadStateError, Machine, MachineSnapshot, SaveStateError};

// Re-export data model types
pub use checkpoint::{Checkpoint, ControllerFields, HeldInputs};
pub use command::{Command, CommandKind};
pub use prune::{ExplorationCounters, PrunePolicy};
pub use timeline::Timeline;

// Re-export configuration
pub use config::{ConfigError, DurationRange, DurationTable, ExplorerConfig, ProbeMap};

// Re-export the random source seam
pub use random::{PcgSource, RandomSource};

// Re-export persistence types
pub use session::{
    FileStore, MemoryStore, PersistError, Session, SessionError, SessionStore, StoreError,
};
