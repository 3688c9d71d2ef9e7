//! Machine adapter trait and snapshot types
//!
//! The explorer never simulates hardware itself. The embedding emulator
//! implements [`Machine`] to expose its clock, memory probes, input injection
//! and full-state snapshots, then forwards its per-cycle and per-frame hooks
//! to [`Explorer::on_pulse`](crate::Explorer::on_pulse) and
//! [`Explorer::on_sync`](crate::Explorer::on_sync).

use serde::{Deserialize, Serialize};

/// Physical controls the explorer can hold down on the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    /// Horizontal movement (joystick right)
    Move,
    /// Jump/climb (fire button)
    Ascend,
    /// Drop/descend (joystick down)
    Descend,
}

impl Control {
    /// All controls, in release order.
    pub const ALL: [Control; 3] = [Control::Move, Control::Ascend, Control::Descend];
}

/// Adapter over an external, cycle-ticking machine.
///
/// Implementations own all simulated hardware state. The explorer only reads
/// it through probes and mutates it through inputs, snapshots and resets.
pub trait Machine {
    /// Monotonic cycle counter. Only [`Machine::restore`] and
    /// [`Machine::cold_reset`] may move it backwards.
    fn current_cycle(&self) -> u64;

    /// Read one byte of machine memory.
    fn read_probe(&self, address: u16) -> u8;

    /// Press or release a control.
    fn inject_input(&mut self, control: Control, pressed: bool);

    /// Capture the complete machine state.
    fn snapshot(&mut self) -> Result<MachineSnapshot, SaveStateError>;

    /// Restore a state previously returned by [`Machine::snapshot`].
    fn restore(&mut self, snapshot: &MachineSnapshot) -> Result<(), LoadStateError>;

    /// Reset to power-on state and run until the program accepts input.
    fn cold_reset(&mut self);
}

/// Opaque full-machine snapshot
///
/// The checksum covers the data and the capture cycle so a damaged blob
/// (truncated file, bad import) is caught before it reaches the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Serialized machine state
    pub data: Vec<u8>,
    /// Machine cycle at capture time
    pub cycle: u64,
    /// xxHash3 checksum over `data` and `cycle`
    pub checksum: u64,
}

impl MachineSnapshot {
    /// Create a snapshot and compute its checksum.
    pub fn from_data(data: Vec<u8>, cycle: u64) -> Self {
        let checksum = Self::compute_checksum(&data, cycle);
        Self {
            data,
            cycle,
            checksum,
        }
    }

    /// Check if this snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the serialized state in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checksum of the current contents.
    pub fn actual_checksum(&self) -> u64 {
        Self::compute_checksum(&self.data, self.cycle)
    }

    /// Returns true if the stored checksum matches the contents.
    pub fn verify(&self) -> bool {
        self.actual_checksum() == self.checksum
    }

    fn compute_checksum(data: &[u8], cycle: u64) -> u64 {
        use xxhash_rust::xxh3::Xxh3;
        let mut hasher = Xxh3::new();
        hasher.update(data);
        hasher.update(&cycle.to_le_bytes());
        hasher.digest()
    }
}

/// Error capturing machine state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveStateError {
    /// The machine refused or failed to serialize itself
    #[error("machine error during snapshot: {0}")]
    Machine(String),
}

/// Error restoring machine state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadStateError {
    /// The machine failed to apply the snapshot
    #[error("machine error during restore: {0}")]
    Machine(String),
    /// Snapshot contents do not match their checksum
    #[error("snapshot checksum mismatch (expected {expected:#018x}, found {found:#018x})")]
    ChecksumMismatch { expected: u64, found: u64 },
}
