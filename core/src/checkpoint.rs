//! Checkpoint management
//!
//! Only one checkpoint is active at a time: the furthest point reached with
//! checkpoints enabled. Older checkpoints live on as `is_checkpoint` flags in
//! the timeline, which makes them pruning floors but not restore targets.

use serde::{Deserialize, Serialize};

use crate::machine::{Control, LoadStateError, Machine, MachineSnapshot, SaveStateError};
use crate::timeline::Timeline;

/// Controls held down at a given moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldInputs {
    pub moving: bool,
    pub ascending: bool,
    pub descending: bool,
}

impl HeldInputs {
    pub fn get(&self, control: Control) -> bool {
        match control {
            Control::Move => self.moving,
            Control::Ascend => self.ascending,
            Control::Descend => self.descending,
        }
    }

    pub fn set(&mut self, control: Control, pressed: bool) {
        match control {
            Control::Move => self.moving = pressed,
            Control::Ascend => self.ascending = pressed,
            Control::Descend => self.descending = pressed,
        }
    }

    pub fn any(&self) -> bool {
        self.moving || self.ascending || self.descending
    }
}

/// Controller state captured alongside a machine snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerFields {
    /// Reference score for regression detection
    pub score: u32,
    /// Cursor right after the checkpoint marker
    pub cursor: usize,
    /// Area index (screen changes since power-on)
    pub area: u32,
    /// Raw screen id probe value
    pub screen_id: u8,
    /// Explorer clock at save time
    pub cycle: u64,
    pub held: HeldInputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Index of the checkpoint marker command
    pub command_index: usize,
    /// Position of the marker (area base)
    pub position: u32,
    pub fields: ControllerFields,
    pub snapshot: MachineSnapshot,
}

impl Checkpoint {
    /// The marker this checkpoint was taken at still exists and is flagged.
    pub fn is_live(&self, timeline: &Timeline) -> bool {
        self.fields.cursor == self.command_index + 1
            && timeline
                .get(self.command_index)
                .is_some_and(|c| c.is_checkpoint)
    }
}

pub struct CheckpointManager {
    enabled: bool,
    active: Option<Checkpoint>,
}

impl CheckpointManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            active: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also forgets the active checkpoint.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.active = None;
        }
    }

    pub fn active(&self) -> Option<&Checkpoint> {
        self.active.as_ref()
    }

    pub fn replace_active(&mut self, checkpoint: Option<Checkpoint>) {
        self.active = checkpoint;
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// True if an existing checkpoint already covers `area_base` or beyond.
    pub fn covers(&self, timeline: &Timeline, area_base: u32) -> bool {
        self.active.as_ref().is_some_and(|c| c.position >= area_base)
            || timeline.has_checkpoint_from(area_base)
    }

    /// Snapshot the machine and flag `marker` as a checkpoint.
    ///
    /// On failure the timeline is left untouched.
    pub fn save<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        timeline: &mut Timeline,
        marker: usize,
        position: u32,
        fields: ControllerFields,
    ) -> Result<&Checkpoint, SaveStateError> {
        if timeline.get(marker).is_none() {
            return Err(SaveStateError::Machine(format!(
                "checkpoint marker {} is not in the timeline",
                marker
            )));
        }

        let snapshot = machine.snapshot()?;
        timeline.mark_checkpoint(marker);

        log::info!(
            "SAVE_STATE [index={}, position={}, area={}, {} bytes]",
            marker,
            position,
            fields.area,
            snapshot.len()
        );

        Ok(self.active.insert(Checkpoint {
            command_index: marker,
            position,
            fields,
            snapshot,
        }))
    }

    /// Restore the active checkpoint into the machine.
    ///
    /// Returns `Ok(None)` when there is nothing to restore: no active
    /// checkpoint, or its marker was pruned away. A failed restore drops the
    /// active checkpoint so the next restart does not retry it.
    pub fn load<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        timeline: &Timeline,
    ) -> Result<Option<ControllerFields>, LoadStateError> {
        let Some(checkpoint) = self.active.as_ref() else {
            log::debug!("no checkpoint to load");
            return Ok(None);
        };

        if !checkpoint.is_live(timeline) {
            log::warn!(
                "checkpoint no longer exists [index={}, timeline={}]",
                checkpoint.command_index,
                timeline.len()
            );
            self.active = None;
            return Ok(None);
        }

        if !checkpoint.snapshot.verify() {
            let err = LoadStateError::ChecksumMismatch {
                expected: checkpoint.snapshot.checksum,
                found: checkpoint.snapshot.actual_checksum(),
            };
            self.active = None;
            return Err(err);
        }

        if let Err(e) = machine.restore(&checkpoint.snapshot) {
            self.active = None;
            return Err(e);
        }

        log::info!(
            "LOAD_STATE [index={}, position={}, area={}]",
            checkpoint.command_index,
            checkpoint.position,
            checkpoint.fields.area
        );
        Ok(Some(checkpoint.fields.clone()))
    }
}
