//! Command timeline
//!
//! An ordered, index-addressable log of [`Command`]s plus the cursor of the
//! next command to execute. The only ways to shrink it are [`Timeline::truncate`]
//! and [`Timeline::prune_group`], both of which refuse to cut below the
//! checkpoint floor: the latest checkpoint-flagged command and everything
//! before it, or the seed command when no checkpoint exists.

use crate::command::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    commands: Vec<Command>,
    cursor: usize,
}

impl Timeline {
    /// Create a timeline holding only its seed command.
    pub fn new(seed: Command) -> Self {
        Self {
            commands: vec![seed],
            cursor: 0,
        }
    }

    /// Rebuild a timeline from persisted commands. Returns `None` when the
    /// list is empty or not ordered by cycle.
    pub fn from_commands(commands: Vec<Command>) -> Option<Self> {
        if commands.is_empty() {
            return None;
        }
        if commands.windows(2).any(|w| w[0].cycle > w[1].cycle) {
            return None;
        }
        Some(Self {
            commands,
            cursor: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn last(&self) -> Option<&Command> {
        self.commands.last()
    }

    /// Index of the next command pending execution.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True when every command has executed.
    pub fn is_drained(&self) -> bool {
        self.cursor >= self.commands.len()
    }

    /// The command at the cursor, if any.
    pub fn pending(&self) -> Option<&Command> {
        self.commands.get(self.cursor)
    }

    /// Move the cursor back for a restart. Clamped to the timeline length.
    pub fn rewind(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.commands.len());
    }

    /// Append a command and return its index.
    ///
    /// Cycles are clamped so the timeline stays non-decreasing.
    pub fn push(&mut self, mut command: Command) -> usize {
        if let Some(last) = self.commands.last() {
            command.cycle = command.cycle.max(last.cycle);
        }
        self.commands.push(command);
        self.commands.len() - 1
    }

    /// Execute the command at the cursor and advance past it.
    pub fn execute_next(&mut self, position: u32) -> Option<&Command> {
        let index = self.cursor;
        let command = self.commands.get_mut(index)?;
        command.mark_executed(position);
        self.cursor += 1;
        Some(&self.commands[index])
    }

    /// Index of the latest checkpoint-flagged command.
    pub fn last_checkpoint(&self) -> Option<usize> {
        self.commands.iter().rposition(|c| c.is_checkpoint)
    }

    /// Number of leading commands that pruning may never remove.
    pub fn floor(&self) -> usize {
        self.last_checkpoint().map_or(1, |i| i + 1)
    }

    /// Flag a command as a checkpoint. Returns false if the index is out of range.
    pub fn mark_checkpoint(&mut self, index: usize) -> bool {
        match self.commands.get_mut(index) {
            Some(command) => {
                command.is_checkpoint = true;
                true
            }
            None => false,
        }
    }

    /// True if a checkpoint exists at or beyond `position`.
    pub fn has_checkpoint_from(&self, position: u32) -> bool {
        self.commands
            .iter()
            .any(|c| c.is_checkpoint && c.position.is_some_and(|p| p >= position))
    }

    /// Drop every command from `len` onward, never cutting below the floor.
    pub fn truncate(&mut self, len: usize) {
        let len = len.max(self.floor());
        self.commands.truncate(len);
        self.cursor = self.cursor.min(self.commands.len());
    }

    /// Pop trailing commands while they belong to `group`, stopping at the
    /// floor. Returns the number of commands removed.
    pub fn prune_group(&mut self, group: u32) -> usize {
        let floor = self.floor();
        let mut removed = 0;
        while self.commands.len() > floor
            && self.commands.last().is_some_and(|c| c.group == group)
        {
            self.commands.pop();
            removed += 1;
        }
        self.cursor = self.cursor.min(self.commands.len());
        removed
    }

    /// Pop the trailing group, whatever it is.
    pub fn prune_tail_group(&mut self) -> usize {
        match self.commands.last() {
            Some(last) => {
                let group = last.group;
                self.prune_group(group)
            }
            None => 0,
        }
    }

    /// Progress position of the tail command, if it has executed.
    pub fn tail_position(&self) -> Option<u32> {
        self.commands.last().and_then(|c| c.position)
    }

    /// Highest group id in use.
    pub fn max_group(&self) -> u32 {
        self.commands.iter().map(|c| c.group).max().unwrap_or(0)
    }

    /// Drop everything but the seed command and forget its replay metadata.
    pub fn reset_to_seed(&mut self) {
        self.commands.truncate(1);
        if let Some(seed) = self.commands.first_mut() {
            seed.position = None;
            seed.exec_count = 0;
            seed.is_checkpoint = false;
        }
        self.cursor = 0;
    }
}
