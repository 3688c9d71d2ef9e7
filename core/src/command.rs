//! Scheduled input commands

use serde::{Deserialize, Serialize};

use crate::machine::Control;

/// Every kind of command the scheduler can place on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    MoveStart,
    MoveStop,
    AscendStart,
    AscendEnd,
    DescendStart,
    DescendEnd,
    /// Keep the current inputs unchanged
    Noop,
}

impl CommandKind {
    /// The control edge this command injects, if any.
    pub fn input(self) -> Option<(Control, bool)> {
        match self {
            Self::MoveStart => Some((Control::Move, true)),
            Self::MoveStop => Some((Control::Move, false)),
            Self::AscendStart => Some((Control::Ascend, true)),
            Self::AscendEnd => Some((Control::Ascend, false)),
            Self::DescendStart => Some((Control::Descend, true)),
            Self::DescendEnd => Some((Control::Descend, false)),
            Self::Noop => None,
        }
    }

    /// Release command automatically paired with a press, if any.
    pub fn paired_release(self) -> Option<CommandKind> {
        match self {
            Self::AscendStart => Some(Self::AscendEnd),
            Self::DescendStart => Some(Self::DescendEnd),
            Self::MoveStart
            | Self::MoveStop
            | Self::AscendEnd
            | Self::DescendEnd
            | Self::Noop => None,
        }
    }

    /// Short label used in logs and the CLI.
    pub fn label(self) -> &'static str {
        match self {
            Self::MoveStart => "move-start",
            Self::MoveStop => "move-stop",
            Self::AscendStart => "ascend-start",
            Self::AscendEnd => "ascend-end",
            Self::DescendStart => "descend-start",
            Self::DescendEnd => "descend-end",
            Self::Noop => "no-op",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One scheduled input command plus its replay metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Cycle at or after which the command may execute
    pub cycle: u64,
    pub kind: CommandKind,
    /// Shared by commands created by one scheduling decision
    pub group: u32,
    /// Progress position at first execution
    pub position: Option<u32>,
    /// Number of times the command has executed (replays included)
    pub exec_count: u32,
    /// A durable snapshot was taken right after this command
    pub is_checkpoint: bool,
}

impl Command {
    /// Create a command that has not executed yet.
    pub fn new(cycle: u64, kind: CommandKind, group: u32) -> Self {
        Self {
            cycle,
            kind,
            group,
            position: None,
            exec_count: 0,
            is_checkpoint: false,
        }
    }

    /// Record an execution at `position`. The first position sticks.
    pub fn mark_executed(&mut self, position: u32) {
        if self.position.is_none() {
            self.position = Some(position);
        }
        self.exec_count += 1;
    }
}
