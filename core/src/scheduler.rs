//! Command scheduling and the next-command policy
//!
//! The scheduler appends commands to the [`Timeline`], expands presses that
//! need a forced release into paired entries, and tracks the earliest cycle at
//! which the next decision may be made.

use crate::command::{Command, CommandKind};
use crate::config::{DurationRange, DurationTable, PolicyConfig};
use crate::random::RandomSource;
use crate::timeline::Timeline;

/// Observed state the policy decides from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionState {
    /// Player hangs from a rope
    pub on_rope: bool,
    /// Move control is held
    pub moving: bool,
}

pub struct Scheduler {
    durations: DurationTable,
    policy: PolicyConfig,
    rng: Box<dyn RandomSource>,
    next_group: u32,
    next_decision_cycle: u64,
}

impl Scheduler {
    pub fn new(durations: DurationTable, policy: PolicyConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            durations,
            policy,
            rng,
            next_group: 1,
            next_decision_cycle: 0,
        }
    }

    pub fn durations(&self) -> &DurationTable {
        &self.durations
    }

    /// Earliest cycle at which [`Scheduler::choose_next_command`] may run.
    pub fn next_decision_cycle(&self) -> u64 {
        self.next_decision_cycle
    }

    pub fn set_next_decision_cycle(&mut self, cycle: u64) {
        self.next_decision_cycle = cycle;
    }

    /// Group id the next scheduling decision will receive.
    pub fn next_group(&self) -> u32 {
        self.next_group
    }

    pub fn set_next_group(&mut self, group: u32) {
        self.next_group = group.max(1);
    }

    /// Hand out a fresh group id.
    pub fn allocate_group(&mut self) -> u32 {
        let group = self.next_group;
        self.next_group = self.next_group.wrapping_add(1).max(1);
        group
    }

    /// Uniform draw from `[min, min + span]`.
    pub fn draw(&mut self, range: DurationRange) -> u64 {
        range.min + self.rng.span(range.span)
    }

    /// Append `kind` at `cycle` and return the index of the new command.
    ///
    /// Presses that need a forced release get it at `cycle + hold` in the
    /// same group. Unless `next_eligible` is given, the next decision is
    /// pushed out by a draw from the kind's duration range.
    pub fn schedule_command(
        &mut self,
        timeline: &mut Timeline,
        cycle: u64,
        kind: CommandKind,
        group: Option<u32>,
        next_eligible: Option<u64>,
    ) -> usize {
        let group = group.unwrap_or_else(|| self.allocate_group());
        let index = timeline.push(Command::new(cycle, kind, group));

        if let Some(release) = kind.paired_release() {
            let hold = self.durations.hold;
            timeline.push(Command::new(cycle + hold, release, group));
        }

        if let Some(range) = self.durations.for_kind(kind) {
            self.next_decision_cycle = match next_eligible {
                Some(eligible) => eligible,
                None => cycle + self.draw(range),
            };
        }

        log::trace!(
            "scheduled {} at cycle {} [group={}, next decision={}]",
            kind,
            cycle,
            group,
            self.next_decision_cycle
        );
        index
    }

    /// Pick and schedule the next command.
    ///
    /// A rope is always released first; there is no way to stay on it.
    pub fn choose_next_command(
        &mut self,
        timeline: &mut Timeline,
        cycle: u64,
        state: DecisionState,
    ) -> usize {
        if state.on_rope {
            let delay = self.draw(self.durations.rope_release);
            return self.schedule_command(
                timeline,
                cycle + delay,
                CommandKind::DescendStart,
                None,
                None,
            );
        }

        let kind = if self.rng.chance(self.policy.noop) {
            CommandKind::Noop
        } else if !state.moving && self.rng.chance(self.policy.move_start) {
            CommandKind::MoveStart
        } else if state.moving && self.rng.chance(self.policy.move_stop) {
            CommandKind::MoveStop
        } else {
            CommandKind::AscendStart
        };

        self.schedule_command(timeline, cycle, kind, None, None)
    }

    /// Set the first decision after a restart relative to the timeline tail.
    ///
    /// The tail cycle lives in the restored clock domain, so nothing from
    /// before the restart leaks into the new deadline.
    pub fn arm_after_restart(&mut self, tail_cycle: u64) {
        let jitter = self.draw(self.durations.restart_jitter);
        self.next_decision_cycle = tail_cycle + 1 + jitter;
    }
}
