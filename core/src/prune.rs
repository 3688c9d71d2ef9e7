//! Pruning and backtracking policy
//!
//! Every restart trims the timeline so the next attempt cannot be an exact
//! repeat of the failed one. After too many restarts without net progress
//! the trim widens to revisit earlier decisions. Nothing at or before the
//! latest checkpoint is ever removed; [`Timeline`] enforces that floor.

use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

/// Search statistics kept across restarts and persisted sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationCounters {
    pub total_restarts: u64,
    pub restarts_without_progress: u32,
    /// Furthest tail position seen at a restart
    pub best_position: u32,
}

/// What a prune pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Commands removed in total
    pub removed: usize,
    /// Tail position the progress check used
    pub current_position: u32,
    /// The widened prune ran
    pub escalated: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PrunePolicy {
    escalation_threshold: u32,
}

impl PrunePolicy {
    pub fn new(escalation_threshold: u32) -> Self {
        Self {
            escalation_threshold: escalation_threshold.max(1),
        }
    }

    pub fn escalation_threshold(&self) -> u32 {
        self.escalation_threshold
    }

    /// Restarts left before the prune widens.
    pub fn retries_remaining(&self, counters: &ExplorationCounters) -> u32 {
        self.escalation_threshold
            .saturating_sub(counters.restarts_without_progress)
    }

    /// Trim `timeline` after a failed run.
    ///
    /// The progress position is read from the tail before the unconditional
    /// trailing-group prune, so it reflects how far the failed run got.
    pub fn prune(&self, timeline: &mut Timeline, counters: &mut ExplorationCounters) -> PruneOutcome {
        let before = timeline.len();

        // Unexecuted commands and the half-executed group they belong to
        if let Some(group) = timeline.pending().map(|c| c.group) {
            timeline.truncate(timeline.cursor());
            timeline.prune_group(group);
        }

        let current_position = timeline.tail_position().unwrap_or(0);

        // The most recent decision is always retried differently
        timeline.prune_tail_group();

        if current_position <= counters.best_position {
            counters.restarts_without_progress += 1;
        } else {
            counters.restarts_without_progress = 0;
            counters.best_position = current_position;
        }

        let mut escalated = false;
        if counters.restarts_without_progress >= self.escalation_threshold {
            while let Some(tail) = timeline.last() {
                let near = tail
                    .position
                    .is_some_and(|p| u64::from(p) + 1 >= u64::from(current_position));
                if tail.is_checkpoint || !near {
                    break;
                }
                if timeline.prune_tail_group() == 0 {
                    break;
                }
            }
            counters.restarts_without_progress = 0;
            escalated = true;
        }

        let outcome = PruneOutcome {
            removed: before - timeline.len(),
            current_position,
            escalated,
        };
        log::debug!(
            "pruned {} commands [position={}, escalated={}, remaining={}]",
            outcome.removed,
            current_position,
            escalated,
            timeline.len()
        );
        outcome
    }
}

impl Default for PrunePolicy {
    fn default() -> Self {
        Self::new(20)
    }
}
