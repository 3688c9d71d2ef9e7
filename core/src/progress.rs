//! Progress tracking and failure detection
//!
//! Two independent signals mark a failed run: the score going down (the
//! program clears it when the player dies) and the player dropping below the
//! ground line. A death animation may report an out-of-bounds position before
//! the score resets, so either one is enough.

use crate::config::ProbeMap;
use crate::machine::Machine;

/// Classification of one display frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Score went up
    Advance,
    /// Nothing notable happened
    Neutral,
    /// The run failed and must restart
    Regression(RegressionCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegressionCause {
    ScoreDropped { from: u32, to: u32 },
    OutOfBounds { vertical: u8 },
}

impl std::fmt::Display for RegressionCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScoreDropped { from, to } => write!(f, "score dropped {} -> {}", from, to),
            Self::OutOfBounds { vertical } => write!(f, "player out of bounds (y={})", vertical),
        }
    }
}

/// Decode one packed-BCD byte (0x42 -> 42).
pub fn decode_bcd(byte: u8) -> u32 {
    u32::from(byte >> 4) * 10 + u32::from(byte & 0x0f)
}

pub struct ProgressTracker {
    probes: ProbeMap,
    last_score: u32,
}

impl ProgressTracker {
    pub fn new(probes: ProbeMap, initial_score: u32) -> Self {
        Self {
            probes,
            last_score: initial_score,
        }
    }

    pub fn probes(&self) -> &ProbeMap {
        &self.probes
    }

    /// Score observed on the last non-regressing frame.
    pub fn last_score(&self) -> u32 {
        self.last_score
    }

    /// Overwrite the reference score (cold start or checkpoint restore).
    pub fn set_last_score(&mut self, score: u32) {
        self.last_score = score;
    }

    /// Classify the current frame and update the reference score.
    pub fn classify<M: Machine + ?Sized>(&mut self, machine: &M) -> Verdict {
        let score = self.score(machine);

        if score < self.last_score {
            return Verdict::Regression(RegressionCause::ScoreDropped {
                from: self.last_score,
                to: score,
            });
        }
        if !self.is_alive(machine) {
            return Verdict::Regression(RegressionCause::OutOfBounds {
                vertical: machine.read_probe(self.probes.vertical),
            });
        }

        let advanced = score > self.last_score;
        self.last_score = score;
        if advanced {
            Verdict::Advance
        } else {
            Verdict::Neutral
        }
    }

    /// Four-digit score from the two BCD probe bytes.
    pub fn score<M: Machine + ?Sized>(&self, machine: &M) -> u32 {
        let high = decode_bcd(machine.read_probe(self.probes.score_high));
        let low = decode_bcd(machine.read_probe(self.probes.score_low));
        high * 100 + low
    }

    /// Player is at or above the ground line.
    pub fn is_alive<M: Machine + ?Sized>(&self, machine: &M) -> bool {
        machine.read_probe(self.probes.vertical) <= self.probes.ground_level
    }

    pub fn on_rope<M: Machine + ?Sized>(&self, machine: &M) -> bool {
        machine.read_probe(self.probes.rope_flag) == 1
    }

    pub fn screen_id<M: Machine + ?Sized>(&self, machine: &M) -> u8 {
        machine.read_probe(self.probes.screen)
    }

    /// Position inside the current area.
    pub fn offset<M: Machine + ?Sized>(&self, machine: &M) -> u32 {
        u32::from(machine.read_probe(self.probes.offset))
    }
}
