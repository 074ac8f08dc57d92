//! Health and score

use serde::{Deserialize, Serialize};

/// Full health; respawn restores to this
pub const MAX_HEALTH: f32 = 100.0;

/// What a damage application actually did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Health actually removed
    pub dealt: f32,
    /// True if this hit took the last of the target's health
    pub defeated: bool,
}

/// Health and score of an actor. Both change only through these methods,
/// so health never leaves `[0, MAX_HEALTH]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    health: f32,
    score: u32,
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new()
    }
}

impl Vitals {
    /// Full health, zero score
    pub fn new() -> Self {
        Self {
            health: MAX_HEALTH,
            score: 0,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Set health directly (clamped to 0..MAX_HEALTH, NaN reads as 0)
    pub fn set_health(&mut self, health: f32) {
        self.health = if health.is_nan() {
            0.0
        } else {
            health.clamp(0.0, MAX_HEALTH)
        };
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    /// Add to the score, saturating
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Out of health
    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Apply damage. A target that is already out of health takes nothing.
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_defeated() || amount.is_nan() || amount <= 0.0 {
            return DamageOutcome {
                dealt: 0.0,
                defeated: false,
            };
        }

        let before = self.health;
        self.set_health(before - amount);
        DamageOutcome {
            dealt: before - self.health,
            defeated: self.is_defeated(),
        }
    }

    /// Back to full health; score is kept
    pub fn restore(&mut self) {
        self.health = MAX_HEALTH;
    }
}
