//! Attack kinds, intents and damage tuning

use brawl_core::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What kind of blow landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Punch,
    Kick,
    /// A thrown prop connecting in flight
    ThrownHit,
}

/// Damage and animation lock of one melee move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Health removed per target
    pub damage: f32,
    /// Seconds the attacker stays locked in the attack state
    pub duration: f32,
}

/// One attempted hit, consumed by the resolver in the tick it was raised
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackIntent {
    /// Actor that swung or threw
    pub attacker: EntityId,
    pub kind: AttackKind,
    /// Attacker position when the intent was raised
    pub origin: Vec3,
    /// Unit horizontal facing of the attacker
    pub facing: Vec3,
    pub damage: f32,
    /// Session time the intent was raised, used as the cooldown stamp
    pub issued_at: f64,
}

impl AttackIntent {
    /// Create a melee intent; `facing` is flattened and normalized
    pub fn melee(
        attacker: EntityId,
        kind: AttackKind,
        origin: Vec3,
        facing: Vec3,
        profile: &AttackProfile,
        issued_at: f64,
    ) -> Self {
        Self {
            attacker,
            kind,
            origin,
            facing: Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero(),
            damage: profile.damage,
            issued_at,
        }
    }
}
