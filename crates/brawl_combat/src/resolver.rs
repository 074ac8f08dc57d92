//! Hit resolution for melee swings and thrown props
//!
//! Everything here is pure: callers snapshot actor positions, hand them in,
//! and apply the returned hits to their own vitals. That keeps the
//! resolver free of physics and registry borrows.

use crate::damage::{AttackIntent, AttackProfile};
use brawl_core::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Combat tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub punch: AttackProfile,
    pub kick: AttackProfile,
    /// Horizontal reach of a melee swing
    pub melee_radius: f32,
    /// Minimum dot between facing and direction-to-target (0.5 is about ±60°)
    pub arc_threshold: f32,
    /// Distance at which a thrown prop connects
    pub throw_hit_radius: f32,
    /// Slower props don't hurt
    pub throw_min_speed: f32,
    /// Seconds a throw stays eligible to hit
    pub throw_window: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            punch: AttackProfile {
                damage: 10.0,
                duration: 0.3,
            },
            kick: AttackProfile {
                damage: 20.0,
                duration: 0.4,
            },
            melee_radius: 1.5,
            arc_threshold: 0.5,
            throw_hit_radius: 1.0,
            throw_min_speed: 2.0,
            throw_window: 3.0,
        }
    }
}

/// An actor the resolver may consider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: EntityId,
    pub position: Vec3,
    /// False for defeated or hidden actors
    pub targetable: bool,
}

/// A melee hit the caller must apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeHit {
    pub target: EntityId,
    pub damage: f32,
    /// Horizontal distance at the moment of the swing
    pub distance: f32,
}

/// Drop the vertical component
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Is `target` inside the forward arc of an actor at `origin` facing `facing`?
/// Measured on the ground plane. A target exactly on top of the origin counts
/// as in front.
pub fn in_forward_arc(origin: Vec3, facing: Vec3, target: Vec3, threshold: f32) -> bool {
    let to_target = horizontal(target - origin);
    if to_target.length_squared() < 1.0e-8 {
        return true;
    }
    horizontal(facing)
        .normalize_or_zero()
        .dot(to_target.normalize())
        >= threshold
}

/// Every targetable actor other than the attacker that lies within
/// `melee_radius` and inside the forward arc. One swing may hit several.
pub fn resolve_melee(
    intent: &AttackIntent,
    targets: &[Target],
    config: &CombatConfig,
) -> Vec<MeleeHit> {
    let hits: Vec<MeleeHit> = targets
        .iter()
        .filter(|t| t.targetable && t.id != intent.attacker)
        .filter_map(|t| {
            let distance = horizontal(t.position - intent.origin).length();
            let hit = distance <= config.melee_radius
                && in_forward_arc(intent.origin, intent.facing, t.position, config.arc_threshold);
            hit.then_some(MeleeHit {
                target: t.id,
                damage: intent.damage,
                distance,
            })
        })
        .collect();

    log::trace!(
        "{:?} from {} checked {} targets, {} hit",
        intent.kind,
        intent.attacker,
        targets.len(),
        hits.len()
    );
    hits
}

/// The nearest targetable actor a thrown prop at `position` moving at
/// `velocity` connects with, if any. Distance is measured in 3D to the
/// target's body center.
pub fn check_thrown(
    position: Vec3,
    velocity: Vec3,
    targets: &[Target],
    config: &CombatConfig,
) -> Option<EntityId> {
    if velocity.length() <= config.throw_min_speed {
        return None;
    }

    targets
        .iter()
        .filter(|t| t.targetable)
        .map(|t| (t.id, t.position.distance(position)))
        .filter(|(_, d)| *d <= config.throw_hit_radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
