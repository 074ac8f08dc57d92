//! NPC behavior record and per-tick decision
//!
//! An NPC idles until the player comes within `follow_range`, pursues a
//! personal aim point near the player (so a crowd doesn't stack on one spot),
//! and once within `attack_range` stops and swings, gated by a cooldown.

use crate::steering::{self, SteeringOutput, SteeringWeights};
use brawl_combat::AttackKind;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// NPC tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    /// Beyond this horizontal distance the NPC ignores the player
    pub follow_range: f32,
    /// Within this horizontal distance the NPC stops and attacks
    pub attack_range: f32,
    /// Other NPCs closer than this push the NPC away
    pub avoidance_radius: f32,
    pub base_speed: f32,
    /// Each NPC's speed is `base_speed` plus a uniform draw from `±speed_jitter`
    pub speed_jitter: f32,
    /// Minimum seconds between two attack starts
    pub attack_cooldown: f32,
    /// Seconds between aim-point refreshes
    pub offset_refresh: f32,
    /// Aim points are drawn within this distance of the player
    pub offset_radius: f32,
    pub respawn_delay: f32,
    pub population_cap: usize,
    /// Anti-sink floor for the body center
    pub min_height: f32,
    /// Where NPCs appear, used round-robin
    pub spawn_points: Vec<Vec3>,
    pub steering: SteeringWeights,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            follow_range: 20.0,
            attack_range: 1.4,
            avoidance_radius: 2.0,
            base_speed: 3.0,
            speed_jitter: 0.5,
            attack_cooldown: 1.5,
            offset_refresh: 3.0,
            offset_radius: 1.0,
            respawn_delay: 5.0,
            population_cap: 4,
            min_height: 0.5,
            spawn_points: vec![
                Vec3::new(-5.0, 1.0, -6.0),
                Vec3::new(5.0, 1.0, -6.0),
                Vec3::new(-6.0, 1.0, 4.0),
                Vec3::new(6.0, 1.0, 4.0),
            ],
            steering: SteeringWeights::default(),
        }
    }
}

/// What the NPC wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NpcDecision {
    /// Player absent or out of range: stand still
    Idle,
    /// Walk along `direction` at `speed`
    Pursue {
        direction: Vec3,
        speed: f32,
        steering: SteeringOutput,
    },
    /// In range: stop, face the player, and maybe start an attack
    Engage {
        facing: Vec3,
        attack: Option<AttackKind>,
    },
}

/// World snapshot an NPC decides from
#[derive(Debug, Clone, Copy)]
pub struct NpcContext<'a> {
    /// Session time in seconds
    pub now: f64,
    pub position: Vec3,
    /// `None` while the player is defeated or gone
    pub player: Option<Vec3>,
    /// Positions of the other live NPCs
    pub neighbors: &'a [Vec3],
}

/// Per-NPC behavior record
#[derive(Debug, Clone, PartialEq)]
pub struct NpcBrain {
    /// Personal aim point relative to the player
    pub target_offset: Vec3,
    pub offset_refreshed_at: f64,
    /// Individual walking speed
    pub speed: f32,
    pub last_attack_at: Option<f64>,
    /// Set while an attack this brain started is still playing
    pub attacking: bool,
    /// Separation push from the last pursuit tick
    pub last_separation: Vec3,
}

impl NpcBrain {
    /// Fresh record with a rolled speed and aim point
    pub fn new<R: Rng + ?Sized>(config: &NpcConfig, now: f64, rng: &mut R) -> Self {
        let jitter = (rng.random::<f32>() * 2.0 - 1.0) * config.speed_jitter;
        Self {
            target_offset: random_offset(config.offset_radius, rng),
            offset_refreshed_at: now,
            speed: (config.base_speed + jitter).max(0.0),
            last_attack_at: None,
            attacking: false,
            last_separation: Vec3::ZERO,
        }
    }

    /// Forget attack state and roll a new aim point; speed is kept
    pub fn reset<R: Rng + ?Sized>(&mut self, config: &NpcConfig, now: f64, rng: &mut R) {
        self.target_offset = random_offset(config.offset_radius, rng);
        self.offset_refreshed_at = now;
        self.last_attack_at = None;
        self.attacking = false;
        self.last_separation = Vec3::ZERO;
    }

    /// The attack animation this brain started has ended
    pub fn end_attack(&mut self) {
        self.attacking = false;
    }

    /// Can a new attack start at `now`
    pub fn can_attack(&self, now: f64, config: &NpcConfig) -> bool {
        !self.attacking
            && self
                .last_attack_at
                .map_or(true, |t| now - t >= config.attack_cooldown as f64)
    }

    /// Decide this tick's action. Starting an attack records it, so the
    /// caller must carry the attack out (or call [`NpcBrain::end_attack`]).
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        ctx: &NpcContext<'_>,
        config: &NpcConfig,
        rng: &mut R,
    ) -> NpcDecision {
        if ctx.now - self.offset_refreshed_at >= config.offset_refresh as f64 {
            self.target_offset = random_offset(config.offset_radius, rng);
            self.offset_refreshed_at = ctx.now;
        }

        let Some(player) = ctx.player else {
            return NpcDecision::Idle;
        };

        let to_player = Vec3::new(player.x - ctx.position.x, 0.0, player.z - ctx.position.z);
        let distance = to_player.length();

        self.last_separation = Vec3::ZERO;
        if distance > config.follow_range {
            return NpcDecision::Idle;
        }

        if distance > config.attack_range {
            let steering = steering::pursue(
                ctx.position,
                player + self.target_offset,
                ctx.neighbors,
                config.avoidance_radius,
                rng,
            );
            self.last_separation = steering.separation;
            return NpcDecision::Pursue {
                direction: steering.direction(&config.steering),
                speed: self.speed,
                steering,
            };
        }

        let attack = if self.can_attack(ctx.now, config) {
            let kind = if rng.random_bool(0.5) {
                AttackKind::Punch
            } else {
                AttackKind::Kick
            };
            self.attacking = true;
            self.last_attack_at = Some(ctx.now);
            log::trace!("NPC starts {:?} at {:.2}m", kind, distance);
            Some(kind)
        } else {
            None
        };

        NpcDecision::Engage {
            facing: to_player.normalize_or_zero(),
            attack,
        }
    }
}

/// Horizontal offset with each component drawn from `[-radius, radius]`
fn random_offset<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() * 2.0 - 1.0) * radius,
        0.0,
        (rng.random::<f32>() * 2.0 - 1.0) * radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(now: f64, position: Vec3, player: Option<Vec3>) -> NpcContext<'static> {
        NpcContext {
            now,
            position,
            player,
            neighbors: &[],
        }
    }

    #[test]
    fn test_speed_within_jitter() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let brain = NpcBrain::new(&config, 0.0, &mut rng);
            assert!(brain.speed >= 2.5 && brain.speed <= 3.5);
            assert!(brain.target_offset.x.abs() <= 1.0 && brain.target_offset.z.abs() <= 1.0);
        }
    }

    #[test]
    fn test_idle_out_of_range_or_no_player() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut brain = NpcBrain::new(&config, 0.0, &mut rng);

        let far = ctx(0.1, Vec3::ZERO, Some(Vec3::new(25.0, 0.0, 0.0)));
        assert_eq!(brain.think(&far, &config, &mut rng), NpcDecision::Idle);

        let gone = ctx(0.1, Vec3::ZERO, None);
        assert_eq!(brain.think(&gone, &config, &mut rng), NpcDecision::Idle);
    }

    #[test]
    fn test_pursues_toward_player() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut brain = NpcBrain::new(&config, 0.0, &mut rng);

        let c = ctx(0.1, Vec3::ZERO, Some(Vec3::new(10.0, 1.0, 0.0)));
        match brain.think(&c, &config, &mut rng) {
            NpcDecision::Pursue {
                direction, speed, ..
            } => {
                assert!(direction.x > 0.9);
                assert_eq!(direction.y, 0.0);
                assert_eq!(speed, brain.speed);
            }
            other => panic!("expected pursue, got {:?}", other),
        }
    }

    #[test]
    fn test_attack_respects_cooldown() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut brain = NpcBrain::new(&config, 0.0, &mut rng);
        let player = Some(Vec3::new(1.0, 1.0, 0.0));

        let mut attacks = Vec::new();
        // 4 seconds at 60 Hz, attack animation ends 0.4s after each start
        for frame in 0..240 {
            let now = frame as f64 / 60.0;
            if let Some(started) = brain.last_attack_at {
                if now - started >= 0.4 {
                    brain.end_attack();
                }
            }
            if let NpcDecision::Engage {
                attack: Some(_),
                facing,
            } = brain.think(&ctx(now, Vec3::ZERO, player), &config, &mut rng)
            {
                assert!(facing.x > 0.99);
                attacks.push(now);
            }
        }

        assert_eq!(attacks.len(), 3);
        for pair in attacks.windows(2) {
            assert!(pair[1] - pair[0] >= config.attack_cooldown as f64 - 1.0e-9);
        }
    }

    #[test]
    fn test_no_attack_while_attacking() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut brain = NpcBrain::new(&config, 0.0, &mut rng);
        brain.attacking = true;

        let c = ctx(10.0, Vec3::ZERO, Some(Vec3::new(0.5, 1.0, 0.0)));
        assert!(matches!(
            brain.think(&c, &config, &mut rng),
            NpcDecision::Engage { attack: None, .. }
        ));
    }

    #[test]
    fn test_both_attack_kinds_occur() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut seen = (false, false);
        for i in 0..64 {
            let mut brain = NpcBrain::new(&config, 0.0, &mut rng);
            let c = ctx(i as f64, Vec3::ZERO, Some(Vec3::new(1.0, 1.0, 0.0)));
            match brain.think(&c, &config, &mut rng) {
                NpcDecision::Engage {
                    attack: Some(AttackKind::Punch),
                    ..
                } => seen.0 = true,
                NpcDecision::Engage {
                    attack: Some(AttackKind::Kick),
                    ..
                } => seen.1 = true,
                _ => {}
            }
        }
        assert_eq!(seen, (true, true));
    }

    #[test]
    fn test_offset_refreshes_periodically() {
        let config = NpcConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut brain = NpcBrain::new(&config, 0.0, &mut rng);

        brain.think(&ctx(1.0, Vec3::ZERO, None), &config, &mut rng);
        assert_eq!(brain.offset_refreshed_at, 0.0);

        brain.think(&ctx(3.0, Vec3::ZERO, None), &config, &mut rng);
        assert_eq!(brain.offset_refreshed_at, 3.0);
    }
}
