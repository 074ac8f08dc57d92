//! Session configuration
//!
//! Every tunable has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! seed = 7
//!
//! [npc]
//! population_cap = 2
//!
//! [combat.kick]
//! damage = 25.0
//! duration = 0.4
//! ```

use crate::actor::PlayerConfig;
use crate::arena::ArenaConfig;
use crate::camera::CameraConfig;
use crate::error::{GameError, Result};
use crate::input::KeyBindings;
use crate::prop::{ObjectConfig, ObjectKind};
use brawl_ai::NpcConfig;
use brawl_combat::CombatConfig;
use brawl_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a session needs to start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for every random draw in the session
    pub seed: u64,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub npc: NpcConfig,
    pub combat: CombatConfig,
    pub objects: ObjectConfig,
    pub arena: ArenaConfig,
    pub camera: CameraConfig,
    pub keys: KeyBindings,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            npc: NpcConfig::default(),
            combat: CombatConfig::default(),
            objects: ObjectConfig::default(),
            arena: ArenaConfig::default(),
            camera: CameraConfig::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl GameConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Drop the default prop placements
    pub fn without_objects(mut self) -> Self {
        self.objects.placements.clear();
        self
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;

        let player = &self.player;
        positive("player.move_speed", player.move_speed)?;
        non_negative("player.min_speed", player.min_speed)?;
        if player.min_speed > player.move_speed {
            return invalid("player.min_speed must not exceed player.move_speed");
        }
        unit_interval("player.acceleration", player.acceleration)?;
        unit_interval("player.idle_damping", player.idle_damping)?;
        non_negative("player.snap_epsilon", player.snap_epsilon)?;
        positive("player.jump_speed", player.jump_speed)?;
        positive("player.jump_duration", player.jump_duration)?;
        finite("player.yaw_sensitivity", player.yaw_sensitivity)?;

        let npc = &self.npc;
        positive("npc.attack_range", npc.attack_range)?;
        positive("npc.follow_range", npc.follow_range)?;
        if npc.attack_range >= npc.follow_range {
            return invalid("npc.attack_range must be smaller than npc.follow_range");
        }
        positive("npc.avoidance_radius", npc.avoidance_radius)?;
        non_negative("npc.base_speed", npc.base_speed)?;
        non_negative("npc.speed_jitter", npc.speed_jitter)?;
        positive("npc.attack_cooldown", npc.attack_cooldown)?;
        positive("npc.offset_refresh", npc.offset_refresh)?;
        non_negative("npc.offset_radius", npc.offset_radius)?;
        non_negative("npc.respawn_delay", npc.respawn_delay)?;
        finite("npc.min_height", npc.min_height)?;
        if npc.population_cap > 0 && npc.spawn_points.is_empty() {
            return invalid("npc.spawn_points must not be empty when population_cap > 0");
        }

        let combat = &self.combat;
        for (name, profile) in [("combat.punch", &combat.punch), ("combat.kick", &combat.kick)] {
            non_negative(&format!("{name}.damage"), profile.damage)?;
            positive(&format!("{name}.duration"), profile.duration)?;
        }
        positive("combat.melee_radius", combat.melee_radius)?;
        positive("combat.throw_hit_radius", combat.throw_hit_radius)?;
        non_negative("combat.throw_min_speed", combat.throw_min_speed)?;
        positive("combat.throw_window", combat.throw_window)?;
        if !(-1.0..=1.0).contains(&combat.arc_threshold) {
            return invalid("combat.arc_threshold must lie in [-1, 1]");
        }

        let objects = &self.objects;
        positive("objects.pickup_range", objects.pickup_range)?;
        non_negative("objects.upward_bias", objects.upward_bias)?;
        non_negative("objects.spin", objects.spin)?;
        for kind in [ObjectKind::Bottle, ObjectKind::Glass, ObjectKind::Chair] {
            let profile = objects.profile(kind);
            positive(&format!("objects.{kind:?}.throw_strength"), profile.throw_strength)?;
            non_negative(&format!("objects.{kind:?}.damage"), profile.damage)?;
        }

        positive("arena.half_width", self.arena.half_width)?;
        positive("arena.half_depth", self.arena.half_depth)?;

        Ok(())
    }
}

fn invalid(message: &str) -> Result<()> {
    Err(GameError::InvalidConfig(message.to_string()))
}

fn finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!("{name} must be finite, got {value}")))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

fn unit_interval(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig(format!("{name} must lie in (0, 1], got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 7

            [npc]
            population_cap = 2

            [combat.kick]
            damage = 25.0
            duration = 0.4

            [keys]
            KeyZ = "Jump"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.npc.population_cap, 2);
        assert_eq!(config.npc.attack_range, 1.4);
        assert_eq!(config.combat.kick.damage, 25.0);
        assert_eq!(config.combat.punch.damage, 10.0);
        assert_eq!(config.physics.timestep, 1.0 / 60.0);
        assert_eq!(config.keys.action("KeyZ"), Some(crate::input::Action::Jump));
        assert_eq!(config.keys.action("KeyW"), Some(crate::input::Action::MoveForward));
        assert_eq!(config.keys.len(), KeyBindings::default().len() + 1);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.combat.melee_radius = -1.0;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        let mut config = GameConfig::default();
        config.npc.attack_range = 30.0;
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));

        let mut config = GameConfig::default();
        config.physics.timestep = 0.0;
        assert!(matches!(config.validate(), Err(GameError::Physics(_))));

        assert!(matches!(
            GameConfig::from_toml_str("seed = \"abc\""),
            Err(GameError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, GameError::Io { .. }));
    }
}
