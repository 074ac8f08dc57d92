//! Outbound notifications for the UI collaborator

use crate::prop::ObjectKind;
use brawl_combat::AttackKind;
use brawl_core::EntityId;
use glam::Vec3;

/// Something the UI may want to show. Queued during a tick and drained with
/// [`crate::Session::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    HealthChanged {
        actor: EntityId,
        health: f32,
    },
    ScoreChanged {
        actor: EntityId,
        score: u32,
    },
    /// Damage landed
    Hit {
        attacker: EntityId,
        target: EntityId,
        kind: AttackKind,
        damage: f32,
    },
    ActorDefeated {
        actor: EntityId,
        is_player: bool,
    },
    NpcRespawned {
        actor: EntityId,
        position: Vec3,
    },
    /// The player is down. Raised once per session.
    GameOver {
        score: u32,
    },
    ObjectPickedUp {
        actor: EntityId,
        object: EntityId,
        kind: ObjectKind,
    },
    ObjectThrown {
        actor: EntityId,
        object: EntityId,
        velocity: Vec3,
    },
}
