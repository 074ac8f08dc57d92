//! Player locomotion, jumps and attack starts

use super::{absorb, Session, TimerAction};
use crate::actor::{forward, right, yaw_rotation};
use brawl_combat::{AttackIntent, AttackKind};
use brawl_core::{EntityId, EntityRef};
use glam::Vec3;
use std::f32::consts::{PI, TAU};

impl Session {
    /// Turn this tick's input into player actions
    pub(super) fn apply_player_command(&mut self) {
        let command = self.input.take_command(self.config.player.yaw_sensitivity);
        if self.game_over {
            return;
        }
        let Some(id) = self.player else {
            return;
        };
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        if actor.is_defeated() {
            return;
        }

        actor.yaw = wrap_angle(actor.yaw + command.yaw_delta);
        let yaw = actor.yaw;
        let direction = if command.is_moving() {
            forward(yaw) * command.forward + right(yaw) * command.right
        } else {
            Vec3::ZERO
        };
        self.drive(id, direction);

        if command.jump {
            self.jump(id);
        }
        if command.punch {
            self.punch(id);
        }
        if command.kick {
            self.kick(id);
        }
        if command.throw {
            self.throw_held(id);
        }
        if command.pick_up {
            self.pickup(id);
        }
    }

    /// Apply ground velocity toward `direction` (zero to coast to a stop)
    /// and square the body up with the actor's yaw
    fn drive(&mut self, id: EntityId, direction: Vec3) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        let body = actor.body;
        let Ok(velocity) = self.physics.linear_velocity(body) else {
            return;
        };

        let ground = self.config.player.ground_velocity(velocity, direction);
        absorb(
            self.physics
                .set_linear_velocity(body, Vec3::new(ground.x, velocity.y, ground.z)),
            "drive",
        );
        absorb(
            self.physics.set_body_rotation(body, yaw_rotation(actor.yaw)),
            "drive",
        );
        actor.set_locomotion(ground != Vec3::ZERO);
    }

    /// Jump if grounded. Returns false (and does nothing) when airborne,
    /// attacking or defeated.
    pub fn jump(&mut self, id: EntityId) -> bool {
        let Some(actor) = self.actors.get_mut(id) else {
            return false;
        };
        let body = actor.body;
        let Ok(velocity) = self.physics.linear_velocity(body) else {
            return false;
        };
        if !actor.begin_jump() {
            return false;
        }

        let jump = Vec3::new(velocity.x, self.config.player.jump_speed, velocity.z);
        absorb(self.physics.set_linear_velocity(body, jump), "jump");
        let due = self.time + self.config.player.jump_duration as f64;
        self.timers
            .schedule(due, EntityRef::actor(id), TimerAction::EndJump);
        log::debug!("{} jumps", actor.name);
        true
    }

    /// Start a punch. No-op while already attacking.
    pub fn punch(&mut self, id: EntityId) -> bool {
        self.start_attack(id, AttackKind::Punch)
    }

    /// Start a kick. No-op while already attacking.
    pub fn kick(&mut self, id: EntityId) -> bool {
        self.start_attack(id, AttackKind::Kick)
    }

    /// Lock the actor into the attack for its duration and queue the swing
    /// for this tick's melee resolution
    pub(super) fn start_attack(&mut self, id: EntityId, kind: AttackKind) -> bool {
        let profile = match kind {
            AttackKind::Punch => self.config.combat.punch,
            AttackKind::Kick => self.config.combat.kick,
            AttackKind::ThrownHit => return false,
        };
        let Some(actor) = self.actors.get_mut(id) else {
            return false;
        };
        let Ok(origin) = self.physics.body_position(actor.body) else {
            return false;
        };
        if !actor.begin_attack(kind) {
            return false;
        }

        self.intents.push(AttackIntent::melee(
            id,
            kind,
            origin,
            actor.forward(),
            &profile,
            self.time,
        ));
        let due = self.time + profile.duration as f64;
        self.timers
            .schedule(due, EntityRef::actor(id), TimerAction::EndAttack);
        log::debug!("{} starts a {:?}", actor.name, kind);
        true
    }
}

/// Keep a yaw in `[-PI, PI)`
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActionState;
    use crate::config::GameConfig;
    use crate::headless::HeadlessScene;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn settled() -> Session {
        let mut config = GameConfig::default().without_objects();
        config.npc.population_cap = 0;
        let mut s = Session::new(config, Box::new(HeadlessScene::new())).unwrap();
        for _ in 0..30 {
            s.tick(DT).unwrap();
        }
        s
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.5), 0.5);
        assert_relative_eq!(wrap_angle(PI + 0.5), -PI + 0.5, epsilon = 1.0e-5);
        assert_relative_eq!(wrap_angle(-PI - 0.5), PI - 0.5, epsilon = 1.0e-5);
    }

    #[test]
    fn test_walk_then_coast_to_idle() {
        let mut s = settled();
        let player = s.player_id().unwrap();
        let start = s.actor_position(player).unwrap();

        s.input_mut().key_down("KeyW");
        for _ in 0..30 {
            s.tick(DT).unwrap();
        }
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Walking);
        let moved = s.actor_position(player).unwrap();
        assert!(moved.z < start.z - 1.0, "moved to {:?}", moved);

        s.input_mut().key_up("KeyW");
        for _ in 0..60 {
            s.tick(DT).unwrap();
        }
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Idle);
        let v = s.physics().linear_velocity(s.actor(player).unwrap().body).unwrap();
        assert_relative_eq!(v.x, 0.0, epsilon = 1.0e-3);
        assert_relative_eq!(v.z, 0.0, epsilon = 1.0e-3);
    }

    #[test]
    fn test_pointer_turns_movement() {
        let mut s = settled();
        let player = s.player_id().unwrap();
        let start = s.actor_position(player).unwrap();

        // Quarter turn to the right, then walk: now heading +X
        let pixels = (PI / 2.0) / s.config().player.yaw_sensitivity;
        s.input_mut().pointer_moved(pixels, 0.0);
        s.input_mut().key_down("KeyW");
        for _ in 0..30 {
            s.tick(DT).unwrap();
        }
        let moved = s.actor_position(player).unwrap();
        assert!(moved.x > start.x + 1.0, "moved to {:?}", moved);
        assert!((moved.z - start.z).abs() < 0.2);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut s = settled();
        let player = s.player_id().unwrap();
        assert!(s.actor(player).unwrap().grounded);

        assert!(s.jump(player));
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Jumping);
        assert!(!s.jump(player));

        s.tick(DT).unwrap();
        s.tick(DT).unwrap();
        let y = s.actor_position(player).unwrap().y;
        assert!(y > 1.0, "player at y {}", y);

        // Lands and the jump animation ends
        for _ in 0..90 {
            s.tick(DT).unwrap();
        }
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Idle);
        assert!(s.actor(player).unwrap().grounded);
        assert!(s.jump(player));
    }

    #[test]
    fn test_attack_locks_for_duration() {
        let mut s = settled();
        let player = s.player_id().unwrap();

        assert!(s.punch(player));
        assert!(!s.punch(player));
        assert!(!s.kick(player));
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Punching);

        // 0.3s punch
        for _ in 0..17 {
            s.tick(DT).unwrap();
        }
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Punching);
        for _ in 0..3 {
            s.tick(DT).unwrap();
        }
        assert_eq!(s.actor(player).unwrap().state(), ActionState::Idle);
        assert!(s.kick(player));
    }
}
