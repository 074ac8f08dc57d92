//! Physics-backed characters
//!
//! An [`Actor`] couples a rigid body, a visual and a small action state
//! machine:
//!
//! ```text
//! Idle <-> Walking            movement input / velocity decayed to zero
//! Idle|Walking -> Jumping     jump request while grounded
//! Idle|Walking -> Punching    attack request
//! Idle|Walking -> Kicking     attack request
//! Jumping|Punching|Kicking -> previous locomotion state, when the timer ends
//! any -> Defeated             health reached zero
//! Defeated -> Idle            respawn
//! ```
//!
//! The state machine never touches physics; the session applies the
//! velocities and schedules the timers that end jumps and attacks.

use crate::visual::{ActorVisual, Role};
use brawl_ai::NpcBrain;
use brawl_combat::{AttackKind, Vitals};
use brawl_core::EntityId;
use brawl_physics::{
    ColliderDesc, ColliderShape, CollisionGroups, PhysicsMaterial, RigidBodyDesc,
    RigidBodyHandle, RotationLock,
};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Half extents of an actor's torso box
pub const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.9, 0.4);
/// Foot cylinder under the torso
pub const FOOT_RADIUS: f32 = 0.3;
pub const FOOT_HALF_HEIGHT: f32 = 0.05;

/// Unit horizontal facing for a yaw. Yaw 0 faces -Z.
pub fn forward(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Unit right vector for a yaw
pub fn right(yaw: f32) -> Vec3 {
    let f = forward(yaw);
    Vec3::new(-f.z, 0.0, f.x)
}

/// Yaw that faces along `direction` (only X and Z are used)
pub fn yaw_of(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

/// Rotation of an actor with the given yaw
pub fn yaw_rotation(yaw: f32) -> Quat {
    Quat::from_rotation_y(yaw)
}

/// Player tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    pub spawn_point: Vec3,
    pub spawn_yaw: f32,
    /// Target ground speed in m/s
    pub move_speed: f32,
    /// Ground speed never drops below this while input is held
    pub min_speed: f32,
    /// Fraction of the gap to the target velocity closed per tick
    pub acceleration: f32,
    /// Horizontal velocity multiplier per tick without input
    pub idle_damping: f32,
    /// Horizontal speeds below this snap to zero
    pub snap_epsilon: f32,
    /// Upward launch speed in m/s
    pub jump_speed: f32,
    /// Seconds the jump animation lasts
    pub jump_duration: f32,
    /// Minimum Y of a contact normal that counts as ground
    pub grounded_normal_threshold: f32,
    /// Radians of yaw per pixel of pointer motion
    pub yaw_sensitivity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            spawn_point: Vec3::new(0.0, 1.0, 0.0),
            spawn_yaw: 0.0,
            move_speed: 5.0,
            min_speed: 1.5,
            acceleration: 0.35,
            idle_damping: 0.85,
            snap_epsilon: 0.05,
            jump_speed: 6.0,
            jump_duration: 0.6,
            grounded_normal_threshold: 0.5,
            yaw_sensitivity: 0.0025,
        }
    }
}

impl PlayerConfig {
    /// Next horizontal velocity given the current one and the wanted
    /// direction (zero for no input)
    pub fn ground_velocity(&self, current: Vec3, direction: Vec3) -> Vec3 {
        let current = Vec3::new(current.x, 0.0, current.z);
        let direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();

        if direction == Vec3::ZERO {
            let damped = current * self.idle_damping;
            return if damped.length() < self.snap_epsilon {
                Vec3::ZERO
            } else {
                damped
            };
        }

        let target = direction * self.move_speed;
        let next = current.lerp(target, self.acceleration);
        if next.length() < self.min_speed {
            direction * self.min_speed
        } else {
            next
        }
    }
}

/// Collider set shared by every actor: torso box plus a foot cylinder
pub fn actor_colliders() -> [ColliderDesc; 2] {
    let torso = ColliderDesc::new(ColliderShape::cuboid(
        BODY_HALF_EXTENTS.x,
        BODY_HALF_EXTENTS.y,
        BODY_HALF_EXTENTS.z,
    ))
    .with_material(PhysicsMaterial::character())
    .with_collision_groups(CollisionGroups::actors())
    .with_collision_events(true);

    let feet = ColliderDesc::new(ColliderShape::cylinder(FOOT_HALF_HEIGHT, FOOT_RADIUS))
        .with_offset(0.0, -BODY_HALF_EXTENTS.y, 0.0)
        .with_material(PhysicsMaterial::character())
        .with_collision_groups(CollisionGroups::actors());

    [torso, feet]
}

/// Rigid body of an actor standing at `position`
pub fn actor_body(position: Vec3, yaw: f32) -> RigidBodyDesc {
    RigidBodyDesc::dynamic()
        .with_position(position)
        .with_yaw(yaw)
        .with_rotation_lock(RotationLock::All)
        .with_sleep(false)
}

/// What an actor is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionState {
    Idle,
    Walking,
    Jumping,
    Punching,
    Kicking,
    Defeated,
}

impl ActionState {
    pub fn is_locomotion(&self) -> bool {
        matches!(self, Self::Idle | Self::Walking)
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self, Self::Punching | Self::Kicking)
    }
}

/// A character in the room: the player or an NPC
pub struct Actor {
    pub id: EntityId,
    pub name: String,
    pub role: Role,
    pub body: RigidBodyHandle,
    pub(crate) visual: Box<dyn ActorVisual>,
    pub(crate) vitals: Vitals,
    state: ActionState,
    /// Locomotion state to return to when a jump or attack ends
    locomotion: ActionState,
    /// Facing around +Y; yaw 0 faces -Z
    pub yaw: f32,
    pub grounded: bool,
    /// Prop in hand
    pub(crate) held: Option<EntityId>,
    /// NPC behavior record; `None` for the player
    pub(crate) brain: Option<NpcBrain>,
}

impl Actor {
    pub(crate) fn new(
        id: EntityId,
        name: String,
        role: Role,
        body: RigidBodyHandle,
        visual: Box<dyn ActorVisual>,
        yaw: f32,
    ) -> Self {
        Self {
            id,
            name,
            role,
            body,
            visual,
            vitals: Vitals::new(),
            state: ActionState::Idle,
            locomotion: ActionState::Idle,
            yaw,
            grounded: false,
            held: None,
            brain: None,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn health(&self) -> f32 {
        self.vitals.health()
    }

    pub fn score(&self) -> u32 {
        self.vitals.score()
    }

    pub fn held(&self) -> Option<EntityId> {
        self.held
    }

    pub fn brain(&self) -> Option<&NpcBrain> {
        self.brain.as_ref()
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }

    pub fn is_defeated(&self) -> bool {
        self.state == ActionState::Defeated
    }

    pub fn is_attacking(&self) -> bool {
        self.state.is_attacking()
    }

    /// Unit horizontal facing
    pub fn forward(&self) -> Vec3 {
        forward(self.yaw)
    }

    /// Record whether the actor is moving under its own power. Takes effect
    /// immediately in a locomotion state, otherwise when the current jump or
    /// attack ends.
    pub(crate) fn set_locomotion(&mut self, walking: bool) {
        if self.is_defeated() {
            return;
        }
        let next = if walking {
            ActionState::Walking
        } else {
            ActionState::Idle
        };
        if self.locomotion != next {
            self.locomotion = next;
            self.visual.set_walking(walking);
        }
        if self.state.is_locomotion() {
            self.state = next;
        }
    }

    /// Start a jump. Only grounded actors in a locomotion state can jump.
    pub(crate) fn begin_jump(&mut self) -> bool {
        if !self.grounded || !self.state.is_locomotion() {
            return false;
        }
        self.state = ActionState::Jumping;
        self.grounded = false;
        self.visual.set_jumping(true);
        true
    }

    pub(crate) fn end_jump(&mut self) {
        if self.state == ActionState::Jumping {
            self.state = self.locomotion;
            self.visual.set_jumping(false);
        }
    }

    /// Start a melee attack. Fails while jumping, attacking or defeated.
    pub(crate) fn begin_attack(&mut self, kind: AttackKind) -> bool {
        if !self.state.is_locomotion() {
            return false;
        }
        self.state = match kind {
            AttackKind::Kick => ActionState::Kicking,
            _ => ActionState::Punching,
        };
        self.visual.play_attack(kind);
        true
    }

    pub(crate) fn end_attack(&mut self) {
        if self.state.is_attacking() {
            self.state = self.locomotion;
        }
        if let Some(brain) = self.brain.as_mut() {
            brain.end_attack();
        }
    }

    /// Enter the terminal defeated state and hide the visual
    pub(crate) fn defeat(&mut self) {
        self.state = ActionState::Defeated;
        self.locomotion = ActionState::Idle;
        self.grounded = false;
        self.visual.set_walking(false);
        self.visual.set_jumping(false);
        self.visual.set_visible(false);
        if let Some(brain) = self.brain.as_mut() {
            brain.end_attack();
        }
    }

    /// Back to `Idle` at full health with the visual shown
    pub(crate) fn revive(&mut self) {
        self.state = ActionState::Idle;
        self.locomotion = ActionState::Idle;
        self.vitals.restore();
        self.visual.set_visible(true);
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("state", &self.state)
            .field("health", &self.vitals.health())
            .field("yaw", &self.yaw)
            .field("held", &self.held)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessScene;
    use crate::visual::SceneHost;
    use approx::assert_relative_eq;
    use brawl_core::EntityRef;

    fn actor(scene: &mut HeadlessScene) -> Actor {
        let id = EntityId::new(0, 0);
        let visual = scene.attach_actor(id, "Test", Role::Npc);
        Actor::new(
            id,
            "Test".into(),
            Role::Npc,
            RigidBodyHandle::invalid(),
            visual,
            0.0,
        )
    }

    #[test]
    fn test_yaw_helpers_agree() {
        for yaw in [0.0_f32, 0.7, -1.2, 2.9] {
            let f = forward(yaw);
            assert_relative_eq!(yaw_of(f), yaw, epsilon = 1.0e-5);
            let rotated = yaw_rotation(yaw) * Vec3::NEG_Z;
            assert_relative_eq!(rotated.x, f.x, epsilon = 1.0e-5);
            assert_relative_eq!(rotated.z, f.z, epsilon = 1.0e-5);
        }
        assert_relative_eq!(right(0.0).x, 1.0);
    }

    #[test]
    fn test_ground_velocity_min_speed_floor() {
        let config = PlayerConfig::default();

        // Reversing: the lerp lands near zero, the floor takes over
        let v = config.ground_velocity(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        assert_relative_eq!(v.z, -config.min_speed, epsilon = 1.0e-6);
        assert_eq!(v.x, 0.0);

        // Sluggish acceleration from rest
        let sluggish = PlayerConfig {
            acceleration: 0.1,
            ..PlayerConfig::default()
        };
        let v = sluggish.ground_velocity(Vec3::ZERO, Vec3::X);
        assert_relative_eq!(v.x, sluggish.min_speed, epsilon = 1.0e-6);

        // Default acceleration already clears the floor on the first tick
        let v = config.ground_velocity(Vec3::ZERO, Vec3::NEG_Z);
        assert_relative_eq!(v.z, -config.move_speed * config.acceleration, epsilon = 1.0e-6);

        let mut v = Vec3::ZERO;
        for _ in 0..60 {
            v = config.ground_velocity(v, Vec3::NEG_Z);
        }
        assert_relative_eq!(v.z, -config.move_speed, epsilon = 1.0e-3);
    }

    #[test]
    fn test_ground_velocity_decays_and_snaps() {
        let config = PlayerConfig::default();
        let mut v = Vec3::new(5.0, 3.0, 0.0);
        v = config.ground_velocity(v, Vec3::ZERO);
        assert_relative_eq!(v.x, 4.25, epsilon = 1.0e-6);
        assert_eq!(v.y, 0.0);

        let mut ticks = 0;
        while v != Vec3::ZERO {
            v = config.ground_velocity(v, Vec3::ZERO);
            ticks += 1;
            assert!(ticks < 100);
        }
    }

    #[test]
    fn test_jump_needs_ground() {
        let mut scene = HeadlessScene::new();
        let mut a = actor(&mut scene);
        assert!(!a.begin_jump());

        a.grounded = true;
        assert!(a.begin_jump());
        assert_eq!(a.state(), ActionState::Jumping);
        assert!(!a.grounded);

        // Already airborne
        a.grounded = true;
        assert!(!a.begin_jump());

        a.end_jump();
        assert_eq!(a.state(), ActionState::Idle);
        assert!(!scene.record(EntityRef::actor(a.id)).unwrap().jumping);
    }

    #[test]
    fn test_attack_returns_to_locomotion() {
        let mut scene = HeadlessScene::new();
        let mut a = actor(&mut scene);
        a.set_locomotion(true);
        assert_eq!(a.state(), ActionState::Walking);

        assert!(a.begin_attack(AttackKind::Kick));
        assert_eq!(a.state(), ActionState::Kicking);
        assert!(!a.begin_attack(AttackKind::Punch));

        // Stopping mid-kick is remembered
        a.set_locomotion(false);
        assert_eq!(a.state(), ActionState::Kicking);
        a.end_attack();
        assert_eq!(a.state(), ActionState::Idle);

        let record = scene.record(EntityRef::actor(a.id)).unwrap();
        assert_eq!(record.attacks, vec![AttackKind::Kick]);
        assert!(!record.walking);
    }

    #[test]
    fn test_defeat_is_terminal_until_revive() {
        let mut scene = HeadlessScene::new();
        let mut a = actor(&mut scene);
        a.grounded = true;
        a.vitals.set_health(0.0);
        a.defeat();

        assert!(!a.begin_attack(AttackKind::Punch));
        assert!(!a.begin_jump());
        a.set_locomotion(true);
        assert_eq!(a.state(), ActionState::Defeated);
        assert!(!scene.record(EntityRef::actor(a.id)).unwrap().visible);

        a.revive();
        assert_eq!(a.state(), ActionState::Idle);
        assert_eq!(a.health(), 100.0);
        assert!(scene.record(EntityRef::actor(a.id)).unwrap().visible);
    }
}
