//! The per-tick simulation loop
//!
//! [`Session`] is the single owner of the physics world, the actor and prop
//! arenas, the timer queue and the RNG. Everything else refers to entities
//! by id and looks them up each time, so a removed or respawned entity can
//! never be reached through a stale reference.
//!
//! One [`Session::tick`] runs, in order:
//!
//! 1. physics step
//! 2. contact feedback (grounded flags) and visual sync
//! 3. player command
//! 4. held props follow their holders
//! 5. NPC decisions
//! 6. melee intents resolved
//! 7. thrown props checked for hits
//! 8. due timers fired (attack and jump ends, respawns, throw windows)
//! 9. camera follow
//!
//! Everything written in steps 3 to 8 lands before the next physics step.

mod combat;
mod interaction;
mod movement;
mod npc;

use crate::actor::{actor_body, actor_colliders, yaw_of, yaw_rotation, Actor};
use crate::arena::build_arena;
use crate::camera::{CameraPose, CameraRig};
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::input::InputState;
use crate::prop::{ObjectKind, Prop, PropState};
use crate::visual::{Role, SceneHost};
use brawl_ai::NpcBrain;
use brawl_combat::AttackIntent;
use brawl_core::{EntityArena, EntityId, EntityRef, TimerQueue};
use brawl_physics::{PhysicsWorld, RigidBodyDesc, RigidBodyHandle};
use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Delayed one-shot actions. The timer's owner says which entity it acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Attack animation over; back to locomotion
    EndAttack,
    /// Jump animation over
    EndJump,
    /// Defeated NPC comes back
    Respawn,
    /// A throw can no longer hit
    CloseThrowWindow,
}

/// One brawl in one room
pub struct Session {
    config: GameConfig,
    physics: PhysicsWorld,
    scene: Box<dyn SceneHost>,
    arena: Vec<RigidBodyHandle>,
    actors: EntityArena<Actor>,
    props: EntityArena<Prop>,
    player: Option<EntityId>,
    timers: TimerQueue<TimerAction>,
    /// Melee swings raised this tick, resolved in step 6
    intents: Vec<AttackIntent>,
    events: Vec<GameEvent>,
    input: InputState,
    camera: CameraRig,
    camera_pose: CameraPose,
    rng: ChaCha8Rng,
    /// Seconds since the session started
    time: f64,
    frame: u64,
    next_spawn_point: usize,
    npcs_spawned: u32,
    game_over: bool,
}

impl Session {
    /// Build the room, the player and the configured props
    pub fn new(config: GameConfig, scene: Box<dyn SceneHost>) -> Result<Self> {
        config.validate()?;

        let mut physics = PhysicsWorld::new(config.physics.clone());
        let arena = build_arena(&mut physics, &config.arena)?;

        let mut session = Self {
            physics,
            scene,
            arena,
            actors: EntityArena::new(),
            props: EntityArena::new(),
            player: None,
            timers: TimerQueue::new(),
            intents: Vec::new(),
            events: Vec::new(),
            input: InputState::new(config.keys.clone()),
            camera: CameraRig::new(config.camera),
            camera_pose: CameraPose::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            time: 0.0,
            frame: 0,
            next_spawn_point: 0,
            npcs_spawned: 0,
            game_over: false,
            config,
        };

        let player = &session.config.player;
        let (name, spawn, yaw) = (player.name.clone(), player.spawn_point, player.spawn_yaw);
        let id = session.spawn_actor(Role::Player, name, spawn, yaw)?;
        session.player = Some(id);
        session.camera_pose = session.camera.pose(spawn, yaw);

        for placement in session.config.objects.placements.clone() {
            session.spawn_object(placement.kind, placement.position)?;
        }

        log::info!(
            "Session started: seed {}, {} props, {} arena bodies",
            session.config.seed,
            session.props.len(),
            session.arena.len()
        );
        Ok(session)
    }

    // ==================== Spawning ====================

    fn spawn_actor(
        &mut self,
        role: Role,
        name: String,
        position: Vec3,
        yaw: f32,
    ) -> Result<EntityId> {
        let Self {
            actors,
            physics,
            scene,
            ..
        } = self;

        let id = actors.try_insert_with(|id| -> Result<Actor> {
            let body = physics.create_body(actor_body(position, yaw), EntityRef::actor(id));
            for collider in actor_colliders() {
                physics.create_collider(collider, body)?;
            }
            let mut visual = scene.attach_actor(id, &name, role);
            visual.set_transform(position, yaw_rotation(yaw));
            Ok(Actor::new(id, name, role, body, visual, yaw))
        })?;
        Ok(id)
    }

    /// Spawn one NPC at the next spawn point, ignoring the population cap
    pub fn spawn_npc(&mut self) -> Result<EntityId> {
        let position = self.take_spawn_point().ok_or_else(|| {
            GameError::InvalidConfig("no NPC spawn points configured".to_string())
        })?;

        // Face the player if there is one
        let yaw = self
            .player_position()
            .map(|p| p - position)
            .filter(|d| d.x != 0.0 || d.z != 0.0)
            .map(yaw_of)
            .unwrap_or(0.0);

        self.npcs_spawned += 1;
        let name = format!("NPC {}", self.npcs_spawned);
        let id = self.spawn_actor(Role::Npc, name, position, yaw)?;

        let brain = NpcBrain::new(&self.config.npc, self.time, &mut self.rng);
        if let Some(actor) = self.actors.get_mut(id) {
            log::info!("{} spawned at {:?}, speed {:.2}", actor.name, position, brain.speed);
            actor.brain = Some(brain);
        }
        Ok(id)
    }

    /// Spawn NPCs until the population cap is reached
    pub fn spawn_npcs(&mut self) -> Result<Vec<EntityId>> {
        let mut spawned = Vec::new();
        while self.npc_count() < self.config.npc.population_cap {
            spawned.push(self.spawn_npc()?);
        }
        Ok(spawned)
    }

    /// Spawn a free prop
    pub fn spawn_object(&mut self, kind: ObjectKind, position: Vec3) -> Result<EntityId> {
        let ccd = self.config.physics.ccd_enabled;
        let Self {
            props,
            physics,
            scene,
            ..
        } = self;

        let id = props.try_insert_with(|id| -> Result<Prop> {
            let body = physics.create_body(
                RigidBodyDesc::dynamic().with_position(position).with_ccd(ccd),
                EntityRef::prop(id),
            );
            physics.create_collider(kind.collider(), body)?;
            let mut visual = scene.attach_prop(id, kind);
            visual.set_transform(position, Quat::IDENTITY);
            Ok(Prop {
                id,
                kind,
                body,
                visual,
                state: PropState::Free,
            })
        })?;
        log::debug!("Spawned {:?} {} at {:?}", kind, id, position);
        Ok(id)
    }

    /// Round-robin over the configured spawn points
    fn take_spawn_point(&mut self) -> Option<Vec3> {
        let points = &self.config.npc.spawn_points;
        if points.is_empty() {
            return None;
        }
        let point = points[self.next_spawn_point % points.len()];
        self.next_spawn_point += 1;
        Some(point)
    }

    // ==================== Tick ====================

    /// Advance the session by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.physics.step(dt)?;
        self.time += dt as f64;
        self.frame += 1;

        self.sync_from_physics();
        self.apply_player_command();
        self.track_held_props();
        self.update_npcs();
        self.resolve_intents();
        self.check_thrown_props();
        self.fire_timers();
        self.update_camera();

        log::trace!(
            "Frame {} at {:.3}s: {} actors, {} props, {} timers",
            self.frame,
            self.time,
            self.actors.len(),
            self.props.len(),
            self.timers.len()
        );
        Ok(())
    }

    /// Read contact feedback and push body poses out to the visuals
    fn sync_from_physics(&mut self) {
        let threshold = self.config.player.grounded_normal_threshold;
        let Self {
            actors,
            props,
            physics,
            ..
        } = self;

        for (_, actor) in actors.iter_mut() {
            if actor.is_defeated() {
                continue;
            }
            let Ok(position) = physics.body_position(actor.body) else {
                continue;
            };
            actor.grounded = physics
                .contact_normals(actor.body)
                .iter()
                .any(|c| c.is_ground(threshold));
            actor.visual.set_transform(position, yaw_rotation(actor.yaw));
        }

        for (_, prop) in props.iter_mut() {
            if let (Ok(position), Ok(rotation)) = (
                physics.body_position(prop.body),
                physics.body_rotation(prop.body),
            ) {
                prop.visual.set_transform(position, rotation);
            }
        }
    }

    fn fire_timers(&mut self) {
        for fired in self.timers.pop_due(self.time) {
            let id = fired.owner.id;
            match fired.action {
                TimerAction::EndAttack => {
                    if let Some(actor) = self.actors.get_mut(id) {
                        actor.end_attack();
                    }
                }
                TimerAction::EndJump => {
                    if let Some(actor) = self.actors.get_mut(id) {
                        actor.end_jump();
                    }
                }
                TimerAction::Respawn => self.respawn(id),
                TimerAction::CloseThrowWindow => self.close_throw_window(id, fired.id),
            }
        }
    }

    fn update_camera(&mut self) {
        let Some(actor) = self.player.and_then(|id| self.actors.get(id)) else {
            return;
        };
        if let Ok(position) = self.physics.body_position(actor.body) {
            self.camera_pose = self.camera.pose(position, actor.yaw);
        }
    }

    // ==================== Removal ====================

    /// Remove an actor: its timers, pending swings, held prop, open throw
    /// windows, rigid body and visual all go with it
    pub fn remove_actor(&mut self, id: EntityId) -> bool {
        if !self.actors.contains(id) {
            return false;
        }

        self.release_held(id);
        self.timers.cancel_owner(EntityRef::actor(id));
        self.intents.retain(|intent| intent.attacker != id);
        for (_, prop) in self.props.iter_mut() {
            if let PropState::Thrown {
                thrower, window, ..
            } = prop.state
            {
                if thrower == id {
                    self.timers.cancel(window);
                    prop.state = PropState::Free;
                }
            }
        }

        let Some(mut actor) = self.actors.remove(id) else {
            return false;
        };
        self.physics.remove_body(actor.body);
        actor.visual.detach();
        if self.player == Some(id) {
            self.player = None;
        }
        log::info!("Removed {}", actor.name);
        true
    }

    /// Remove a prop, clearing its holder's reference
    pub fn remove_object(&mut self, id: EntityId) -> bool {
        let Some(mut prop) = self.props.remove(id) else {
            return false;
        };

        self.timers.cancel_owner(EntityRef::prop(id));
        if let Some(holder) = prop.holder().and_then(|h| self.actors.get_mut(h)) {
            if holder.held == Some(id) {
                holder.held = None;
            }
        }
        self.physics.remove_body(prop.body);
        prop.visual.detach();
        log::debug!("Removed {:?} {}", prop.kind, id);
        true
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Feed raw key and pointer events here
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn object(&self, id: EntityId) -> Option<&Prop> {
        self.props.get(id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player.and_then(|id| self.actors.get(id))
    }

    /// Ids of every NPC, defeated ones included
    pub fn npc_ids(&self) -> Vec<EntityId> {
        self.actors
            .iter()
            .filter(|(_, a)| !a.is_player())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn npc_count(&self) -> usize {
        self.actors.iter().filter(|(_, a)| !a.is_player()).count()
    }

    pub fn object_ids(&self) -> Vec<EntityId> {
        self.props.ids()
    }

    pub fn actor_position(&self, id: EntityId) -> Option<Vec3> {
        let actor = self.actors.get(id)?;
        self.physics.body_position(actor.body).ok()
    }

    pub fn object_position(&self, id: EntityId) -> Option<Vec3> {
        let prop = self.props.get(id)?;
        self.physics.body_position(prop.body).ok()
    }

    pub fn object_velocity(&self, id: EntityId) -> Option<Vec3> {
        let prop = self.props.get(id)?;
        self.physics.linear_velocity(prop.body).ok()
    }

    fn player_position(&self) -> Option<Vec3> {
        self.player.and_then(|id| self.actor_position(id))
    }

    /// Move an actor and stop it, facing `yaw`
    pub fn place_actor(&mut self, id: EntityId, position: Vec3, yaw: f32) -> bool {
        let Some(actor) = self.actors.get_mut(id) else {
            return false;
        };
        actor.yaw = yaw;
        let body = actor.body;
        self.physics.teleport(body, position).is_ok()
            && self.physics.set_body_rotation(body, yaw_rotation(yaw)).is_ok()
    }

    /// Move a free prop and stop it
    pub fn place_object(&mut self, id: EntityId, position: Vec3) -> bool {
        match self.props.get(id) {
            Some(prop) if !prop.is_held() => self.physics.teleport(prop.body, position).is_ok(),
            _ => false,
        }
    }

    pub fn camera(&self) -> CameraPose {
        self.camera_pose
    }

    /// Seconds since the session started
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Log and drop a physics error on a handle that went stale
fn absorb(result: brawl_physics::Result<()>, context: &str) {
    if let Err(err) = result {
        log::warn!("{}: {}", context, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessScene;

    fn session(config: GameConfig) -> Session {
        Session::new(config, Box::new(HeadlessScene::new())).unwrap()
    }

    #[test]
    fn test_new_session_has_player_and_props() {
        let s = session(GameConfig::default());
        assert!(s.player().is_some());
        assert_eq!(s.object_ids().len(), 4);
        assert_eq!(s.npc_count(), 0);
        // 5 arena pieces, player, 4 props
        assert_eq!(s.physics().body_count(), 10);
    }

    #[test]
    fn test_spawn_npcs_fills_cap_with_names() {
        let mut s = session(GameConfig::default().without_objects());
        let spawned = s.spawn_npcs().unwrap();
        assert_eq!(spawned.len(), 4);
        assert!(s.spawn_npcs().unwrap().is_empty());

        let names: Vec<_> = spawned
            .iter()
            .map(|id| s.actor(*id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["NPC 1", "NPC 2", "NPC 3", "NPC 4"]);
        assert!(spawned.iter().all(|id| s.actor(*id).unwrap().brain().is_some()));
    }

    #[test]
    fn test_spawn_npc_without_points_fails() {
        let mut config = GameConfig::default().without_objects();
        config.npc.population_cap = 0;
        config.npc.spawn_points.clear();
        let mut s = session(config);
        assert!(matches!(s.spawn_npc(), Err(GameError::InvalidConfig(_))));
        assert!(s.spawn_npcs().unwrap().is_empty());
    }

    #[test]
    fn test_negative_dt_rejected() {
        let mut s = session(GameConfig::default());
        assert!(matches!(s.tick(-0.1), Err(GameError::Physics(_))));
        assert_eq!(s.frame(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.combat.melee_radius = 0.0;
        assert!(Session::new(config, Box::new(HeadlessScene::new())).is_err());
    }

    #[test]
    fn test_player_lands_and_camera_follows() {
        let mut s = session(GameConfig::default().without_objects());
        for _ in 0..60 {
            s.tick(1.0 / 60.0).unwrap();
        }
        let player = s.player().unwrap();
        assert!(player.grounded);
        let position = s.actor_position(player.id).unwrap();
        assert!((position.y - 0.95).abs() < 0.05, "player at {:?}", position);
        assert!(s.camera().position.z > position.z);
    }

    #[test]
    fn test_remove_object_clears_holder() {
        let mut config = GameConfig::default().without_objects();
        config.npc.population_cap = 0;
        let mut s = session(config);
        let player = s.player_id().unwrap();
        let bottle = s
            .spawn_object(ObjectKind::Bottle, Vec3::new(0.0, 0.2, -1.0))
            .unwrap();
        for _ in 0..30 {
            s.tick(1.0 / 60.0).unwrap();
        }
        assert!(s.place_object(bottle, Vec3::new(0.0, 0.2, -1.2)));
        s.tick(1.0 / 60.0).unwrap();
        assert_eq!(s.pickup(player), Some(bottle));
        // Held props stay in the hand
        assert!(!s.place_object(bottle, Vec3::new(3.0, 0.2, 3.0)));

        assert!(s.remove_object(bottle));
        assert_eq!(s.actor(player).unwrap().held(), None);
        assert!(s.object(bottle).is_none());
        assert!(!s.remove_object(bottle));
        s.tick(1.0 / 60.0).unwrap();
    }
}
