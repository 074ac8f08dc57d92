//! Pickup, carry and throw

use super::{absorb, Session, TimerAction};
use crate::actor::yaw_rotation;
use crate::events::GameEvent;
use crate::prop::{ObjectKind, PropState};
use brawl_combat::{horizontal, in_forward_arc};
use brawl_core::{EntityId, EntityRef, TimerId};
use brawl_physics::{BodyMode, RigidBodyHandle};
use glam::{Quat, Vec3};
use rand::Rng;

impl Session {
    /// Pick up the nearest prop in reach and in front of the actor.
    /// Returns the prop, or `None` (changing nothing) when the actor is
    /// defeated, already holds something, or nothing qualifies.
    pub fn pickup(&mut self, actor_id: EntityId) -> Option<EntityId> {
        let actor = self.actors.get(actor_id)?;
        if actor.is_defeated() || actor.held.is_some() {
            return None;
        }
        let origin = self.physics.body_position(actor.body).ok()?;
        let facing = actor.forward();
        let range = self.config.objects.pickup_range;
        let threshold = self.config.combat.arc_threshold;

        let (object, _) = self
            .props
            .iter()
            .filter(|(_, p)| !p.is_held())
            .filter_map(|(id, p)| {
                let position = self.physics.body_position(p.body).ok()?;
                let distance = horizontal(position - origin).length();
                (distance <= range && in_forward_arc(origin, facing, position, threshold))
                    .then_some((id, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        self.attach(actor_id, object);
        Some(object)
    }

    fn attach(&mut self, holder: EntityId, object: EntityId) {
        let Some(prop) = self.props.get_mut(object) else {
            return;
        };
        if let PropState::Thrown { window, .. } = prop.state {
            self.timers.cancel(window);
        }
        prop.state = PropState::Held { holder };
        let (body, kind) = (prop.body, prop.kind);

        absorb(self.physics.set_body_mode(body, BodyMode::Kinematic), "pickup");
        absorb(self.physics.set_body_sensor(body, true), "pickup");

        let Some(actor) = self.actors.get_mut(holder) else {
            return;
        };
        actor.held = Some(object);
        log::info!("{} picked up a {:?}", actor.name, kind);

        self.pose_held(object, holder, kind, body);
        self.events.push(GameEvent::ObjectPickedUp {
            actor: holder,
            object,
            kind,
        });
    }

    /// Throw whatever the actor holds. Returns the prop, or `None` when the
    /// actor holds nothing.
    pub fn throw_held(&mut self, actor_id: EntityId) -> Option<EntityId> {
        let actor = self.actors.get_mut(actor_id)?;
        let object = actor.held.take()?;
        let facing = actor.forward();

        let Some(prop) = self.props.get_mut(object) else {
            log::warn!("{} held a prop that no longer exists", actor.name);
            return None;
        };

        let objects = &self.config.objects;
        let profile = *objects.profile(prop.kind);
        let velocity = objects.throw_direction(facing) * profile.throw_strength;
        let spin = objects.spin;
        let angular = Vec3::new(
            self.rng.random_range(-spin..=spin),
            self.rng.random_range(-spin..=spin),
            self.rng.random_range(-spin..=spin),
        );

        let due = self.time + self.config.combat.throw_window as f64;
        let window = self
            .timers
            .schedule(due, EntityRef::prop(object), TimerAction::CloseThrowWindow);
        prop.state = PropState::Thrown {
            thrower: actor_id,
            damage: profile.damage,
            window,
        };

        let body = prop.body;
        absorb(self.physics.set_body_mode(body, BodyMode::Dynamic), "throw");
        absorb(self.physics.set_body_sensor(body, false), "throw");
        absorb(self.physics.set_linear_velocity(body, velocity), "throw");
        absorb(self.physics.set_angular_velocity(body, angular), "throw");

        log::info!(
            "{} threw a {:?} at {:.1} m/s",
            actor.name,
            prop.kind,
            velocity.length()
        );
        self.events.push(GameEvent::ObjectThrown {
            actor: actor_id,
            object,
            velocity,
        });
        Some(object)
    }

    /// Pose every held prop at its holder's hand
    pub(super) fn track_held_props(&mut self) {
        let held: Vec<(EntityId, EntityId, ObjectKind, RigidBodyHandle)> = self
            .props
            .iter()
            .filter_map(|(id, p)| p.holder().map(|h| (id, h, p.kind, p.body)))
            .collect();

        for (object, holder, kind, body) in held {
            let holder_ok = self
                .actors
                .get(holder)
                .is_some_and(|a| !a.is_defeated() && a.held == Some(object));
            if holder_ok {
                self.pose_held(object, holder, kind, body);
            } else {
                self.release(object);
            }
        }
    }

    fn pose_held(
        &mut self,
        object: EntityId,
        holder: EntityId,
        kind: ObjectKind,
        body: RigidBodyHandle,
    ) {
        let Some((position, rotation)) = self.hand_pose(holder, kind) else {
            return;
        };
        absorb(self.physics.set_body_pose(body, position, rotation), "carry");
        if let Some(prop) = self.props.get_mut(object) {
            prop.visual.set_transform(position, rotation);
        }
    }

    /// World pose of a prop of `kind` in `holder`'s hand
    fn hand_pose(&self, holder: EntityId, kind: ObjectKind) -> Option<(Vec3, Quat)> {
        let actor = self.actors.get(holder)?;
        let position = self.physics.body_position(actor.body).ok()?;
        let rotation = yaw_rotation(actor.yaw);
        let offset = self.config.objects.profile(kind).hand_offset;
        Some((position + rotation * offset, rotation))
    }

    /// Drop a held prop where it is
    pub(super) fn release(&mut self, object: EntityId) {
        let Some(prop) = self.props.get_mut(object) else {
            return;
        };
        let PropState::Held { holder } = prop.state else {
            return;
        };
        prop.state = PropState::Free;
        let body = prop.body;

        absorb(self.physics.set_body_mode(body, BodyMode::Dynamic), "release");
        absorb(self.physics.set_body_sensor(body, false), "release");
        absorb(self.physics.set_linear_velocity(body, Vec3::ZERO), "release");

        if let Some(actor) = self.actors.get_mut(holder) {
            if actor.held == Some(object) {
                actor.held = None;
            }
        }
        log::debug!("{:?} {} dropped", prop.kind, object);
    }

    /// Drop whatever the actor holds
    pub(super) fn release_held(&mut self, actor_id: EntityId) {
        if let Some(object) = self.actors.get(actor_id).and_then(|a| a.held) {
            self.release(object);
        }
    }

    /// The hit window of a throw ran out
    pub(super) fn close_throw_window(&mut self, object: EntityId, timer: TimerId) {
        if let Some(prop) = self.props.get_mut(object) {
            if matches!(prop.state, PropState::Thrown { window, .. } if window == timer) {
                prop.state = PropState::Free;
                log::debug!("Throw window of {:?} {} closed", prop.kind, object);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GameConfig;
    use crate::headless::HeadlessScene;
    use crate::prop::{ObjectKind, PropState};
    use crate::session::Session;
    use brawl_core::EntityRef;
    use brawl_physics::BodyMode;
    use glam::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn room() -> (Session, HeadlessScene) {
        let mut config = GameConfig::default().without_objects();
        config.npc.population_cap = 0;
        let scene = HeadlessScene::new();
        let mut s = Session::new(config, Box::new(scene.clone())).unwrap();
        for _ in 0..30 {
            s.tick(DT).unwrap();
        }
        (s, scene)
    }

    #[test]
    fn test_held_prop_follows_hand() {
        let (mut s, scene) = room();
        let player = s.player_id().unwrap();
        let chair = s
            .spawn_object(ObjectKind::Chair, Vec3::new(0.0, 0.5, -1.5))
            .unwrap();
        for _ in 0..30 {
            s.tick(DT).unwrap();
        }

        assert_eq!(s.pickup(player), Some(chair));
        let body = s.object(chair).unwrap().body;
        assert_eq!(s.physics().body_mode(body).unwrap(), BodyMode::Kinematic);

        s.input_mut().key_down("KeyD");
        for _ in 0..20 {
            s.tick(DT).unwrap();
        }

        let holder = s.actor_position(player).unwrap();
        let prop = s.object_position(chair).unwrap();
        // Hand offset is 0.8 ahead; allow for the one-step lag while moving
        let ahead = holder.z - prop.z;
        assert!((ahead - 0.8).abs() < 0.15, "prop {:?} holder {:?}", prop, holder);
        let record = scene.record(EntityRef::prop(chair)).unwrap();
        assert_eq!(record.position, prop);
    }

    #[test]
    fn test_throw_window_closes() {
        let (mut s, _) = room();
        let player = s.player_id().unwrap();
        let glass = s
            .spawn_object(ObjectKind::Glass, Vec3::new(0.0, 0.2, -1.0))
            .unwrap();
        for _ in 0..20 {
            s.tick(DT).unwrap();
        }
        s.pickup(player).unwrap();
        s.throw_held(player).unwrap();
        assert!(s.object(glass).unwrap().is_in_flight());

        // 3 s window
        for _ in 0..185 {
            s.tick(DT).unwrap();
        }
        assert_eq!(s.object(glass).unwrap().state(), PropState::Free);
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn test_thrown_prop_can_be_caught() {
        let (mut s, _) = room();
        let player = s.player_id().unwrap();
        let bottle = s
            .spawn_object(ObjectKind::Bottle, Vec3::new(0.0, 0.2, -1.0))
            .unwrap();
        for _ in 0..20 {
            s.tick(DT).unwrap();
        }
        s.pickup(player).unwrap();
        s.throw_held(player).unwrap();
        assert_eq!(s.pending_timers(), 1);

        assert!(s.object_velocity(bottle).unwrap().length() > 10.0);

        // Still within reach on the way out
        assert_eq!(s.pickup(player), Some(bottle));
        assert_eq!(s.pending_timers(), 0);
        assert_eq!(s.object(bottle).unwrap().holder(), Some(player));
        // Caught dead in the hand
        assert_eq!(s.object_velocity(bottle), Some(Vec3::ZERO));
        let body = s.object(bottle).unwrap().body;
        assert_eq!(s.physics().angular_velocity(body).unwrap(), Vec3::ZERO);
    }
}
