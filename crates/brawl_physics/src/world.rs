//! The physics world adapter
//!
//! Wraps one rapier pipeline. Bodies carry an [`EntityRef`] in their user
//! data so contacts and events resolve back to game entities.

use crate::body::{BodyMode, RigidBodyDesc, RigidBodyHandle};
use crate::collider::{ColliderDesc, ColliderHandle};
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::events::{CollisionEvent, CollisionEventType, ContactNormal};
use crate::material::PhysicsMaterial;
use brawl_core::EntityRef;
use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use std::num::NonZeroUsize;

/// Sole owner of the simulation state. Everything else addresses bodies
/// through [`RigidBodyHandle`]s and reads back through these methods.
pub struct PhysicsWorld {
    config: PhysicsConfig,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    pipeline: rapier::PhysicsPipeline,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    // Unused by the brawl scene but required by the pipeline
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    /// Applied to colliders built without a material
    default_material: PhysicsMaterial,
    /// Collision events raised during the last `step`
    events: Vec<CollisionEvent>,
    /// Time not yet consumed by fixed substeps
    accumulated_time: f32,
}

impl PhysicsWorld {
    /// Create a new physics world
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.solver_iterations).unwrap_or(NonZeroUsize::MIN);

        let default_material =
            PhysicsMaterial::new(config.default_friction, config.default_restitution);

        log::info!(
            "Physics world created (gravity {:?}, timestep {:.4}s)",
            config.gravity,
            config.timestep
        );

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            default_material,
            events: Vec::new(),
            accumulated_time: 0.0,
        }
    }

    /// Get the physics configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Get gravity
    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    // ==================== Rigid Bodies ====================

    /// Create a rigid body owned by `tag`
    pub fn create_body(&mut self, desc: RigidBodyDesc, tag: EntityRef) -> RigidBodyHandle {
        let desc = RigidBodyDesc {
            ccd_enabled: desc.ccd_enabled && self.config.ccd_enabled,
            ..desc
        };
        let handle = self.bodies.insert(desc.to_rapier_builder(tag.to_bits()));
        log::trace!("Created {:?} body for {}", desc.mode, tag);
        RigidBodyHandle(handle)
    }

    /// Remove a rigid body and every collider attached to it.
    /// Returns false if the body was already gone.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        let removed = self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true, // Remove attached colliders
        );
        if removed.is_none() {
            log::warn!("Tried to remove missing body {:?}", handle);
        }
        removed.is_some()
    }

    /// Resolve a body back to its owner
    pub fn tag_of(&self, handle: RigidBodyHandle) -> Option<EntityRef> {
        self.bodies
            .get(handle.0)
            .and_then(|b| EntityRef::from_bits(b.user_data))
    }

    /// Enumerate live bodies with their owners
    pub fn bodies(&self) -> impl Iterator<Item = (RigidBodyHandle, Option<EntityRef>)> + '_ {
        self.bodies
            .iter()
            .map(|(h, b)| (RigidBodyHandle(h), EntityRef::from_bits(b.user_data)))
    }

    /// Get rigid body position
    pub fn body_position(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let pos = b.translation();
                Vec3::new(pos.x, pos.y, pos.z)
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get rigid body rotation
    pub fn body_rotation(&self, handle: RigidBodyHandle) -> Result<Quat> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let rot = b.rotation();
                Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w)
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Set rigid body position, keeping velocity and rotation
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec3) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_translation(to_vector(position), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Set rigid body rotation
    pub fn set_body_rotation(&mut self, handle: RigidBodyHandle, rotation: Quat) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_rotation(to_rotation(rotation), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Place a body at an exact pose this frame.
    /// Kinematic bodies also get the pose as their step target, so the
    /// solver won't drag them back toward a stale one.
    pub fn set_body_pose(
        &mut self,
        handle: RigidBodyHandle,
        position: Vec3,
        rotation: Quat,
    ) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                let iso = rapier::Isometry::from_parts(
                    rapier::Translation::new(position.x, position.y, position.z),
                    to_rotation(rotation),
                );
                b.set_position(iso, true);
                if b.is_kinematic() {
                    b.set_next_kinematic_position(iso);
                }
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Move a body to `position` and stop it dead
    pub fn teleport(&mut self, handle: RigidBodyHandle, position: Vec3) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_translation(to_vector(position), true);
                b.set_linvel(rapier::Vector::zeros(), true);
                b.set_angvel(rapier::Vector::zeros(), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get rigid body linear velocity
    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let vel = b.linvel();
                Vec3::new(vel.x, vel.y, vel.z)
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Set rigid body linear velocity
    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_linvel(to_vector(velocity), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Get rigid body angular velocity
    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Result<Vec3> {
        self.bodies
            .get(handle.0)
            .map(|b| {
                let vel = b.angvel();
                Vec3::new(vel.x, vel.y, vel.z)
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Set rigid body angular velocity
    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> Result<()> {
        self.bodies
            .get_mut(handle.0)
            .map(|b| {
                b.set_angvel(to_vector(velocity), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Current simulation mode of a body
    pub fn body_mode(&self, handle: RigidBodyHandle) -> Result<BodyMode> {
        self.bodies
            .get(handle.0)
            .map(|b| BodyMode::from(b.body_type()))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Switch a body between simulation modes.
    /// Entering `Kinematic` zeroes the body's velocity.
    pub fn set_body_mode(&mut self, handle: RigidBodyHandle, mode: BodyMode) -> Result<()> {
        let body = self
            .bodies
            .get_mut(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;

        // Rapier ignores velocity writes on position-based kinematic bodies,
        // so stop the body while it is still dynamic
        if mode == BodyMode::Kinematic {
            body.set_linvel(rapier::Vector::zeros(), true);
            body.set_angvel(rapier::Vector::zeros(), true);
        }
        body.set_body_type(mode.into(), true);
        Ok(())
    }

    // ==================== Colliders ====================

    /// Create a collider attached to a rigid body; it inherits the body's tag
    pub fn create_collider(
        &mut self,
        desc: ColliderDesc,
        parent: RigidBodyHandle,
    ) -> Result<ColliderHandle> {
        let user_data = self
            .bodies
            .get(parent.0)
            .map(|b| b.user_data)
            .ok_or(PhysicsError::BodyNotFound(parent))?;

        let builder = desc.to_rapier_builder(user_data, &self.default_material);
        let handle = self
            .colliders
            .insert_with_parent(builder, parent.0, &mut self.bodies);
        Ok(ColliderHandle(handle))
    }

    /// Turn contact response on or off for every collider of a body
    pub fn set_body_sensor(&mut self, handle: RigidBodyHandle, is_sensor: bool) -> Result<()> {
        let body = self
            .bodies
            .get(handle.0)
            .ok_or(PhysicsError::BodyNotFound(handle))?;

        for collider in body.colliders() {
            if let Some(c) = self.colliders.get_mut(*collider) {
                c.set_sensor(is_sensor);
            }
        }
        Ok(())
    }

    /// Check whether a collider is a sensor
    pub fn is_sensor(&self, handle: ColliderHandle) -> Result<bool> {
        self.colliders
            .get(handle.0)
            .map(|c| c.is_sensor())
            .ok_or(PhysicsError::ColliderNotFound(handle))
    }

    // ==================== Contacts ====================

    /// Normals of every active contact touching `handle`, each oriented to
    /// point into that body from the body it touches
    pub fn contact_normals(&self, handle: RigidBodyHandle) -> Vec<ContactNormal> {
        let Some(body) = self.bodies.get(handle.0) else {
            return Vec::new();
        };

        let mut normals = Vec::new();
        for &own in body.colliders() {
            for pair in self.narrow_phase.contact_pairs_with(own) {
                if !pair.has_any_active_contact {
                    continue;
                }

                // Rapier's normal points from collider1 toward collider2
                let (other, sign) = if pair.collider1 == own {
                    (pair.collider2, -1.0)
                } else {
                    (pair.collider1, 1.0)
                };
                let Some(other_body) = self.colliders.get(other).and_then(|c| c.parent()) else {
                    continue;
                };
                if other_body == handle.0 {
                    continue;
                }
                let other_tag = self
                    .bodies
                    .get(other_body)
                    .and_then(|b| EntityRef::from_bits(b.user_data));

                for manifold in &pair.manifolds {
                    if manifold.points.is_empty() {
                        continue;
                    }
                    let n = manifold.data.normal * sign;
                    let normal = Vec3::new(n.x, n.y, n.z);
                    if normal.length_squared() < 1.0e-6 {
                        continue;
                    }
                    normals.push(ContactNormal {
                        normal: normal.normalize(),
                        other: RigidBodyHandle(other_body),
                        other_tag,
                    });
                }
            }
        }
        normals
    }

    // ==================== Simulation ====================

    /// Advance the simulation by `delta_time` seconds using fixed substeps.
    /// Leftover time carries over to the next call. Returns the number of
    /// substeps taken.
    pub fn step(&mut self, delta_time: f32) -> Result<u32> {
        if !delta_time.is_finite() || delta_time < 0.0 {
            return Err(PhysicsError::InvalidTimestep(delta_time));
        }

        self.events.clear();
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.config.timestep && steps < self.config.max_substeps {
            self.step_internal();
            self.accumulated_time -= self.config.timestep;
            steps += 1;
        }

        // Drop the backlog rather than spiral when a frame runs long
        if steps == self.config.max_substeps && self.accumulated_time >= self.config.timestep {
            log::warn!(
                "Physics fell behind by {:.3}s, dropping backlog",
                self.accumulated_time
            );
            self.accumulated_time = 0.0;
        }

        log::trace!("Physics step {:.4}s -> {} substeps", delta_time, steps);
        Ok(steps)
    }

    /// Internal fixed timestep
    fn step_internal(&mut self) {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        while let Ok(event) = collision_recv.try_recv() {
            let (h1, h2, event_type) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, CollisionEventType::Started),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, CollisionEventType::Stopped),
            };

            let c1 = self.colliders.get(h1);
            let c2 = self.colliders.get(h2);

            let is_sensor = c1.map(|c| c.is_sensor()).unwrap_or(false)
                || c2.map(|c| c.is_sensor()).unwrap_or(false);

            self.events.push(CollisionEvent {
                collider1: ColliderHandle(h1),
                collider2: ColliderHandle(h2),
                event_type,
                is_sensor,
                tag1: c1.and_then(|c| EntityRef::from_bits(c.user_data)),
                tag2: c2.and_then(|c| EntityRef::from_bits(c.user_data)),
            });
        }
    }

    // ==================== Events ====================

    /// Get collision start events
    pub fn collision_started(&self) -> impl Iterator<Item = &CollisionEvent> {
        self.events.iter().filter(|e| e.is_started())
    }

    // ==================== Debug ====================

    /// Get number of rigid bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Get number of colliders
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

fn to_vector(v: Vec3) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y, v.z)
}

fn to_rotation(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Channel-based event collector for Rapier
struct ChannelEventCollector {
    collision_events: crossbeam_channel::Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}
