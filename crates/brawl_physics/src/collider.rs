//! Collider types

use crate::layers::CollisionGroups;
use crate::material::PhysicsMaterial;
use glam::Vec3;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub(crate) rapier::ColliderHandle);

impl ColliderHandle {
    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::ColliderHandle {
        self.0
    }
}

/// Shapes the brawl room is built from: boxes for bodies, walls and
/// chairs, Y-up cylinders for feet, bottles and glasses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    Box { half_extents: [f32; 3] },
    CylinderY { half_height: f32, radius: f32 },
}

impl Default for ColliderShape {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl ColliderShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box from half extents
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: [hx, hy, hz],
        }
    }

    /// Upright cylinder
    pub fn cylinder(half_height: f32, radius: f32) -> Self {
        Self::CylinderY {
            half_height,
            radius,
        }
    }

    pub(crate) fn to_rapier(self) -> rapier::SharedShape {
        match self {
            Self::Sphere { radius } => rapier::SharedShape::ball(radius),
            Self::Box { half_extents: [hx, hy, hz] } => rapier::SharedShape::cuboid(hx, hy, hz),
            Self::CylinderY {
                half_height,
                radius,
            } => rapier::SharedShape::cylinder(half_height, radius),
        }
    }
}

/// Description for creating a collider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderDesc {
    /// Collision shape
    pub shape: ColliderShape,
    /// Position offset from parent body
    pub offset: Vec3,
    /// Is this a sensor (no physical response)
    pub is_sensor: bool,
    /// Physics material; `None` uses the world's default friction and restitution
    pub material: Option<PhysicsMaterial>,
    /// Collision groups
    pub collision_groups: CollisionGroups,
    /// Report collision start/stop events for this collider
    pub report_collisions: bool,
}

impl Default for ColliderDesc {
    fn default() -> Self {
        Self {
            shape: ColliderShape::default(),
            offset: Vec3::ZERO,
            is_sensor: false,
            material: None,
            collision_groups: CollisionGroups::ALL,
            report_collisions: false,
        }
    }
}

impl ColliderDesc {
    /// Create a new collider description with a shape
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// Set position offset
    pub fn with_offset(mut self, x: f32, y: f32, z: f32) -> Self {
        self.offset = Vec3::new(x, y, z);
        self
    }

    /// Set as sensor
    pub fn with_sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }

    /// Set material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = Some(material);
        self
    }

    /// Set collision groups
    pub fn with_collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_groups = groups;
        self
    }

    /// Enable collision events
    pub fn with_collision_events(mut self, enabled: bool) -> Self {
        self.report_collisions = enabled;
        self
    }

    /// Build a Rapier collider builder
    pub(crate) fn to_rapier_builder(
        &self,
        user_data: u128,
        fallback: &PhysicsMaterial,
    ) -> rapier::ColliderBuilder {
        let material = self.material.as_ref().unwrap_or(fallback);
        let events = if self.report_collisions {
            rapier::ActiveEvents::COLLISION_EVENTS
        } else {
            rapier::ActiveEvents::empty()
        };

        rapier::ColliderBuilder::new(self.shape.to_rapier())
            .translation(rapier::Vector::new(self.offset.x, self.offset.y, self.offset.z))
            .sensor(self.is_sensor)
            .friction(material.friction)
            .restitution(material.restitution)
            .density(material.density)
            .friction_combine_rule(material.friction_combine.into())
            .restitution_combine_rule(material.restitution_combine.into())
            .collision_groups(rapier::InteractionGroups::new(
                rapier::Group::from_bits_truncate(self.collision_groups.memberships),
                rapier::Group::from_bits_truncate(self.collision_groups.filter),
            ))
            .active_events(events)
            .user_data(user_data)
    }
}
