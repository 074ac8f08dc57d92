//! Room geometry: a floor and four walls
//!
//! Only what actors need to stand on and bump into. Decorative scene
//! content belongs to the renderer.

use brawl_core::{EntityId, EntityRef};
use brawl_physics::{
    ColliderDesc, ColliderShape, CollisionGroups, PhysicsMaterial, PhysicsWorld, RigidBodyDesc,
    RigidBodyHandle,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Room dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Half the room's size along X
    pub half_width: f32,
    /// Half the room's size along Z
    pub half_depth: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    pub floor_thickness: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_width: 10.0,
            half_depth: 10.0,
            wall_height: 3.0,
            wall_thickness: 0.2,
            floor_thickness: 0.2,
        }
    }
}

impl ArenaConfig {
    /// Is `point` inside the walls (ignoring height)
    pub fn contains(&self, point: Vec3) -> bool {
        point.x.abs() < self.half_width && point.z.abs() < self.half_depth
    }
}

/// Fixed bodies making up the room. The floor's top face is at y = 0.
pub fn build_arena(
    physics: &mut PhysicsWorld,
    config: &ArenaConfig,
) -> brawl_physics::Result<Vec<RigidBodyHandle>> {
    let half_floor = config.floor_thickness * 0.5;
    let half_wall = config.wall_thickness * 0.5;
    let half_height = config.wall_height * 0.5;

    // (center, half extents)
    let pieces = [
        (
            Vec3::new(0.0, -half_floor, 0.0),
            Vec3::new(config.half_width, half_floor, config.half_depth),
        ),
        (
            Vec3::new(0.0, half_height, -config.half_depth - half_wall),
            Vec3::new(config.half_width, half_height, half_wall),
        ),
        (
            Vec3::new(0.0, half_height, config.half_depth + half_wall),
            Vec3::new(config.half_width, half_height, half_wall),
        ),
        (
            Vec3::new(-config.half_width - half_wall, half_height, 0.0),
            Vec3::new(half_wall, half_height, config.half_depth),
        ),
        (
            Vec3::new(config.half_width + half_wall, half_height, 0.0),
            Vec3::new(half_wall, half_height, config.half_depth),
        ),
    ];

    let mut handles = Vec::with_capacity(pieces.len());
    for (index, (center, half)) in pieces.into_iter().enumerate() {
        let tag = EntityRef::fixed(EntityId::new(index as u32, 0));
        let body = physics.create_body(RigidBodyDesc::fixed().with_position(center), tag);
        physics.create_collider(
            ColliderDesc::new(ColliderShape::cuboid(half.x, half.y, half.z))
                .with_material(PhysicsMaterial::floor())
                .with_collision_groups(CollisionGroups::environment()),
            body,
        )?;
        handles.push(body);
    }

    log::debug!(
        "Arena built: {}x{} m, {} bodies",
        config.half_width * 2.0,
        config.half_depth * 2.0,
        handles.len()
    );
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_core::EntityKind;
    use brawl_physics::PhysicsConfig;

    #[test]
    fn test_arena_bodies_are_tagged_static() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        let handles = build_arena(&mut physics, &ArenaConfig::default()).unwrap();
        assert_eq!(handles.len(), 5);
        assert_eq!(physics.body_count(), 5);
        assert!(handles
            .iter()
            .all(|h| physics.tag_of(*h).map(|t| t.kind) == Some(EntityKind::Static)));
    }

    #[test]
    fn test_ball_rests_on_floor() {
        let mut physics = PhysicsWorld::new(PhysicsConfig::default());
        build_arena(&mut physics, &ArenaConfig::default()).unwrap();
        let ball = physics.create_body(
            RigidBodyDesc::dynamic().with_position(Vec3::new(0.0, 2.0, 0.0)),
            EntityRef::prop(EntityId::new(0, 0)),
        );
        physics
            .create_collider(ColliderDesc::new(ColliderShape::sphere(0.5)), ball)
            .unwrap();

        for _ in 0..180 {
            physics.step(1.0 / 60.0).unwrap();
        }
        let y = physics.body_position(ball).unwrap().y;
        assert!((y - 0.5).abs() < 0.05, "ball settled at {}", y);
    }

    #[test]
    fn test_contains() {
        let config = ArenaConfig::default();
        assert!(config.contains(Vec3::new(9.0, 5.0, -9.0)));
        assert!(!config.contains(Vec3::new(10.5, 0.0, 0.0)));
    }
}
