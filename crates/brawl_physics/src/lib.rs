//! Brawl Physics - Rapier 3D Integration
//!
//! The single owner of rigid-body simulation state for a brawl session.
//! Every other component gets a reference to the [`PhysicsWorld`] and goes
//! through its methods; nothing else keeps a copy of body transforms.
//!
//! # Features
//!
//! - Static, dynamic and kinematic bodies, switchable at runtime
//! - Body tags resolving a rapier body back to its owning actor or prop
//! - Contact-normal feedback for ground detection
//! - Fixed-timestep stepping with an accumulator
//! - Per-collider materials (friction, restitution, combine rules)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 PhysicsWorld                     │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────┐ │
//! │  │ RigidBodySet│  │ ColliderSet │  │  Tags   │ │
//! │  └─────────────┘  └─────────────┘  └─────────┘ │
//! │  ┌─────────────────────────────────────────────┐│
//! │  │           PhysicsPipeline                   ││
//! │  │  (integration, collision, solver)          ││
//! │  └─────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use brawl_physics::prelude::*;
//!
//! let mut physics = PhysicsWorld::new(PhysicsConfig::default());
//!
//! let body = physics.create_body(
//!     RigidBodyDesc::dynamic().with_position(Vec3::new(0.0, 10.0, 0.0)),
//!     EntityRef::prop(id),
//! );
//! physics.create_collider(ColliderDesc::new(ColliderShape::sphere(0.5)), body)?;
//!
//! physics.step(1.0 / 60.0)?;
//! ```

pub mod body;
pub mod collider;
pub mod config;
pub mod error;
pub mod events;
pub mod layers;
pub mod material;
pub mod world;

pub mod prelude {
    //! Common imports for physics functionality
    pub use crate::body::{BodyMode, RigidBodyDesc, RigidBodyHandle, RotationLock};
    pub use crate::collider::{ColliderDesc, ColliderHandle, ColliderShape};
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::events::{CollisionEvent, CollisionEventType, ContactNormal};
    pub use crate::layers::{CollisionGroups, CollisionLayer};
    pub use crate::material::{CombineRule, PhysicsMaterial};
    pub use crate::world::PhysicsWorld;
    pub use brawl_core::{EntityId, EntityKind, EntityRef};
    pub use glam::{Quat, Vec3};
}

pub use prelude::*;
