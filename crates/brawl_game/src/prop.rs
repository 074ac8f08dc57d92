//! Interactable props: bottles, glasses and chairs
//!
//! A prop is always in exactly one of three states. `Free` props are plain
//! dynamic bodies. `Held` props are kinematic sensors posed at their
//! holder's hand every tick. `Thrown` props fly free while a hit window is
//! open; the window closes on the first hit or when its timer fires.

use crate::visual::VisualHandle;
use brawl_core::{EntityId, TimerId};
use brawl_physics::{ColliderDesc, ColliderShape, PhysicsMaterial, RigidBodyHandle};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Kind of prop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Bottle,
    Glass,
    Chair,
}

impl ObjectKind {
    /// Collision shape of the prop, centered on its body
    pub fn shape(&self) -> ColliderShape {
        match self {
            Self::Bottle => ColliderShape::cylinder(0.15, 0.05),
            Self::Glass => ColliderShape::cylinder(0.06, 0.04),
            Self::Chair => ColliderShape::cuboid(0.25, 0.45, 0.25),
        }
    }

    /// Surface material of the prop
    pub fn material(&self) -> PhysicsMaterial {
        match self {
            Self::Bottle | Self::Glass => PhysicsMaterial::glass(),
            Self::Chair => PhysicsMaterial::wood(),
        }
    }

    /// Collider description for the prop's body
    pub fn collider(&self) -> ColliderDesc {
        ColliderDesc::new(self.shape())
            .with_material(self.material())
            .with_collision_groups(brawl_physics::CollisionGroups::props())
            .with_collision_events(true)
    }
}

/// Throw and carry tuning of one prop kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectProfile {
    /// Launch speed in m/s
    pub throw_strength: f32,
    /// Damage dealt by a thrown hit
    pub damage: f32,
    /// Carry position in the holder's frame (-Z is forward)
    pub hand_offset: Vec3,
}

/// Where a prop starts when the session is built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub kind: ObjectKind,
    pub position: Vec3,
}

/// Prop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    pub bottle: ObjectProfile,
    pub glass: ObjectProfile,
    pub chair: ObjectProfile,
    /// Horizontal reach of a pickup
    pub pickup_range: f32,
    /// Added to the unit forward vector before normalizing the throw direction
    pub upward_bias: f32,
    /// Each spin axis gets a uniform draw from `±spin` rad/s
    pub spin: f32,
    pub placements: Vec<ObjectPlacement>,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            bottle: ObjectProfile {
                throw_strength: 15.0,
                damage: 20.0,
                hand_offset: Vec3::new(0.3, 0.1, -0.5),
            },
            glass: ObjectProfile {
                throw_strength: 16.0,
                damage: 15.0,
                hand_offset: Vec3::new(0.3, 0.1, -0.5),
            },
            chair: ObjectProfile {
                throw_strength: 9.0,
                damage: 25.0,
                hand_offset: Vec3::new(0.0, 0.3, -0.8),
            },
            pickup_range: 2.0,
            upward_bias: 0.2,
            spin: 6.0,
            placements: vec![
                ObjectPlacement {
                    kind: ObjectKind::Bottle,
                    position: Vec3::new(1.5, 0.5, -2.0),
                },
                ObjectPlacement {
                    kind: ObjectKind::Glass,
                    position: Vec3::new(-1.5, 0.5, -2.0),
                },
                ObjectPlacement {
                    kind: ObjectKind::Chair,
                    position: Vec3::new(3.0, 0.6, 2.0),
                },
                ObjectPlacement {
                    kind: ObjectKind::Bottle,
                    position: Vec3::new(-3.0, 0.5, 3.0),
                },
            ],
        }
    }
}

impl ObjectConfig {
    /// Profile of a prop kind
    pub fn profile(&self, kind: ObjectKind) -> &ObjectProfile {
        match kind {
            ObjectKind::Bottle => &self.bottle,
            ObjectKind::Glass => &self.glass,
            ObjectKind::Chair => &self.chair,
        }
    }

    /// Unit launch direction for an actor facing `forward`
    pub fn throw_direction(&self, forward: Vec3) -> Vec3 {
        (forward + Vec3::Y * self.upward_bias).normalize_or_zero()
    }
}

/// Prop life-cycle state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropState {
    Free,
    Held {
        holder: EntityId,
    },
    Thrown {
        thrower: EntityId,
        damage: f32,
        /// Timer that closes the hit window
        window: TimerId,
    },
}

/// A physics-backed prop
pub struct Prop {
    pub id: EntityId,
    pub kind: ObjectKind,
    pub body: RigidBodyHandle,
    pub(crate) visual: Box<dyn VisualHandle>,
    pub(crate) state: PropState,
}

impl Prop {
    pub fn state(&self) -> PropState {
        self.state
    }

    /// Actor currently holding this prop
    pub fn holder(&self) -> Option<EntityId> {
        match self.state {
            PropState::Held { holder } => Some(holder),
            _ => None,
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, PropState::Held { .. })
    }

    /// True while the hit window of a throw is open
    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, PropState::Thrown { .. })
    }
}

impl std::fmt::Debug for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prop")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("body", &self.body)
            .field("state", &self.state)
            .finish()
    }
}
