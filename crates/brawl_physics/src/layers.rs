//! Collision layers and filtering

use serde::{Deserialize, Serialize};

/// A collision layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Floor and walls
    pub const ENVIRONMENT: Self = Self(0);
    /// Player and NPCs
    pub const ACTORS: Self = Self(1);
    /// Bottles, glasses, chairs
    pub const PROPS: Self = Self(2);

    /// Get the layer as a bitmask
    pub fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

/// Collision groups for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    /// Which groups this object belongs to (membership)
    pub memberships: u32,
    /// Which groups this object can collide with (filter)
    pub filter: u32,
}

impl CollisionGroups {
    /// Collide with everything
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    /// Create from a single layer that collides with specific layers
    pub fn from_layer(layer: CollisionLayer, collides_with: &[CollisionLayer]) -> Self {
        let memberships = layer.as_mask();
        let filter = collides_with.iter().fold(0u32, |acc, l| acc | l.as_mask());
        Self { memberships, filter }
    }

    /// Groups for static arena geometry
    pub fn environment() -> Self {
        Self::from_layer(
            CollisionLayer::ENVIRONMENT,
            &[CollisionLayer::ACTORS, CollisionLayer::PROPS],
        )
    }

    /// Groups for characters
    pub fn actors() -> Self {
        Self::from_layer(
            CollisionLayer::ACTORS,
            &[
                CollisionLayer::ENVIRONMENT,
                CollisionLayer::ACTORS,
                CollisionLayer::PROPS,
            ],
        )
    }

    /// Groups for interactable props
    pub fn props() -> Self {
        Self::from_layer(
            CollisionLayer::PROPS,
            &[
                CollisionLayer::ENVIRONMENT,
                CollisionLayer::ACTORS,
                CollisionLayer::PROPS,
            ],
        )
    }

    /// Check if two groups can collide
    pub fn can_collide(&self, other: &CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}
