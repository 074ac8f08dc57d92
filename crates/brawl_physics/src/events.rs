//! Physics events (collisions, contact feedback)

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;
use brawl_core::EntityRef;
use glam::Vec3;

/// Type of collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Collision started
    Started,
    /// Collision ended
    Stopped,
}

/// A collision event between two colliders
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// First collider
    pub collider1: ColliderHandle,
    /// Second collider
    pub collider2: ColliderHandle,
    /// Event type
    pub event_type: CollisionEventType,
    /// Whether either collider is a sensor
    pub is_sensor: bool,
    /// Owner of collider 1, if tagged and still alive
    pub tag1: Option<EntityRef>,
    /// Owner of collider 2, if tagged and still alive
    pub tag2: Option<EntityRef>,
}

impl CollisionEvent {
    /// Check if this is a start event
    pub fn is_started(&self) -> bool {
        self.event_type == CollisionEventType::Started
    }

    /// Does this event involve the given entity
    pub fn involves(&self, tag: EntityRef) -> bool {
        self.tag1 == Some(tag) || self.tag2 == Some(tag)
    }

    /// The other party of an event involving `tag`
    pub fn other(&self, tag: EntityRef) -> Option<EntityRef> {
        if self.tag1 == Some(tag) {
            self.tag2
        } else if self.tag2 == Some(tag) {
            self.tag1
        } else {
            None
        }
    }
}

/// One active contact touching a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactNormal {
    /// Unit normal pointing into the queried body, away from `other`
    pub normal: Vec3,
    /// The body on the other side of the contact
    pub other: RigidBodyHandle,
    /// Owner of the other body
    pub other_tag: Option<EntityRef>,
}

impl ContactNormal {
    /// True when the contact supports the body from below
    pub fn is_ground(&self, threshold: f32) -> bool {
        self.normal.y >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_core::EntityId;
    use rapier3d::prelude as rapier;

    fn event(tag1: Option<EntityRef>, tag2: Option<EntityRef>) -> CollisionEvent {
        CollisionEvent {
            collider1: ColliderHandle(rapier::ColliderHandle::invalid()),
            collider2: ColliderHandle(rapier::ColliderHandle::invalid()),
            event_type: CollisionEventType::Started,
            is_sensor: false,
            tag1,
            tag2,
        }
    }

    #[test]
    fn test_other_party() {
        let actor = EntityRef::actor(EntityId::new(0, 0));
        let prop = EntityRef::prop(EntityId::new(0, 0));
        let e = event(Some(actor), Some(prop));

        assert!(e.involves(actor));
        assert_eq!(e.other(actor), Some(prop));
        assert_eq!(e.other(prop), Some(actor));
        assert_eq!(e.other(EntityRef::fixed(EntityId::new(3, 0))), None);
    }

    #[test]
    fn test_ground_threshold() {
        let contact = ContactNormal {
            normal: Vec3::new(0.0, 0.6, 0.8),
            other: RigidBodyHandle(rapier::RigidBodyHandle::invalid()),
            other_tag: None,
        };
        assert!(contact.is_ground(0.5));
        assert!(!contact.is_ground(0.7));
    }
}
