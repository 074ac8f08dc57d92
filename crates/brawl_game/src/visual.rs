//! Scene collaborator interface
//!
//! The session pushes transforms and animation toggles out through these
//! traits every tick and never reads anything back. A renderer implements
//! them; [`crate::headless::HeadlessScene`] records them in memory.

use crate::prop::ObjectKind;
use brawl_combat::AttackKind;
use brawl_core::EntityId;
use glam::{Quat, Vec3};

/// Which side an actor plays on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Player,
    Npc,
}

/// A visual the core writes to
pub trait VisualHandle {
    /// Pose of the visual this frame
    fn set_transform(&mut self, position: Vec3, rotation: Quat);

    fn set_visible(&mut self, visible: bool);

    /// The entity is gone; release the visual
    fn detach(&mut self);
}

/// Animation capabilities of a character visual
pub trait ActorVisual: VisualHandle {
    fn set_walking(&mut self, walking: bool);

    /// One-shot attack animation
    fn play_attack(&mut self, kind: AttackKind);

    fn set_jumping(&mut self, jumping: bool);
}

/// Creates visuals for new entities
pub trait SceneHost {
    fn attach_actor(&mut self, id: EntityId, name: &str, role: Role) -> Box<dyn ActorVisual>;

    fn attach_prop(&mut self, id: EntityId, kind: ObjectKind) -> Box<dyn VisualHandle>;
}
