//! In-memory scene collaborator
//!
//! Records the last state written to every visual. Clones share the same
//! records, so a caller can keep one clone and inspect what the session
//! wrote through another.

use crate::prop::ObjectKind;
use crate::visual::{ActorVisual, Role, SceneHost, VisualHandle};
use brawl_combat::AttackKind;
use brawl_core::{EntityId, EntityRef};
use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Last known state of one visual
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRecord {
    pub name: String,
    pub role: Option<Role>,
    pub prop_kind: Option<ObjectKind>,
    pub position: Vec3,
    pub rotation: Quat,
    pub visible: bool,
    pub walking: bool,
    pub jumping: bool,
    /// Every attack animation played, oldest first
    pub attacks: Vec<AttackKind>,
    pub attached: bool,
    pub transform_writes: u64,
}

impl VisualRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            role: None,
            prop_kind: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            visible: true,
            walking: false,
            jumping: false,
            attacks: Vec::new(),
            attached: true,
            transform_writes: 0,
        }
    }
}

type Records = Rc<RefCell<HashMap<EntityRef, VisualRecord>>>;

/// Scene host that keeps visuals as plain records
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    records: Records,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one visual's record
    pub fn record(&self, tag: EntityRef) -> Option<VisualRecord> {
        self.records.borrow().get(&tag).cloned()
    }

    /// Number of visuals still attached
    pub fn attached_count(&self) -> usize {
        self.records.borrow().values().filter(|r| r.attached).count()
    }
}

impl SceneHost for HeadlessScene {
    fn attach_actor(&mut self, id: EntityId, name: &str, role: Role) -> Box<dyn ActorVisual> {
        let tag = EntityRef::actor(id);
        let mut record = VisualRecord::new(name.to_string());
        record.role = Some(role);
        self.records.borrow_mut().insert(tag, record);
        Box::new(HeadlessVisual {
            tag,
            records: Rc::clone(&self.records),
        })
    }

    fn attach_prop(&mut self, id: EntityId, kind: ObjectKind) -> Box<dyn VisualHandle> {
        let tag = EntityRef::prop(id);
        let mut record = VisualRecord::new(format!("{:?}", kind));
        record.prop_kind = Some(kind);
        self.records.borrow_mut().insert(tag, record);
        Box::new(HeadlessVisual {
            tag,
            records: Rc::clone(&self.records),
        })
    }
}

/// Handle writing into a [`HeadlessScene`] record
struct HeadlessVisual {
    tag: EntityRef,
    records: Records,
}

impl HeadlessVisual {
    fn update(&self, f: impl FnOnce(&mut VisualRecord)) {
        if let Some(record) = self.records.borrow_mut().get_mut(&self.tag) {
            f(record);
        }
    }
}

impl VisualHandle for HeadlessVisual {
    fn set_transform(&mut self, position: Vec3, rotation: Quat) {
        self.update(|r| {
            r.position = position;
            r.rotation = rotation;
            r.transform_writes += 1;
        });
    }

    fn set_visible(&mut self, visible: bool) {
        self.update(|r| r.visible = visible);
    }

    fn detach(&mut self) {
        self.update(|r| {
            r.attached = false;
            r.visible = false;
        });
    }
}

impl ActorVisual for HeadlessVisual {
    fn set_walking(&mut self, walking: bool) {
        self.update(|r| r.walking = walking);
    }

    fn play_attack(&mut self, kind: AttackKind) {
        self.update(|r| r.attacks.push(kind));
    }

    fn set_jumping(&mut self, jumping: bool) {
        self.update(|r| r.jumping = jumping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_records() {
        let scene = HeadlessScene::new();
        let mut host = scene.clone();
        let id = EntityId::new(0, 0);

        let mut visual = host.attach_actor(id, "NPC 1", Role::Npc);
        visual.set_transform(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        visual.set_walking(true);
        visual.play_attack(AttackKind::Kick);

        let record = scene.record(EntityRef::actor(id)).unwrap();
        assert_eq!(record.name, "NPC 1");
        assert_eq!(record.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(record.walking);
        assert_eq!(record.attacks, vec![AttackKind::Kick]);
        assert_eq!(scene.attached_count(), 1);

        visual.detach();
        assert_eq!(scene.attached_count(), 0);
    }

    #[test]
    fn test_prop_and_actor_records_are_separate() {
        let mut scene = HeadlessScene::new();
        let id = EntityId::new(3, 0);
        let _actor = scene.attach_actor(id, "Player", Role::Player);
        let mut prop = scene.attach_prop(id, ObjectKind::Chair);
        prop.set_visible(false);

        assert!(scene.record(EntityRef::actor(id)).unwrap().visible);
        let record = scene.record(EntityRef::prop(id)).unwrap();
        assert!(!record.visible);
        assert_eq!(record.prop_kind, Some(ObjectKind::Chair));
    }
}
