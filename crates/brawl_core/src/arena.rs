//! Generational arena for entity storage
//!
//! Entities are addressed by [`EntityId`]. Removing an entity bumps its slot
//! generation, so every id handed out before the removal stops resolving.

use crate::id::EntityId;

/// Storage for one kind of entity
pub struct EntityArena<T> {
    /// Generation of each slot
    generations: Vec<u32>,
    /// Slot contents
    values: Vec<Option<T>>,
    /// Freed slots available for reuse
    free_list: Vec<u32>,
}

impl<T> EntityArena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            values: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Reserve the id the next insert will use
    fn next_id(&mut self) -> EntityId {
        if let Some(index) = self.free_list.pop() {
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.values.push(None);
            EntityId::new(index, 0)
        }
    }

    /// Insert a value and get its id
    pub fn insert(&mut self, value: T) -> EntityId {
        self.insert_with(|_| value)
    }

    /// Insert a value that needs to know its own id while being built
    pub fn insert_with<F>(&mut self, build: F) -> EntityId
    where
        F: FnOnce(EntityId) -> T,
    {
        let id = self.next_id();
        self.values[id.index() as usize] = Some(build(id));
        id
    }

    /// Insert a value whose construction may fail. On failure the reserved
    /// slot goes back to the free list untouched.
    pub fn try_insert_with<F, E>(&mut self, build: F) -> Result<EntityId, E>
    where
        F: FnOnce(EntityId) -> Result<T, E>,
    {
        let id = self.next_id();
        match build(id) {
            Ok(value) => {
                self.values[id.index() as usize] = Some(value);
                Ok(id)
            }
            Err(e) => {
                self.free_list.push(id.index());
                Err(e)
            }
        }
    }

    /// Remove a value, invalidating its id
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        if !self.contains(id) {
            return None;
        }
        let index = id.index() as usize;
        let value = self.values[index].take();
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_list.push(id.index());
        value
    }

    /// Check whether an id still resolves
    pub fn contains(&self, id: EntityId) -> bool {
        let index = id.index() as usize;
        index < self.generations.len()
            && self.generations[index] == id.generation()
            && self.values[index].is_some()
    }

    /// Look up a value
    pub fn get(&self, id: EntityId) -> Option<&T> {
        if !self.contains(id) {
            return None;
        }
        self.values[id.index() as usize].as_ref()
    }

    /// Look up a value mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if !self.contains(id) {
            return None;
        }
        self.values[id.index() as usize].as_mut()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Check if no entities are live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of live ids, in slot order
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Iterate over live entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        let generations = &self.generations;
        self.values.iter().enumerate().filter_map(move |(i, slot)| {
            slot.as_ref()
                .map(|v| (EntityId::new(i as u32, generations[i]), v))
        })
    }

    /// Iterate over live entities mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        let generations = &self.generations;
        self.values.iter_mut().enumerate().filter_map(move |(i, slot)| {
            slot.as_mut()
                .map(|v| (EntityId::new(i as u32, generations[i]), v))
        })
    }
}

impl<T> Default for EntityArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = EntityArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_ne!(a, b);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_stale_id_after_reuse() {
        let mut arena = EntityArena::new();
        let old = arena.insert(1);
        assert_eq!(arena.remove(old), Some(1));
        assert!(arena.get(old).is_none());

        let new = arena.insert(2);
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_insert_with_sees_own_id() {
        let mut arena = EntityArena::new();
        let id = arena.insert_with(|id| id);
        assert_eq!(arena.get(id), Some(&id));
    }

    #[test]
    fn test_failed_insert_releases_slot() {
        let mut arena: EntityArena<u32> = EntityArena::new();
        let failed: Result<EntityId, &str> = arena.try_insert_with(|_| Err("nope"));
        assert!(failed.is_err());
        assert!(arena.is_empty());

        let id = arena.insert(5);
        assert_eq!(id.index(), 0);
    }

    #[test]
    fn test_iter_skips_removed() {
        let mut arena = EntityArena::new();
        let a = arena.insert(10);
        let b = arena.insert(20);
        arena.remove(a);

        let live: Vec<_> = arena.iter().collect();
        assert_eq!(live, vec![(b, &20)]);
    }
}
