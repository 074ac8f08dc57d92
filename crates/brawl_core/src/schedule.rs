//! Delayed one-shot actions
//!
//! A min-heap keyed by due time. Every timer has an owning entity so an
//! entity being torn down can cancel everything it scheduled. Cancellation
//! is lazy: cancelled entries stay in the heap and are skipped on pop.

use crate::id::EntityRef;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Scheduled<A> {
    due: f64,
    id: TimerId,
    owner: EntityRef,
    action: A,
}

impl<A> PartialEq for Scheduled<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Scheduled<A> {}

impl<A> PartialOrd for Scheduled<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Scheduled<A> {
    // Reversed so the earliest due time sits at the top of the max-heap.
    // Ties go to the timer scheduled first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .partial_cmp(&self.due)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.id.0.cmp(&self.id.0))
    }
}

/// A timer that came due
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<A> {
    pub id: TimerId,
    pub owner: EntityRef,
    pub due: f64,
    pub action: A,
}

/// Priority queue of delayed actions
pub struct TimerQueue<A> {
    heap: BinaryHeap<Scheduled<A>>,
    /// Live (not cancelled, not fired) timers and their owners
    pending: HashMap<TimerId, EntityRef>,
    next_id: u64,
}

impl<A> TimerQueue<A> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `action` for `owner` at absolute time `due`
    pub fn schedule(&mut self, due: f64, owner: EntityRef, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, owner);
        self.heap.push(Scheduled {
            due,
            id,
            owner,
            action,
        });
        id
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Cancel every pending timer owned by `owner`, returning how many
    pub fn cancel_owner(&mut self, owner: EntityRef) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, o| *o != owner);
        before - self.pending.len()
    }

    /// Pop every live timer due at or before `now`, earliest first
    pub fn pop_due(&mut self, now: f64) -> Vec<Fired<A>> {
        let mut fired = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.due > now {
                break;
            }
            let Some(entry) = self.heap.pop() else {
                break;
            };
            if self.pending.remove(&entry.id).is_some() {
                fired.push(Fired {
                    id: entry.id,
                    owner: entry.owner,
                    due: entry.due,
                    action: entry.action,
                });
            }
        }
        fired
    }

    /// Number of live timers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if no timers are live
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityId;

    fn owner(i: u32) -> EntityRef {
        EntityRef::actor(EntityId::new(i, 0))
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(3.0, owner(0), "c");
        q.schedule(1.0, owner(0), "a");
        q.schedule(2.0, owner(0), "b");

        let fired: Vec<_> = q.pop_due(10.0).into_iter().map(|f| f.action).collect();
        assert_eq!(fired, vec!["a", "b", "c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_not_due_yet() {
        let mut q = TimerQueue::new();
        q.schedule(5.0, owner(0), ());
        assert!(q.pop_due(4.9).is_empty());
        assert_eq!(q.pop_due(5.0).len(), 1);
    }

    #[test]
    fn test_same_due_keeps_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, owner(0), 1);
        q.schedule(1.0, owner(0), 2);
        q.schedule(1.0, owner(0), 3);

        let fired: Vec<_> = q.pop_due(1.0).into_iter().map(|f| f.action).collect();
        assert_eq!(fired, vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel_single() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, owner(0), "keep");
        let drop = q.schedule(1.0, owner(0), "drop");

        assert!(q.cancel(drop));
        assert!(!q.cancel(drop));
        assert_eq!(q.len(), 1);

        let fired: Vec<_> = q.pop_due(2.0).into_iter().map(|f| f.action).collect();
        assert_eq!(fired, vec!["keep"]);
    }

    #[test]
    fn test_cancel_owner() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, owner(1), "npc");
        q.schedule(2.0, owner(1), "npc again");
        q.schedule(1.5, owner(2), "other");

        assert_eq!(q.cancel_owner(owner(1)), 2);
        assert_eq!(q.len(), 1);
        assert!(q.pop_due(1.4).is_empty());

        let fired = q.pop_due(10.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].owner, owner(2));
    }
}
