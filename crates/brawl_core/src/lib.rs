//! # brawl_core - Brawl Room Core
//!
//! Zero-dependency primitives shared by every simulation crate:
//! - **Ids**: generational entity ids that detect stale references
//! - **Arena**: entity storage addressed by those ids
//! - **Schedule**: a cancellable min-heap of delayed actions
//!
//! Everything runs on a single cooperative tick, so nothing here is
//! synchronized. Components look entities up by id each frame instead of
//! holding references, which keeps respawn and removal from leaving
//! dangling pointers behind.

pub mod arena;
pub mod id;
pub mod schedule;

pub use arena::*;
pub use id::*;
pub use schedule::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::arena::EntityArena;
    pub use crate::id::{EntityId, EntityKind, EntityRef};
    pub use crate::schedule::{TimerId, TimerQueue};
}
