//! Brawl AI - NPC Steering and Decisions
//!
//! # Features
//!
//! - Ground-plane steering: seek, pairwise separation, random jitter
//! - Per-NPC behavior record with individual speed and aim point
//! - Idle / pursue / engage decision with cooldown-gated attacks
//!
//! Decisions are pure data; the caller applies them to the NPC's body and
//! actor state.
//!
//! # Example
//!
//! ```ignore
//! use brawl_ai::prelude::*;
//!
//! let mut brain = NpcBrain::new(&config, now, &mut rng);
//! let ctx = NpcContext { now, position, player: Some(player_pos), neighbors: &others };
//! match brain.think(&ctx, &config, &mut rng) {
//!     NpcDecision::Pursue { direction, speed, .. } => walk(direction * speed),
//!     NpcDecision::Engage { facing, attack } => swing(facing, attack),
//!     NpcDecision::Idle => stop(),
//! }
//! ```

pub mod npc;
pub mod steering;

pub mod prelude {
    pub use crate::npc::{NpcBrain, NpcConfig, NpcContext, NpcDecision};
    pub use crate::steering::{SteeringOutput, SteeringWeights};
}

pub use prelude::*;
