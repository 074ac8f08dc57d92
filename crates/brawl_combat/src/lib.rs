//! Brawl Combat - Vitals, Attacks and Hit Resolution
//!
//! # Features
//!
//! - Health clamped to `[0, 100]` plus a non-negative score
//! - Punch and kick profiles (damage, animation lock)
//! - Melee resolution: radius plus forward-arc test, multi-target
//! - Thrown-prop resolution: hit radius plus minimum speed
//!
//! # Example
//!
//! ```ignore
//! use brawl_combat::prelude::*;
//!
//! let config = CombatConfig::default();
//! let intent = AttackIntent::melee(me, AttackKind::Punch, pos, facing, &config.punch, now);
//!
//! for hit in resolve_melee(&intent, &targets, &config) {
//!     let outcome = vitals_of(hit.target).apply_damage(hit.damage);
//! }
//! ```

pub mod damage;
pub mod health;
pub mod resolver;

pub mod prelude {
    pub use crate::damage::{AttackIntent, AttackKind, AttackProfile};
    pub use crate::health::{DamageOutcome, Vitals, MAX_HEALTH};
    pub use crate::resolver::{
        check_thrown, horizontal, in_forward_arc, resolve_melee, CombatConfig, MeleeHit, Target,
    };
}

pub use prelude::*;
