//! Brawl Game - the session that ties physics, combat and NPCs together
//!
//! A [`Session`] owns one room: the player, the NPCs, the props lying
//! around, and the physics world under them. The host feeds raw input into
//! [`Session::input_mut`], calls [`Session::tick`] once per frame, and drains
//! [`GameEvent`]s for the UI. Visuals are created through a [`SceneHost`]
//! and only ever written to.
//!
//! # Features
//!
//! - Player locomotion with acceleration, a minimum speed floor and damping
//! - Jump, punch and kick with timed animation locks
//! - Pickup, carry and throw of bottles, glasses and chairs
//! - NPC pursuit with separation, cooldown-gated attacks and respawn
//! - TOML configuration with defaults for every tunable
//! - Deterministic runs from a single seed
//!
//! # Example
//!
//! ```ignore
//! use brawl_game::prelude::*;
//!
//! let mut session = Session::new(GameConfig::default(), Box::new(HeadlessScene::new()))?;
//! session.spawn_npcs()?;
//!
//! session.input_mut().key_down("KeyW");
//! session.tick(1.0 / 60.0)?;
//!
//! for event in session.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod actor;
pub mod arena;
pub mod camera;
pub mod config;
pub mod error;
pub mod events;
pub mod headless;
pub mod input;
pub mod prop;
pub mod session;
pub mod visual;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::actor::{ActionState, Actor, PlayerConfig};
    pub use crate::arena::ArenaConfig;
    pub use crate::camera::{CameraConfig, CameraPose, CameraRig};
    pub use crate::config::GameConfig;
    pub use crate::error::{GameError, Result};
    pub use crate::events::GameEvent;
    pub use crate::headless::{HeadlessScene, VisualRecord};
    pub use crate::input::{Action, InputState, KeyBindings, PlayerCommand};
    pub use crate::prop::{
        ObjectConfig, ObjectKind, ObjectPlacement, ObjectProfile, Prop, PropState,
    };
    pub use crate::session::{Session, TimerAction};
    pub use crate::visual::{ActorVisual, Role, SceneHost, VisualHandle};
    pub use brawl_combat::AttackKind;
    pub use brawl_core::{EntityId, EntityRef};
    pub use glam::{Quat, Vec3};
}

pub use prelude::*;
