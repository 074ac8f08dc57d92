//! Keyboard and pointer input
//!
//! Raw key names are mapped to [`Action`]s through [`KeyBindings`]. Movement
//! actions are read as held state; jump, attacks, pickup and throw fire once
//! per press. Pointer motion only turns the player.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};

/// Something the player can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBack,
    MoveLeft,
    MoveRight,
    Jump,
    Punch,
    Kick,
    PickUp,
    Throw,
}

impl Action {
    /// Held actions are sampled every tick; the rest fire once per press
    pub fn is_held(&self) -> bool {
        matches!(
            self,
            Self::MoveForward | Self::MoveBack | Self::MoveLeft | Self::MoveRight
        )
    }
}

/// Key name to action map. Key names follow the DOM `KeyboardEvent.code`
/// convention (`"KeyW"`, `"Space"`, `"ArrowUp"`).
///
/// A deserialized table is a set of overrides on top of the default
/// bindings, so a config only lists the keys it remaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyBindings {
    bindings: HashMap<String, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            ("KeyW", Action::MoveForward),
            ("ArrowUp", Action::MoveForward),
            ("KeyS", Action::MoveBack),
            ("ArrowDown", Action::MoveBack),
            ("KeyA", Action::MoveLeft),
            ("ArrowLeft", Action::MoveLeft),
            ("KeyD", Action::MoveRight),
            ("ArrowRight", Action::MoveRight),
            ("Space", Action::Jump),
            ("KeyF", Action::Punch),
            ("KeyG", Action::Kick),
            ("KeyE", Action::PickUp),
            ("KeyQ", Action::Throw),
        ]
        .into_iter()
        .map(|(key, action)| (key.to_string(), action))
        .collect();
        Self { bindings }
    }
}

impl<'de> Deserialize<'de> for KeyBindings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let overrides = HashMap::<String, Action>::deserialize(deserializer)?;
        let mut keys = Self::default();
        keys.bindings.extend(overrides);
        Ok(keys)
    }
}

impl KeyBindings {
    /// No keys bound
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind a key, replacing any previous binding of that key
    pub fn bind(&mut self, key: impl Into<String>, action: Action) {
        self.bindings.insert(key.into(), action);
    }

    pub fn action(&self, key: &str) -> Option<Action> {
        self.bindings.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// One tick's worth of player intent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerCommand {
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 right, -1 left
    pub right: f32,
    /// Radians to add to the player's yaw
    pub yaw_delta: f32,
    pub jump: bool,
    pub punch: bool,
    pub kick: bool,
    pub pick_up: bool,
    pub throw: bool,
}

impl PlayerCommand {
    /// Any movement axis active
    pub fn is_moving(&self) -> bool {
        self.forward != 0.0 || self.right != 0.0
    }
}

/// Input state between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    /// Keys currently pressed
    pub keys_pressed: HashSet<String>,
    /// Presses not yet consumed by a tick
    triggered: HashSet<Action>,
    pointer_delta: (f32, f32),
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Handle a key press. Auto-repeat of a held key doesn't re-trigger.
    pub fn key_down(&mut self, key: &str) {
        if !self.keys_pressed.insert(key.to_string()) {
            return;
        }
        if let Some(action) = self.bindings.action(key) {
            if !action.is_held() {
                self.triggered.insert(action);
            }
        }
    }

    /// Handle a key release
    pub fn key_up(&mut self, key: &str) {
        self.keys_pressed.remove(key);
    }

    /// Check if a key is pressed
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys_pressed.contains(key)
    }

    /// Accumulate pointer motion in pixels
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        self.pointer_delta.0 += dx;
        self.pointer_delta.1 += dy;
    }

    /// Drop all held keys and pending presses (focus lost)
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.triggered.clear();
        self.pointer_delta = (0.0, 0.0);
    }

    fn is_action_held(&self, action: Action) -> bool {
        self.keys_pressed
            .iter()
            .any(|key| self.bindings.action(key) == Some(action))
    }

    fn axis(&self, positive: Action, negative: Action) -> f32 {
        let mut value = 0.0;
        if self.is_action_held(positive) {
            value += 1.0;
        }
        if self.is_action_held(negative) {
            value -= 1.0;
        }
        value
    }

    /// Build this tick's command and consume pending presses and pointer
    /// motion. Moving the pointer right turns right.
    pub fn take_command(&mut self, yaw_sensitivity: f32) -> PlayerCommand {
        let command = PlayerCommand {
            forward: self.axis(Action::MoveForward, Action::MoveBack),
            right: self.axis(Action::MoveRight, Action::MoveLeft),
            yaw_delta: -self.pointer_delta.0 * yaw_sensitivity,
            jump: self.triggered.contains(&Action::Jump),
            punch: self.triggered.contains(&Action::Punch),
            kick: self.triggered.contains(&Action::Kick),
            pick_up: self.triggered.contains(&Action::PickUp),
            throw: self.triggered.contains(&Action::Throw),
        };
        self.triggered.clear();
        self.pointer_delta = (0.0, 0.0);
        command
    }
}
