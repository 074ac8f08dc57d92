//! Third-person camera follow

use crate::actor::forward;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera placement tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance behind the target
    pub distance: f32,
    /// Height above the target
    pub height: f32,
    /// The camera aims this far above the target's center
    pub look_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 5.0,
            height: 2.5,
            look_height: 1.0,
        }
    }
}

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.5, 5.0),
            look_at: Vec3::ZERO,
        }
    }
}

/// Follows a target from behind along its yaw
#[derive(Debug, Clone, Default)]
pub struct CameraRig {
    pub config: CameraConfig,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    pub fn pose(&self, target: Vec3, yaw: f32) -> CameraPose {
        let back = -forward(yaw);
        CameraPose {
            position: target + back * self.config.distance + Vec3::Y * self.config.height,
            look_at: target + Vec3::Y * self.config.look_height,
        }
    }
}
