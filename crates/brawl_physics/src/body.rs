//! Rigid body types

use glam::Vec3;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub(crate) rapier::RigidBodyHandle);

impl RigidBodyHandle {
    /// Get the raw Rapier handle
    pub fn raw(&self) -> rapier::RigidBodyHandle {
        self.0
    }

    /// A handle that never resolves to a body
    pub fn invalid() -> Self {
        Self(rapier::RigidBodyHandle::invalid())
    }
}

/// Simulation mode of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyMode {
    /// Never moves, infinite mass
    Static,
    /// Fully simulated: gravity, contacts, forces
    #[default]
    Dynamic,
    /// Driven explicitly by code, ignores forces and gravity
    Kinematic,
}

impl From<BodyMode> for rapier::RigidBodyType {
    fn from(mode: BodyMode) -> Self {
        match mode {
            BodyMode::Static => rapier::RigidBodyType::Fixed,
            BodyMode::Dynamic => rapier::RigidBodyType::Dynamic,
            BodyMode::Kinematic => rapier::RigidBodyType::KinematicPositionBased,
        }
    }
}

impl From<rapier::RigidBodyType> for BodyMode {
    fn from(t: rapier::RigidBodyType) -> Self {
        match t {
            rapier::RigidBodyType::Fixed => BodyMode::Static,
            rapier::RigidBodyType::Dynamic => BodyMode::Dynamic,
            rapier::RigidBodyType::KinematicPositionBased
            | rapier::RigidBodyType::KinematicVelocityBased => BodyMode::Kinematic,
        }
    }
}

/// Which rotational axes the solver may turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationLock {
    /// Free rotation (props)
    #[default]
    Free,
    /// Pitch and roll locked, yaw free
    Tilt,
    /// All rotation locked; orientation is only ever set by code (actors)
    All,
}

impl RotationLock {
    /// Convert to Rapier locked axes
    pub fn to_rapier(&self) -> rapier::LockedAxes {
        match self {
            Self::Free => rapier::LockedAxes::empty(),
            Self::Tilt => {
                rapier::LockedAxes::ROTATION_LOCKED_X | rapier::LockedAxes::ROTATION_LOCKED_Z
            }
            Self::All => rapier::LockedAxes::ROTATION_LOCKED,
        }
    }
}

/// Description for creating a rigid body
#[derive(Debug, Clone)]
pub struct RigidBodyDesc {
    /// Simulation mode
    pub mode: BodyMode,
    /// Initial position
    pub position: Vec3,
    /// Initial heading around +Y, in radians
    pub yaw: f32,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
    /// Initial angular velocity
    pub angular_velocity: Vec3,
    /// Gravity scale (0 = no gravity, 1 = normal)
    pub gravity_scale: f32,
    /// Linear damping (air resistance)
    pub linear_damping: f32,
    /// Angular damping (rotational resistance)
    pub angular_damping: f32,
    /// Rotation constraints
    pub rotation_lock: RotationLock,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Can this body sleep when inactive
    pub can_sleep: bool,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            mode: BodyMode::Dynamic,
            position: Vec3::ZERO,
            yaw: 0.0,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            rotation_lock: RotationLock::Free,
            ccd_enabled: false,
            can_sleep: true,
        }
    }
}

impl RigidBodyDesc {
    /// Create a static body description
    pub fn fixed() -> Self {
        Self {
            mode: BodyMode::Static,
            ..Default::default()
        }
    }

    /// Create a dynamic body description
    pub fn dynamic() -> Self {
        Self {
            mode: BodyMode::Dynamic,
            ..Default::default()
        }
    }

    /// Create a kinematic body description
    pub fn kinematic() -> Self {
        Self {
            mode: BodyMode::Kinematic,
            ..Default::default()
        }
    }

    /// Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set heading
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Set linear velocity
    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Set rotation constraints
    pub fn with_rotation_lock(mut self, lock: RotationLock) -> Self {
        self.rotation_lock = lock;
        self
    }

    /// Enable CCD
    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }

    /// Keep the body awake
    pub fn with_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Build a Rapier rigid body builder
    pub(crate) fn to_rapier_builder(&self, user_data: u128) -> rapier::RigidBodyBuilder {
        rapier::RigidBodyBuilder::new(self.mode.into())
            .translation(rapier::Vector::new(
                self.position.x,
                self.position.y,
                self.position.z,
            ))
            .rotation(rapier::Vector::new(0.0, self.yaw, 0.0))
            .linvel(rapier::Vector::new(
                self.linear_velocity.x,
                self.linear_velocity.y,
                self.linear_velocity.z,
            ))
            .angvel(rapier::Vector::new(
                self.angular_velocity.x,
                self.angular_velocity.y,
                self.angular_velocity.z,
            ))
            .gravity_scale(self.gravity_scale)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
            .locked_axes(self.rotation_lock.to_rapier())
            .ccd_enabled(self.ccd_enabled)
            .can_sleep(self.can_sleep)
            .user_data(user_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_based_kinematic_reads_as_kinematic() {
        assert_eq!(
            BodyMode::from(rapier::RigidBodyType::KinematicVelocityBased),
            BodyMode::Kinematic
        );
    }

    #[test]
    fn test_tilt_lock_leaves_yaw_free() {
        let axes = RotationLock::Tilt.to_rapier();
        assert!(axes.contains(rapier::LockedAxes::ROTATION_LOCKED_X));
        assert!(!axes.contains(rapier::LockedAxes::ROTATION_LOCKED_Y));
    }
}
