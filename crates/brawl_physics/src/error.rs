//! Error types for the physics adapter

use thiserror::Error;

/// Physics system errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("Rigid body not found: {0:?}")]
    BodyNotFound(crate::body::RigidBodyHandle),

    /// Collider not found
    #[error("Collider not found: {0:?}")]
    ColliderNotFound(crate::collider::ColliderHandle),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Negative or non-finite step
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f32),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
