//! Game error types

use brawl_physics::PhysicsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for session and config operations
pub type Result<T> = std::result::Result<T, GameError>;

/// Errors from loading config or building a session.
///
/// Gameplay operations never return these; a request whose preconditions
/// aren't met is a no-op instead.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_error_passes_through() {
        let err: GameError = PhysicsError::InvalidTimestep(-1.0).into();
        assert_eq!(err.to_string(), PhysicsError::InvalidTimestep(-1.0).to_string());
    }
}
