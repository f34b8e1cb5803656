//! Simulator error types

use thiserror::Error;

use crate::ActorId;

/// Errors raised by a simulator session
#[derive(Debug, Error)]
pub enum SimError {
    /// Session-level failure (connection, world load)
    #[error("Simulator session error: {0}")]
    Session(String),

    /// Blueprint id not present in the library
    #[error("Blueprint not found: {0}")]
    BlueprintNotFound(String),

    /// Spawn rejected (e.g. location already occupied)
    #[error("Failed to spawn {blueprint}: {reason}")]
    SpawnFailed { blueprint: String, reason: String },

    /// Actor id unknown or already destroyed
    #[error("Actor {0} not found")]
    ActorNotFound(ActorId),

    /// Invalid world settings
    #[error("Invalid world settings: {0}")]
    InvalidSettings(String),
}
