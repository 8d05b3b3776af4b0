//! Error types for the simulation core

use thiserror::Error;

/// Errors surfaced by the simulation and its configuration
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Session expired")]
    SessionExpired,

    #[error("Session has not expired yet")]
    SessionNotExpired,

    /// Capture attempted on a target that is already hidden
    #[error("Target already hidden: {0}")]
    AlreadyHidden(String),

    #[error("Target {0} needs at least one sprite")]
    EmptySpriteCycle(String),

    #[error("Duplicate target id: {0}")]
    DuplicateTarget(String),

    #[error("Frame {width}x{height} cannot fit a {sprite_w}x{sprite_h} sprite")]
    FrameTooSmall {
        width: f32,
        height: f32,
        sprite_w: f32,
        sprite_h: f32,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
