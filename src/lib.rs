//! Balloon Pop - moving-target capture game driven by hand tracking
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (targets, collisions, session)
//! - `detector`: Hand landmark boundary, turns detector output into pointers
//! - `settings`: Data-driven game tuning

pub mod detector;
pub mod error;
pub mod settings;
pub mod sim;

pub use detector::{DetectionResult, HandLandmarks, Handedness, Pointer, PointerState};
pub use error::{GameError, Result};
pub use settings::{GameConfig, TargetSpec};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Nominal camera frame rate the tuning was made for
    pub const NOMINAL_FPS: f32 = 30.0;

    /// Target speed in pixels per second (6 px per frame at 30 fps)
    pub const MOVEMENT_SPEED: f32 = 6.0 * NOMINAL_FPS;

    /// Sprite cycling interval bounds (seconds)
    pub const MIN_CHANGE_INTERVAL: f64 = 0.3;
    pub const MAX_CHANGE_INTERVAL: f64 = 1.5;

    /// Time a captured target stays hidden (seconds)
    pub const REAPPEAR_DELAY: f64 = 1.0;

    /// Length of one game (seconds)
    pub const GAME_DURATION: f64 = 20.0;

    /// Square sprite side (pixels)
    pub const SPRITE_EXTENT: f32 = 100.0;

    /// Initial movement directions, normalized on spawn
    pub const INITIAL_DIRECTIONS: [(f32, f32); 8] = [
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
        (1.0, 1.0),
        (-1.0, 1.0),
        (1.0, -1.0),
        (-1.0, -1.0),
    ];
}

/// Pixel dimensions of the camera frame the targets live in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameBounds {
    pub width: f32,
    pub height: f32,
}

impl FrameBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Largest top-left corner that keeps a sprite fully on screen.
    /// Zero on any axis where the sprite does not fit.
    #[inline]
    pub fn max_position(&self, sprite_extent: Vec2) -> Vec2 {
        (self.extent() - sprite_extent).max(Vec2::ZERO)
    }

    /// Both dimensions are finite and positive
    pub fn is_finite(&self) -> bool {
        self.extent().is_finite() && self.extent().cmpgt(Vec2::ZERO).all()
    }

    /// Whether a sprite of this size fits inside the frame
    pub fn fits(&self, sprite_extent: Vec2) -> bool {
        sprite_extent.x <= self.width && sprite_extent.y <= self.height
    }
}
