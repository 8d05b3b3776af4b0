//! Game tuning and target roster
//!
//! Loaded from JSON; every field falls back to the defaults in [`crate::consts`].

use std::collections::HashSet;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, Result};

/// One target to seed: asset key plus a display label for the score report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Stable id, also the sprite asset key
    pub id: String,
    /// Human readable name printed in the final report
    pub label: String,
    /// Sprites to cycle through; empty means the whole roster
    #[serde(default)]
    pub sprites: Vec<String>,
}

impl TargetSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sprites: Vec::new(),
        }
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Target speed (pixels per second)
    pub movement_speed: f32,
    /// Lower bound of the sprite change interval (seconds)
    pub min_change_interval: f64,
    /// Upper bound of the sprite change interval (seconds)
    pub max_change_interval: f64,
    /// Hidden time after a capture (seconds)
    pub reappear_delay: f64,
    /// Session length (seconds)
    pub game_duration: f64,
    /// Sprite width/height (pixels)
    pub sprite_extent: Vec2,
    /// Targets in render order
    pub targets: Vec<TargetSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            movement_speed: MOVEMENT_SPEED,
            min_change_interval: MIN_CHANGE_INTERVAL,
            max_change_interval: MAX_CHANGE_INTERVAL,
            reappear_delay: REAPPEAR_DELAY,
            game_duration: GAME_DURATION,
            sprite_extent: Vec2::splat(SPRITE_EXTENT),
            targets: vec![
                TargetSpec::new("1.png", "Red"),
                TargetSpec::new("2.png", "Blue"),
                TargetSpec::new("3.png", "Yellow"),
                TargetSpec::new("4.png", "Pink"),
                TargetSpec::new("5.png", "Green"),
            ],
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded config from {} ({} targets)",
            path.display(),
            config.targets.len()
        );
        Ok(config)
    }

    /// Serialize back to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject tuning the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.movement_speed.is_finite() && self.movement_speed > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "movement_speed must be positive, got {}",
                self.movement_speed
            )));
        }
        if !(self.game_duration.is_finite() && self.game_duration > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "game_duration must be positive, got {}",
                self.game_duration
            )));
        }
        if !(self.reappear_delay.is_finite() && self.reappear_delay >= 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "reappear_delay must be non-negative, got {}",
                self.reappear_delay
            )));
        }
        if !(self.min_change_interval.is_finite()
            && self.max_change_interval.is_finite()
            && self.min_change_interval > 0.0
            && self.min_change_interval <= self.max_change_interval)
        {
            return Err(GameError::InvalidConfig(format!(
                "change interval must satisfy 0 < min <= max, got [{}, {}]",
                self.min_change_interval, self.max_change_interval
            )));
        }
        if !(self.sprite_extent.is_finite() && self.sprite_extent.cmpgt(Vec2::ZERO).all()) {
            return Err(GameError::InvalidConfig(format!(
                "sprite_extent must be positive, got {:?}",
                self.sprite_extent
            )));
        }
        if self.targets.is_empty() {
            return Err(GameError::InvalidConfig("no targets configured".into()));
        }
        let mut seen = HashSet::new();
        for spec in &self.targets {
            if !seen.insert(spec.id.as_str()) {
                return Err(GameError::DuplicateTarget(spec.id.clone()));
            }
        }
        Ok(())
    }
}
