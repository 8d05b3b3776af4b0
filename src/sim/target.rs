//! Targets: bouncing, capturable sprites
//!
//! A target is either on screen (visible, moving, cycling its sprite) or
//! hidden after a capture, waiting out its reappear delay.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::FrameBounds;
use crate::consts::*;
use crate::error::{GameError, Result};
use crate::settings::GameConfig;

/// Reference to a pre-loaded sprite image (its asset key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteHandle(pub String);

impl SpriteHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpriteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty ordered list of sprites with a cyclic cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteCycle {
    sprites: Vec<SpriteHandle>,
    index: usize,
}

impl SpriteCycle {
    /// Fails when `sprites` is empty; `owner` names the target in the error
    pub fn new(owner: &str, sprites: Vec<SpriteHandle>) -> Result<Self> {
        if sprites.is_empty() {
            return Err(GameError::EmptySpriteCycle(owner.to_string()));
        }
        Ok(Self { sprites, index: 0 })
    }

    /// Start on a given sprite (wraps when out of range)
    pub fn starting_at(mut self, index: usize) -> Self {
        self.index = index % self.sprites.len();
        self
    }

    #[inline]
    pub fn current(&self) -> &SpriteHandle {
        &self.sprites[self.index]
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Step to the next sprite, wrapping to the first
    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.sprites.len();
    }
}

/// Per-target timing knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetTiming {
    /// Hidden time after capture (seconds)
    pub reappear_delay: f64,
    pub min_change_interval: f64,
    pub max_change_interval: f64,
}

impl Default for TargetTiming {
    fn default() -> Self {
        Self {
            reappear_delay: REAPPEAR_DELAY,
            min_change_interval: MIN_CHANGE_INTERVAL,
            max_change_interval: MAX_CHANGE_INTERVAL,
        }
    }
}

impl From<&GameConfig> for TargetTiming {
    fn from(config: &GameConfig) -> Self {
        Self {
            reappear_delay: config.reappear_delay,
            min_change_interval: config.min_change_interval,
            max_change_interval: config.max_change_interval,
        }
    }
}

impl TargetTiming {
    /// Draw the next sprite change interval
    pub fn draw_interval(&self, rng: &mut impl Rng) -> f64 {
        if self.max_change_interval <= self.min_change_interval {
            return self.min_change_interval;
        }
        rng.random_range(self.min_change_interval..=self.max_change_interval)
    }
}

/// A single bouncing, capturable sprite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Stable id, used for score bucketing
    pub id: String,
    /// Top-left corner in pixels
    pub position: Vec2,
    /// Pixels per second
    pub velocity: Vec2,
    pub sprite_extent: Vec2,
    pub sprites: SpriteCycle,
    pub visible: bool,
    /// Set while hidden
    pub hidden_at: Option<f64>,
    pub last_sprite_change_at: f64,
    pub next_sprite_change_interval: f64,
    pub timing: TargetTiming,
}

impl Target {
    /// Visible target at the origin, at rest. Place it with [`Target::at`]
    /// and [`Target::with_velocity`], or use [`Target::spawn`].
    pub fn new(
        id: impl Into<String>,
        sprites: SpriteCycle,
        sprite_extent: Vec2,
        timing: TargetTiming,
    ) -> Self {
        Self {
            id: id.into(),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            sprite_extent,
            sprites,
            visible: true,
            hidden_at: None,
            last_sprite_change_at: 0.0,
            next_sprite_change_interval: timing.max_change_interval,
            timing,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Random position in the frame, random initial direction at `speed`,
    /// sprite timer armed from `now`
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        id: impl Into<String>,
        sprites: SpriteCycle,
        sprite_extent: Vec2,
        timing: TargetTiming,
        speed: f32,
        frame: FrameBounds,
        now: f64,
        rng: &mut impl Rng,
    ) -> Self {
        let (dx, dy) = INITIAL_DIRECTIONS[rng.random_range(0..INITIAL_DIRECTIONS.len())];
        let direction = Vec2::new(dx, dy).normalize_or_zero();

        let mut target = Self::new(id, sprites, sprite_extent, timing)
            .at(random_position(frame, sprite_extent, rng))
            .with_velocity(direction * speed);
        target.rearm_cycle(now, rng);
        target
    }

    #[inline]
    pub fn current_sprite(&self) -> &SpriteHandle {
        self.sprites.current()
    }

    /// Opposite corner of the bounding box
    #[inline]
    pub fn max_corner(&self) -> Vec2 {
        self.position + self.sprite_extent
    }

    /// Inclusive point-in-box test, pixel space
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max_corner();
        point.x >= self.position.x
            && point.x <= max.x
            && point.y >= self.position.y
            && point.y <= max.y
    }

    /// Move one tick, or reappear once the hidden delay has passed.
    ///
    /// Bouncing is per axis: whichever axis touches or crosses a wall has its
    /// velocity component negated, then the position is clamped back into the
    /// frame. Returns true when the target reappeared this tick.
    pub fn advance(&mut self, dt: f32, now: f64, frame: FrameBounds, rng: &mut impl Rng) -> bool {
        if !self.visible {
            return match self.hidden_at {
                Some(hidden_at) if now - hidden_at >= self.timing.reappear_delay => {
                    self.reappear(frame, rng);
                    true
                }
                _ => false,
            };
        }

        let max = frame.max_position(self.sprite_extent);
        self.position += self.velocity * dt;

        if self.position.x <= 0.0 || self.position.x >= max.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y <= 0.0 || self.position.y >= max.y {
            self.velocity.y = -self.velocity.y;
        }

        self.position = self.position.clamp(Vec2::ZERO, max);
        false
    }

    /// Step the sprite cycle once its interval has elapsed. Hidden targets
    /// keep their sprite and timer untouched. Returns true on a change.
    pub fn maybe_cycle_sprite(&mut self, now: f64, rng: &mut impl Rng) -> bool {
        if !self.visible {
            return false;
        }
        if now - self.last_sprite_change_at < self.next_sprite_change_interval {
            return false;
        }
        self.sprites.advance();
        self.rearm_cycle(now, rng);
        true
    }

    /// Hide the target. Fails when it is already hidden.
    pub fn capture(&mut self, now: f64) -> Result<()> {
        if !self.visible {
            return Err(GameError::AlreadyHidden(self.id.clone()));
        }
        self.visible = false;
        self.hidden_at = Some(now);
        Ok(())
    }

    fn rearm_cycle(&mut self, now: f64, rng: &mut impl Rng) {
        self.last_sprite_change_at = now;
        self.next_sprite_change_interval = self.timing.draw_interval(rng);
    }

    fn reappear(&mut self, frame: FrameBounds, rng: &mut impl Rng) {
        self.position = random_position(frame, self.sprite_extent, rng);
        self.visible = true;
        self.hidden_at = None;
    }
}

/// Uniform top-left corner that keeps the sprite on screen
pub fn random_position(frame: FrameBounds, sprite_extent: Vec2, rng: &mut impl Rng) -> Vec2 {
    let max = frame.max_position(sprite_extent);
    Vec2::new(
        rng.random_range(0.0..=max.x),
        rng.random_range(0.0..=max.y),
    )
}
