//! Target registry and the per-frame tick
//!
//! Owns every target plus the cumulative capture tallies. Iteration order is
//! insertion order, which is also render order.

use std::collections::{BTreeMap, HashMap};

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision;
use super::target::{SpriteHandle, Target};
use crate::FrameBounds;
use crate::detector::PointerState;
use crate::error::{GameError, Result};

/// A closed pointer popped a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub target_id: String,
    /// Sprite on screen at the moment of capture
    pub sprite: SpriteHandle,
    /// Which pointer (detector order) made the capture
    pub pointer_index: usize,
    /// Clock reading of the tick
    pub at: f64,
}

/// What the compositor needs to draw one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTarget {
    pub id: String,
    pub position: Vec2,
    /// Whole-pixel top-left corner, kept inside the frame
    pub pixel_position: IVec2,
    pub sprite: SpriteHandle,
}

impl RenderTarget {
    pub fn from_target(target: &Target, frame: FrameBounds) -> Self {
        let max = frame.max_position(target.sprite_extent).as_ivec2();
        Self {
            id: target.id.clone(),
            position: target.position,
            pixel_position: target.position.as_ivec2().clamp(IVec2::ZERO, max),
            sprite: target.current_sprite().clone(),
        }
    }
}

/// Result of one registry tick
#[derive(Debug)]
pub struct TickOutcome<'a> {
    /// Every target in render order, hidden ones included
    pub targets: &'a [Target],
    /// Captures made this tick, in target order
    pub captures: Vec<CaptureEvent>,
}

/// Owns the targets and their tallies
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    tallies: HashMap<String, u64>,
    sprite_tallies: BTreeMap<SpriteHandle, u64>,
    rng: Pcg32,
}

impl TargetRegistry {
    /// Empty registry drawing randomness from a seeded PCG stream
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    pub fn with_rng(rng: Pcg32) -> Self {
        Self {
            targets: Vec::new(),
            tallies: HashMap::new(),
            sprite_tallies: BTreeMap::new(),
            rng,
        }
    }

    /// Add a target at the end of the render order
    pub fn insert(&mut self, target: Target) -> Result<()> {
        if self.tallies.contains_key(&target.id) {
            return Err(GameError::DuplicateTarget(target.id));
        }
        self.tallies.insert(target.id.clone(), 0);
        self.targets.push(target);
        Ok(())
    }

    /// Random source shared by every target in this registry
    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, id: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    /// Advance every target, then resolve captures against `pointers`.
    ///
    /// `now` is read once by the caller so every target sees the same time.
    pub fn tick(
        &mut self,
        dt: f32,
        now: f64,
        pointers: &PointerState,
        frame: FrameBounds,
    ) -> TickOutcome<'_> {
        for target in &mut self.targets {
            if target.advance(dt, now, frame, &mut self.rng) {
                log::debug!("{} reappeared at {:?}", target.id, target.position);
            }
            target.maybe_cycle_sprite(now, &mut self.rng);
        }

        let mut captures = Vec::new();
        for target in &mut self.targets {
            let Some(pointer_index) = collision::first_hit(target, pointers, frame) else {
                continue;
            };
            let sprite = target.current_sprite().clone();
            match target.capture(now) {
                Ok(()) => {
                    *self.tallies.entry(target.id.clone()).or_insert(0) += 1;
                    *self.sprite_tallies.entry(sprite.clone()).or_insert(0) += 1;
                    log::debug!("{} captured by pointer {} ({})", target.id, pointer_index, sprite);
                    captures.push(CaptureEvent {
                        target_id: target.id.clone(),
                        sprite,
                        pointer_index,
                        at: now,
                    });
                }
                // Overlapping pointers racing for the same target
                Err(err) => log::trace!("Ignoring capture: {}", err),
            }
        }

        TickOutcome {
            targets: &self.targets,
            captures,
        }
    }

    /// Visible targets in render order
    pub fn render_list(&self, frame: FrameBounds) -> Vec<RenderTarget> {
        self.targets
            .iter()
            .filter(|t| t.visible)
            .map(|t| RenderTarget::from_target(t, frame))
            .collect()
    }

    /// Captures so far for one target
    pub fn score(&self, id: &str) -> u64 {
        self.tallies.get(id).copied().unwrap_or(0)
    }

    /// `(id, captures)` in render order
    pub fn tallies(&self) -> Vec<(String, u64)> {
        self.targets
            .iter()
            .map(|t| (t.id.clone(), self.score(&t.id)))
            .collect()
    }

    /// Captures keyed by the sprite shown when they happened
    pub fn sprite_tallies(&self) -> &BTreeMap<SpriteHandle, u64> {
        &self.sprite_tallies
    }

    pub fn total_captures(&self) -> u64 {
        self.tallies.values().sum()
    }
}
