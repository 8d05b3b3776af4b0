//! Timed game session
//!
//! One bounded run: seeds the registry, drives it once per camera frame, and
//! closes with a final score report once the time limit passes.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::registry::{CaptureEvent, RenderTarget, TargetRegistry};
use super::target::{SpriteCycle, SpriteHandle, Target, TargetTiming};
use crate::FrameBounds;
use crate::detector::PointerState;
use crate::error::{GameError, Result};
use crate::settings::GameConfig;

/// Monotonic time source, in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock backed by [`Instant`], zero at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-stepped clock. Clones share the same reading, so a driver can keep
/// one handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Session lifecycle. One way: Running -> Expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Running,
    Expired,
}

/// Everything the outer loop needs after one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickSnapshot {
    /// Visible targets in render order
    pub targets: Vec<RenderTarget>,
    pub captures: Vec<CaptureEvent>,
    /// Running `(id, captures)` in render order
    pub scores: Vec<(String, u64)>,
    pub elapsed: f64,
    pub remaining: f64,
    /// This tick crossed the deadline
    pub expired: bool,
}

/// Final tally for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: String,
    pub label: String,
    pub count: u64,
}

/// Immutable end-of-session result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    /// In render order
    pub entries: Vec<ScoreEntry>,
    /// Captures keyed by the sprite shown at capture time
    pub by_sprite: BTreeMap<String, u64>,
    pub total: u64,
    pub duration: f64,
}

impl FinalReport {
    pub fn count(&self, id: &str) -> Option<u64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.count)
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}: {}", entry.label, entry.count)?;
        }
        write!(f, "Total: {}", self.total)
    }
}

/// A bounded-duration game run
#[derive(Debug)]
pub struct GameSession<C: Clock = MonotonicClock> {
    config: GameConfig,
    frame: FrameBounds,
    registry: TargetRegistry,
    clock: C,
    start_time: f64,
    last_tick: f64,
    phase: SessionPhase,
}

impl<C: Clock> GameSession<C> {
    /// Validate the config, place one target per roster entry, start the timer.
    ///
    /// Targets without their own sprite list cycle through the whole roster,
    /// starting on their own sprite.
    pub fn new(config: GameConfig, frame: FrameBounds, seed: u64, clock: C) -> Result<Self> {
        config.validate()?;
        if !frame.is_finite() {
            return Err(GameError::InvalidConfig(format!(
                "frame must have finite positive size, got {}x{}",
                frame.width, frame.height
            )));
        }
        if !frame.fits(config.sprite_extent) {
            return Err(GameError::FrameTooSmall {
                width: frame.width,
                height: frame.height,
                sprite_w: config.sprite_extent.x,
                sprite_h: config.sprite_extent.y,
            });
        }

        let start_time = clock.now();
        let timing = TargetTiming::from(&config);
        let roster: Vec<SpriteHandle> = config
            .targets
            .iter()
            .map(|spec| SpriteHandle::new(spec.id.as_str()))
            .collect();

        let mut registry = TargetRegistry::new(seed);
        for (index, spec) in config.targets.iter().enumerate() {
            let sprites = if spec.sprites.is_empty() {
                SpriteCycle::new(&spec.id, roster.clone())?.starting_at(index)
            } else {
                let own = spec.sprites.iter().map(SpriteHandle::new).collect();
                SpriteCycle::new(&spec.id, own)?
            };
            let target = Target::spawn(
                spec.id.as_str(),
                sprites,
                config.sprite_extent,
                timing,
                config.movement_speed,
                frame,
                start_time,
                registry.rng_mut(),
            );
            registry.insert(target)?;
        }

        log::info!(
            "Session started: {} targets, {}s, frame {}x{}, seed {}",
            registry.len(),
            config.game_duration,
            frame.width,
            frame.height,
            seed
        );

        Ok(Self {
            config,
            frame,
            registry,
            clock,
            start_time,
            last_tick: start_time,
            phase: SessionPhase::Running,
        })
    }

    /// Run one frame. The tick that crosses the deadline still counts; every
    /// call after it fails with [`GameError::SessionExpired`].
    pub fn tick(&mut self, pointers: &PointerState) -> Result<TickSnapshot> {
        if self.phase == SessionPhase::Expired {
            return Err(GameError::SessionExpired);
        }

        let now = self.clock.now();
        let dt = (now - self.last_tick).max(0.0) as f32;
        self.last_tick = now;

        let captures = self
            .registry
            .tick(dt, now, pointers, self.frame)
            .captures;

        let elapsed = now - self.start_time;
        let expired = elapsed >= self.config.game_duration;
        if expired {
            self.phase = SessionPhase::Expired;
            log::info!(
                "Session expired after {:.2}s with {} captures",
                elapsed,
                self.registry.total_captures()
            );
        }

        Ok(TickSnapshot {
            targets: self.registry.render_list(self.frame),
            captures,
            scores: self.registry.tallies(),
            elapsed,
            remaining: (self.config.game_duration - elapsed).max(0.0),
            expired,
        })
    }

    /// Tallies at expiry. Fails with [`GameError::SessionNotExpired`] while
    /// the session is still running.
    pub fn final_report(&self) -> Result<FinalReport> {
        if self.phase != SessionPhase::Expired {
            return Err(GameError::SessionNotExpired);
        }

        let entries = self
            .config
            .targets
            .iter()
            .map(|spec| ScoreEntry {
                id: spec.id.clone(),
                label: spec.label.clone(),
                count: self.registry.score(&spec.id),
            })
            .collect();
        let by_sprite = self
            .registry
            .sprite_tallies()
            .iter()
            .map(|(sprite, count)| (sprite.to_string(), *count))
            .collect();

        Ok(FinalReport {
            entries,
            by_sprite,
            total: self.registry.total_captures(),
            duration: self.config.game_duration,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_expired(&self) -> bool {
        self.phase == SessionPhase::Expired
    }

    /// Seconds since start, as of the last tick
    pub fn elapsed(&self) -> f64 {
        self.last_tick - self.start_time
    }

    /// Seconds left, as of the last tick
    pub fn remaining(&self) -> f64 {
        (self.config.game_duration - self.elapsed()).max(0.0)
    }

    pub fn frame(&self) -> FrameBounds {
        self.frame
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Direct access for scripted setups (placing targets, forcing velocities)
    pub fn registry_mut(&mut self) -> &mut TargetRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Pointer;
    use crate::settings::TargetSpec;
    use glam::Vec2;

    const FPS: f64 = 30.0;

    fn frame() -> FrameBounds {
        FrameBounds::new(640.0, 480.0)
    }

    fn session(clock: &ManualClock) -> GameSession<ManualClock> {
        GameSession::new(GameConfig::default(), frame(), 7, clock.clone()).unwrap()
    }

    /// Stop every target; park `id` under the pointer at pixel (320, 240)
    /// and the rest in the top-left corner
    fn park(session: &mut GameSession<ManualClock>, id: &str) {
        let ids: Vec<String> = session.registry().targets().iter().map(|t| t.id.clone()).collect();
        for other in ids {
            let target = session.registry_mut().get_mut(&other).unwrap();
            target.velocity = Vec2::ZERO;
            target.position = if other == id {
                Vec2::new(300.0, 200.0)
            } else {
                Vec2::ZERO
            };
        }
    }

    fn fist_at_center() -> PointerState {
        PointerState::new(vec![Pointer::new(0.5, 0.5, true)])
    }

    #[test]
    fn test_seeds_one_target_per_roster_entry() {
        let clock = ManualClock::new(100.0);
        let session = session(&clock);
        let ids: Vec<_> = session.registry().targets().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1.png", "2.png", "3.png", "4.png", "5.png"]);
        for (i, target) in session.registry().targets().iter().enumerate() {
            assert_eq!(target.sprites.len(), 5);
            assert_eq!(target.sprites.index(), i);
            assert_eq!(target.current_sprite().as_str(), target.id);
        }
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_custom_sprite_list() {
        let config = GameConfig {
            targets: vec![TargetSpec {
                id: "star".into(),
                label: "Star".into(),
                sprites: vec!["star_a.png".into(), "star_b.png".into()],
            }],
            ..Default::default()
        };
        let session = GameSession::new(config, frame(), 1, ManualClock::new(0.0)).unwrap();
        let target = session.registry().get("star").unwrap();
        assert_eq!(target.current_sprite().as_str(), "star_a.png");
        assert_eq!(target.sprites.len(), 2);
    }

    #[test]
    fn test_frame_too_small() {
        let result = GameSession::new(
            GameConfig::default(),
            FrameBounds::new(80.0, 480.0),
            1,
            ManualClock::new(0.0),
        );
        assert!(matches!(result, Err(GameError::FrameTooSmall { .. })));
    }

    #[test]
    fn test_non_finite_frame_rejected() {
        for frame in [
            FrameBounds::new(f32::INFINITY, 480.0),
            FrameBounds::new(640.0, f32::NAN),
        ] {
            let result = GameSession::new(GameConfig::default(), frame, 1, ManualClock::new(0.0));
            assert!(matches!(result, Err(GameError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_non_finite_interval_rejected_before_spawn() {
        let config = GameConfig {
            max_change_interval: f64::INFINITY,
            ..Default::default()
        };
        let result = GameSession::new(config, frame(), 1, ManualClock::new(0.0));
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_report_before_expiry_fails() {
        let clock = ManualClock::new(0.0);
        let mut session = session(&clock);
        assert!(matches!(
            session.final_report(),
            Err(GameError::SessionNotExpired)
        ));
        clock.advance(1.0);
        session.tick(&PointerState::empty()).unwrap();
        assert!(matches!(
            session.final_report(),
            Err(GameError::SessionNotExpired)
        ));
    }

    #[test]
    fn test_expires_after_duration() {
        let clock = ManualClock::new(0.0);
        let mut session = session(&clock);
        park(&mut session, "1.png");

        // One capture early on
        clock.advance(1.0 / FPS);
        let snapshot = session.tick(&fist_at_center()).unwrap();
        assert_eq!(snapshot.captures.len(), 1);
        assert_eq!(snapshot.captures[0].target_id, "1.png");

        let mut ticks = 1;
        while !session.is_expired() {
            clock.advance(1.0 / FPS);
            session.tick(&PointerState::empty()).unwrap();
            ticks += 1;
            assert!(ticks < 1000, "session never expired");
        }
        assert!(session.elapsed() >= 20.0);

        clock.set(20.1);
        assert!(matches!(
            session.tick(&PointerState::empty()),
            Err(GameError::SessionExpired)
        ));

        let report = session.final_report().unwrap();
        assert_eq!(report.count("1.png"), Some(1));
        assert_eq!(report.count("2.png"), Some(0));
        assert_eq!(report.total, 1);
        assert_eq!(report.by_sprite.get("1.png"), Some(&1));
    }

    #[test]
    fn test_deadline_tick_is_processed() {
        let clock = ManualClock::new(0.0);
        let mut session = session(&clock);
        park(&mut session, "3.png");

        clock.set(25.0);
        let snapshot = session.tick(&fist_at_center()).unwrap();
        assert!(snapshot.expired);
        assert_eq!(snapshot.remaining, 0.0);
        assert!(snapshot.captures.iter().any(|c| c.target_id == "3.png"));

        let report = session.final_report().unwrap();
        assert_eq!(report.count("3.png"), Some(1));
    }

    #[test]
    fn test_snapshot_omits_hidden_targets() {
        let clock = ManualClock::new(0.0);
        let mut session = session(&clock);
        park(&mut session, "2.png");

        clock.advance(1.0 / FPS);
        let snapshot = session.tick(&fist_at_center()).unwrap();
        assert!(snapshot.targets.iter().all(|t| t.id != "2.png"));
        let score = snapshot.scores.iter().find(|(id, _)| id == "2.png").unwrap();
        assert_eq!(score.1, 1);
        assert!(snapshot.remaining < 20.0);
        assert_eq!(session.remaining(), snapshot.remaining);
        assert_eq!(session.config().game_duration, 20.0);
    }

    #[test]
    fn test_report_display() {
        let report = FinalReport {
            entries: vec![
                ScoreEntry {
                    id: "1.png".into(),
                    label: "Red".into(),
                    count: 3,
                },
                ScoreEntry {
                    id: "2.png".into(),
                    label: "Blue".into(),
                    count: 0,
                },
            ],
            by_sprite: BTreeMap::new(),
            total: 3,
            duration: 20.0,
        };
        assert_eq!(report.to_string(), "Red: 3\nBlue: 0\nTotal: 3");
    }

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
