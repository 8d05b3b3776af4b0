//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One clock reading per tick, shared by every target
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering, capture or detector dependencies

pub mod collision;
pub mod registry;
pub mod session;
pub mod target;

pub use collision::{check, first_hit, pointer_to_pixel};
pub use registry::{CaptureEvent, RenderTarget, TargetRegistry, TickOutcome};
pub use session::{
    Clock, FinalReport, GameSession, ManualClock, MonotonicClock, ScoreEntry, SessionPhase,
    TickSnapshot,
};
pub use target::{SpriteCycle, SpriteHandle, Target, TargetTiming, random_position};
