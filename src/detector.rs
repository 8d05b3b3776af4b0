//! Detector boundary
//!
//! The hand tracking model runs outside this crate. What comes back from it is
//! a set of 21 normalized landmarks per hand; this module reduces each hand to
//! a single [`Pointer`] (palm position plus open/closed state) that the
//! simulation consumes once per tick.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of landmarks the hand model reports per hand
pub const LANDMARK_COUNT: usize = 21;

/// Landmark used as the pointer position (middle finger MCP, center of palm)
pub const PALM_LANDMARK: usize = 9;
pub const THUMB_TIP: usize = 4;
pub const THUMB_BASE: usize = 2;
/// Index, middle, ring, pinky tips
pub const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];
/// Folded fingers needed (besides the thumb) to call the hand a fist
pub const MIN_FOLDED_FINGERS: usize = 3;

/// One tracked pointer in normalized frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f32,
    pub y: f32,
    pub closed: bool,
}

impl Pointer {
    pub fn new(x: f32, y: f32, closed: bool) -> Self {
        Self { x, y, closed }
    }

    /// Clamp into [0,1]. Detector noise near the frame edge lands slightly
    /// outside the range; NaN collapses to 0.
    pub fn clamped(&self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
            closed: self.closed,
        }
    }

    #[inline]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// All pointers seen in one frame, in detector order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerState {
    pub positions: Vec<Pointer>,
}

impl PointerState {
    pub fn new(positions: Vec<Pointer>) -> Self {
        Self { positions }
    }

    /// No hands in view
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.positions.iter()
    }
}

impl FromIterator<Pointer> for PointerState {
    fn from_iter<I: IntoIterator<Item = Pointer>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// Which hand the model believes it is looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Handedness::Left),
            "right" => Some(Handedness::Right),
            _ => None,
        }
    }
}

/// Landmarks of one tracked hand (normalized x, y; relative depth z)
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    pub points: [Vec3; LANDMARK_COUNT],
    pub handedness: Option<Handedness>,
}

impl HandLandmarks {
    pub fn new(points: [Vec3; LANDMARK_COUNT]) -> Self {
        Self {
            points,
            handedness: None,
        }
    }

    /// Build from a raw landmark list. `None` unless exactly 21 points.
    pub fn from_slice(raw: &[[f32; 3]]) -> Option<Self> {
        if raw.len() != LANDMARK_COUNT {
            return None;
        }
        let mut points = [Vec3::ZERO; LANDMARK_COUNT];
        for (dst, src) in points.iter_mut().zip(raw) {
            *dst = Vec3::from_array(*src);
        }
        Some(Self::new(points))
    }

    pub fn with_handedness(mut self, handedness: Option<Handedness>) -> Self {
        self.handedness = handedness;
        self
    }

    /// Palm center, normalized
    #[inline]
    pub fn palm(&self) -> Vec2 {
        self.points[PALM_LANDMARK].truncate()
    }

    /// Fist heuristic: thumb folded across the palm and at least three finger
    /// tips below the joint two landmarks down the same finger. Image y grows
    /// downward, so "below" is a larger y.
    pub fn is_closed(&self) -> bool {
        let thumb_folded = self.points[THUMB_TIP].x < self.points[THUMB_BASE].x;

        let folded_fingers = FINGER_TIPS
            .iter()
            .filter(|&&tip| self.points[tip].y > self.points[tip - 2].y)
            .count();

        folded_fingers >= MIN_FOLDED_FINGERS && thumb_folded
    }

    pub fn to_pointer(&self) -> Pointer {
        let palm = self.palm();
        Pointer::new(palm.x, palm.y, self.is_closed())
    }
}

/// Landmark payload as returned by the detection endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Per hand, 21 `[x, y, z]` landmarks
    pub coordinates: Vec<Vec<[f32; 3]>>,
    /// Per hand "Left"/"Right", when the model classified them
    #[serde(default)]
    pub hand_types: Option<Vec<String>>,
    /// Source image `(height, width)`
    #[serde(default)]
    pub image_shape: Option<(u32, u32)>,
}

impl DetectionResult {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hands with a complete landmark set, in detector order
    pub fn hands(&self) -> Vec<HandLandmarks> {
        self.coordinates
            .iter()
            .enumerate()
            .filter_map(|(idx, raw)| {
                let Some(hand) = HandLandmarks::from_slice(raw) else {
                    log::warn!(
                        "Skipping hand {}: expected {} landmarks, got {}",
                        idx,
                        LANDMARK_COUNT,
                        raw.len()
                    );
                    return None;
                };
                let handedness = self
                    .hand_types
                    .as_ref()
                    .and_then(|types| types.get(idx))
                    .and_then(|label| Handedness::from_label(label));
                Some(hand.with_handedness(handedness))
            })
            .collect()
    }

    /// Reduce to the per-tick pointer snapshot
    pub fn pointers(&self) -> PointerState {
        self.hands().iter().map(HandLandmarks::to_pointer).collect()
    }
}
