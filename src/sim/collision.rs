//! Pointer vs target hit testing
//!
//! Pointers arrive normalized; targets live in pixel space. A hit needs a
//! closed hand inside the target's box.

use glam::Vec2;

use super::target::Target;
use crate::FrameBounds;
use crate::detector::{Pointer, PointerState};

/// Pixel position of a pointer, clamped into the frame and truncated to whole
/// pixels like the compositor sees it
#[inline]
pub fn pointer_to_pixel(pointer: &Pointer, frame: FrameBounds) -> Vec2 {
    (pointer.clamped().as_vec2() * frame.extent()).floor()
}

/// Whether `pointer` captures `target` this tick
pub fn check(target: &Target, pointer: &Pointer, frame: FrameBounds) -> bool {
    target.visible && pointer.closed && target.contains(pointer_to_pixel(pointer, frame))
}

/// Index of the first pointer (in detector order) that hits `target`.
/// Later pointers are not consulted once one hits.
pub fn first_hit(target: &Target, pointers: &PointerState, frame: FrameBounds) -> Option<usize> {
    if !target.visible {
        return None;
    }
    pointers
        .iter()
        .position(|pointer| check(target, pointer, frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::target::{SpriteCycle, SpriteHandle, TargetTiming};

    const FRAME: FrameBounds = FrameBounds {
        width: 200.0,
        height: 200.0,
    };

    fn target_at(x: f32, y: f32) -> Target {
        let sprites = SpriteCycle::new("t", vec![SpriteHandle::new("1.png")]).unwrap();
        Target::new("t", sprites, Vec2::splat(100.0), TargetTiming::default())
            .at(Vec2::new(x, y))
    }

    #[test]
    fn test_closed_pointer_inside_hits() {
        let target = target_at(50.0, 50.0);
        let pointer = Pointer::new(0.5, 0.5, true);
        assert_eq!(pointer_to_pixel(&pointer, FRAME), Vec2::new(100.0, 100.0));
        assert!(check(&target, &pointer, FRAME));
    }

    #[test]
    fn test_open_pointer_never_hits() {
        let target = target_at(50.0, 50.0);
        assert!(!check(&target, &Pointer::new(0.5, 0.5, false), FRAME));
    }

    #[test]
    fn test_hidden_target_never_hit() {
        let mut target = target_at(50.0, 50.0);
        target.capture(0.0).unwrap();
        assert!(!check(&target, &Pointer::new(0.5, 0.5, true), FRAME));
    }

    #[test]
    fn test_edges_are_inclusive() {
        let target = target_at(50.0, 50.0);
        // (0.25, 0.75) -> pixel (50, 150): top-left x, bottom y
        assert!(check(&target, &Pointer::new(0.25, 0.75, true), FRAME));
        // (0.76, 0.5) -> pixel (152, 100): just right of the box
        assert!(!check(&target, &Pointer::new(0.76, 0.5, true), FRAME));
    }

    #[test]
    fn test_out_of_range_pointer_is_clamped() {
        let target = target_at(100.0, 100.0);
        // Far outside the frame, clamps to the bottom-right corner (200, 200)
        assert!(check(&target, &Pointer::new(1.7, 3.0, true), FRAME));

        let corner = target_at(0.0, 0.0);
        assert!(check(&corner, &Pointer::new(-0.3, -1.0, true), FRAME));
    }

    #[test]
    fn test_first_hit_picks_earliest_pointer() {
        let target = target_at(50.0, 50.0);
        let pointers = PointerState::new(vec![
            Pointer::new(0.5, 0.5, false),
            Pointer::new(0.9, 0.9, true),
            Pointer::new(0.4, 0.4, true),
            Pointer::new(0.5, 0.5, true),
        ]);
        assert_eq!(first_hit(&target, &pointers, FRAME), Some(2));
    }

    #[test]
    fn test_first_hit_none() {
        let target = target_at(50.0, 50.0);
        assert_eq!(first_hit(&target, &PointerState::empty(), FRAME), None);
    }
}
