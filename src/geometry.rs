//! Pure placement and sizing math.
//!
//! Everything here is a function of target and mark dimensions; no I/O and
//! no images. The only impure entry point is [`resolve_position`], which
//! takes the caller's random source so that a `random` spec can be drawn.
//! The engine draws at most once per call and treats the result as fixed
//! from then on, so tests can inject a seeded generator.

use crate::params::{Coord, Corner, Position, Scale};
use rand::Rng;

/// Largest valid paste offset on each axis. Collapses to zero on an axis
/// where the mark is at least as large as the target.
pub fn max_offsets(target: (u32, u32), mark: (u32, u32)) -> (u32, u32) {
    (
        target.0.saturating_sub(mark.0),
        target.1.saturating_sub(mark.1),
    )
}

/// Offset that puts the mark flush against the named edges.
pub fn corner_offset(corner: Corner, target: (u32, u32), mark: (u32, u32)) -> (u32, u32) {
    let (max_left, max_top) = max_offsets(target, mark);
    match corner {
        Corner::TopLeft => (0, 0),
        Corner::TopRight => (max_left, 0),
        Corner::BottomLeft => (0, max_top),
        Corner::BottomRight => (max_left, max_top),
    }
}

/// Offset that centers the mark, by integer halving of the maximum offsets.
pub fn center_offset(target: (u32, u32), mark: (u32, u32)) -> (u32, u32) {
    let (max_left, max_top) = max_offsets(target, mark);
    (max_left / 2, max_top / 2)
}

/// Resolve one axis of a position pair against its maximum offset.
///
/// Percentages scale the maximum offset and are rounded to whole pixels.
/// Absolute values are clamped into `[0, max]`, so a negative or
/// out-of-bounds request never produces an invalid offset.
fn axis_offset(coord: Coord, max: u32) -> u32 {
    match coord {
        Coord::Absolute(px) => px.clamp(0, max as i64) as u32,
        Coord::Percent(pct) => ((max as f64 * pct).round() as i64).clamp(0, max as i64) as u32,
    }
}

/// Resolve a position spec into a concrete `(left, top)` paste offset.
///
/// Deterministic for every spec except [`Position::Random`], which draws
/// each axis uniformly from `[0, max_offset]` using `rng`.
pub fn resolve_position(
    position: Position,
    target: (u32, u32),
    mark: (u32, u32),
    rng: &mut impl Rng,
) -> (u32, u32) {
    let (max_left, max_top) = max_offsets(target, mark);
    match position {
        Position::Corner(corner) => corner_offset(corner, target, mark),
        Position::Center => center_offset(target, mark),
        Position::Random => (rng.gen_range(0..=max_left), rng.gen_range(0..=max_top)),
        Position::Pair { x, y } => (axis_offset(x, max_left), axis_offset(y, max_top)),
    }
}

/// Resolve a scale spec into concrete mark dimensions.
///
/// `Fit` applies `min(target_w / mark_w, target_h / mark_h)` to both axes,
/// maximizing the mark without overflowing the target while preserving its
/// aspect ratio. Dimensions never resolve below one pixel.
pub fn scale_dimensions(scale: Scale, target: (u32, u32), mark: (u32, u32)) -> (u32, u32) {
    match scale {
        Scale::Explicit(w, h) => (w, h),
        Scale::Multiplier(m) => apply_factor(mark, m),
        Scale::Fit => {
            let ratio = f64::min(
                target.0 as f64 / mark.0 as f64,
                target.1 as f64 / mark.1 as f64,
            );
            apply_factor(mark, ratio)
        }
    }
}

fn apply_factor(mark: (u32, u32), factor: f64) -> (u32, u32) {
    (
        ((mark.0 as f64 * factor) as u32).max(1),
        ((mark.1 as f64 * factor) as u32).max(1),
    )
}

/// Canvas size for a rotated mark: 1.5x each dimension, so corners of the
/// rotated image stay inside the canvas instead of being clipped.
pub fn rotated_canvas(mark: (u32, u32)) -> (u32, u32) {
    ((mark.0 as f64 * 1.5) as u32, (mark.1 as f64 * 1.5) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TARGET: (u32, u32) = (800, 600);
    const MARK: (u32, u32) = (100, 50);

    // =========================================================================
    // Offsets
    // =========================================================================

    #[test]
    fn max_offsets_normal() {
        assert_eq!(max_offsets(TARGET, MARK), (700, 550));
    }

    #[test]
    fn max_offsets_collapse_when_mark_larger() {
        assert_eq!(max_offsets((100, 50), (800, 600)), (0, 0));
        assert_eq!(max_offsets((800, 50), (100, 600)), (700, 0));
    }

    #[test]
    fn corner_offsets() {
        assert_eq!(corner_offset(Corner::TopLeft, TARGET, MARK), (0, 0));
        assert_eq!(corner_offset(Corner::TopRight, TARGET, MARK), (700, 0));
        assert_eq!(corner_offset(Corner::BottomLeft, TARGET, MARK), (0, 550));
        assert_eq!(corner_offset(Corner::BottomRight, TARGET, MARK), (700, 550));
    }

    #[test]
    fn corner_never_negative_with_oversized_mark() {
        assert_eq!(corner_offset(Corner::BottomRight, (100, 50), (800, 600)), (0, 0));
    }

    #[test]
    fn center_integer_halving() {
        assert_eq!(center_offset(TARGET, MARK), (350, 275));
        // odd remainders truncate
        assert_eq!(center_offset((801, 601), MARK), (350, 275));
    }

    #[test]
    fn center_never_negative_with_oversized_mark() {
        assert_eq!(center_offset((100, 50), (800, 600)), (0, 0));
    }

    #[test]
    fn pair_percent_scales_max_offset() {
        let pos = Position::Pair {
            x: Coord::Percent(0.5),
            y: Coord::Percent(0.5),
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_position(pos, TARGET, MARK, &mut rng), (350, 275));
    }

    #[test]
    fn pair_mixed_forms() {
        let pos = Position::Pair {
            x: Coord::Percent(0.5),
            y: Coord::Absolute(100),
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_position(pos, TARGET, MARK, &mut rng), (350, 100));
    }

    #[test]
    fn pair_absolute_clamped_into_range() {
        let pos = Position::Pair {
            x: Coord::Absolute(-20),
            y: Coord::Absolute(9999),
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(resolve_position(pos, TARGET, MARK, &mut rng), (0, 550));
    }

    #[test]
    fn random_within_valid_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let (left, top) = resolve_position(Position::Random, TARGET, MARK, &mut rng);
            assert!(left <= 700);
            assert!(top <= 550);
        }
    }

    #[test]
    fn random_collapses_to_zero_when_mark_covers_target() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            resolve_position(Position::Random, (100, 50), (800, 600), &mut rng),
            (0, 0)
        );
    }

    #[test]
    fn resolve_position_is_deterministic_for_non_random_specs() {
        let mut a = StdRng::seed_from_u64(1);
        let mut b = StdRng::seed_from_u64(2);
        let pos = Position::Corner(Corner::BottomRight);
        assert_eq!(
            resolve_position(pos, TARGET, MARK, &mut a),
            resolve_position(pos, TARGET, MARK, &mut b)
        );
    }

    // =========================================================================
    // Scale
    // =========================================================================

    #[test]
    fn scale_multiplier_truncates() {
        assert_eq!(scale_dimensions(Scale::Multiplier(1.5), TARGET, MARK), (150, 75));
        assert_eq!(scale_dimensions(Scale::Multiplier(0.5), TARGET, (101, 51)), (50, 25));
    }

    #[test]
    fn scale_fit_capped_by_binding_dimension() {
        // width ratio 2.0, height ratio 6.0; width binds
        assert_eq!(scale_dimensions(Scale::Fit, (800, 600), (400, 100)), (800, 200));
    }

    #[test]
    fn scale_fit_shrinks_oversized_mark() {
        assert_eq!(scale_dimensions(Scale::Fit, (400, 300), (800, 600)), (400, 300));
    }

    #[test]
    fn scale_explicit_passes_through() {
        assert_eq!(scale_dimensions(Scale::Explicit(120, 40), TARGET, MARK), (120, 40));
    }

    #[test]
    fn scale_never_below_one_pixel() {
        assert_eq!(scale_dimensions(Scale::Multiplier(0.001), TARGET, MARK), (1, 1));
    }

    // =========================================================================
    // Rotation canvas
    // =========================================================================

    #[test]
    fn rotated_canvas_is_one_and_a_half_times() {
        assert_eq!(rotated_canvas((100, 50)), (150, 75));
        assert_eq!(rotated_canvas((101, 51)), (151, 76));
    }
}
