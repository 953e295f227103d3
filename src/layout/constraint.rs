use eframe::egui::{Vec2, vec2};

use super::geometry::{angle_of, polar};
use super::placement::Cell;

/// Slack on the radial bounds so a freshly projected point is a fixed point despite rounding.
const RADIUS_TOLERANCE: f32 = 1e-3;
const CENTER_NUDGE: f32 = 1e-3;

/// Clamps `position` back into `cell`.
///
/// The radius is always clamped to the cell's band. The angle is reset to the sector midpoint
/// only when `allow_angle_reset` is set, which is how a dragged node may leave its sector. A
/// position that is already valid is returned unchanged, so applying this every tick never
/// oscillates.
pub fn project(position: Vec2, cell: &Cell, allow_angle_reset: bool) -> Vec2 {
    let distance = position.length();
    let mut projected = if !distance.is_finite() || distance <= f32::EPSILON {
        vec2(cell.min_radius + CENTER_NUDGE, 0.0)
    } else if distance < cell.min_radius - RADIUS_TOLERANCE {
        position * (cell.min_radius / distance)
    } else if distance > cell.max_radius + RADIUS_TOLERANCE {
        position * (cell.max_radius / distance)
    } else {
        position
    };

    if allow_angle_reset && !cell.sector.contains(angle_of(projected)) {
        projected = polar(cell.sector.midpoint(), projected.length());
    }

    projected
}

pub fn is_inside(position: Vec2, cell: &Cell) -> bool {
    let distance = position.length();
    distance >= cell.min_radius - RADIUS_TOLERANCE
        && distance <= cell.max_radius + RADIUS_TOLERANCE
        && cell.sector.contains(angle_of(position))
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    use proptest::prelude::*;

    use super::*;
    use crate::layout::sectors::Sector;

    fn cell(start_angle: f32, end_angle: f32) -> Cell {
        Cell {
            min_radius: 20.0,
            max_radius: 180.0,
            sector: Sector {
                category: "A".into(),
                period: "1a".into(),
                start_angle,
                end_angle,
            },
        }
    }

    #[test]
    fn valid_position_is_untouched() {
        let cell = cell(0.0, PI);
        let position = polar(1.0, 90.0);
        assert_eq!(project(position, &cell, true), position);
        assert!(is_inside(position, &cell));
    }

    #[test]
    fn radius_is_clamped_to_band() {
        let cell = cell(0.0, PI);
        let inside = project(polar(1.0, 5.0), &cell, true);
        assert!((inside.length() - 20.0).abs() < 1e-3);
        assert!((angle_of(inside) - 1.0).abs() < 1e-4);

        let outside = project(polar(1.0, 500.0), &cell, true);
        assert!((outside.length() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn out_of_sector_angle_resets_to_midpoint_at_current_distance() {
        let cell = cell(0.0, PI);
        let projected = project(polar(3.0 * FRAC_PI_2, 120.0), &cell, true);
        assert!((angle_of(projected) - FRAC_PI_2).abs() < 1e-4);
        assert!((projected.length() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn dragging_keeps_angle_but_clamps_radius() {
        let cell = cell(0.0, PI);
        let projected = project(polar(3.0 * FRAC_PI_2, 900.0), &cell, false);
        assert!((angle_of(projected) - 3.0 * FRAC_PI_2).abs() < 1e-4);
        assert!((projected.length() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn center_is_nudged_outward() {
        let lower = cell(0.0, PI);
        let projected = project(Vec2::ZERO, &lower, false);
        assert_eq!(projected, vec2(20.0 + CENTER_NUDGE, 0.0));

        let upper = cell(PI, TAU);
        let reset = project(Vec2::ZERO, &upper, true);
        assert!(is_inside(reset, &upper));
        assert!(reset.x.is_finite() && reset.y.is_finite());
    }

    #[test]
    fn wraparound_sector_is_respected() {
        let cell = cell(5.5, 0.5);
        let position = polar(0.2, 100.0);
        assert_eq!(project(position, &cell, true), position);

        let moved = project(polar(3.0, 100.0), &cell, true);
        assert!(cell.sector.contains(angle_of(moved)));
    }

    proptest! {
        #[test]
        fn projection_is_idempotent(
            x in -600.0f32..600.0,
            y in -600.0f32..600.0,
            start in 0.0f32..6.2,
            width in 0.05f32..6.2,
            allow_angle_reset in any::<bool>(),
        ) {
            let end = crate::layout::geometry::normalize_angle(start + width);
            let cell = cell(start, if end == start { TAU } else { end });
            let once = project(vec2(x, y), &cell, allow_angle_reset);
            let twice = project(once, &cell, allow_angle_reset);

            prop_assert_eq!(once, twice);
            if allow_angle_reset {
                prop_assert!(is_inside(once, &cell));
            }
        }
    }
}
