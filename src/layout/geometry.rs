use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

/// Maps any angle into `[0, TAU)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

pub fn polar(angle: f32, radius: f32) -> Vec2 {
    vec2(angle.cos(), angle.sin()) * radius
}

pub fn angle_of(position: Vec2) -> f32 {
    normalize_angle(position.y.atan2(position.x))
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < 1e-5);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-5);
        assert!(normalize_angle(-1e-9) < TAU);
    }

    #[test]
    fn polar_round_trips_through_angle_of() {
        let point = polar(PI * 0.75, 120.0);
        assert!((point.length() - 120.0).abs() < 1e-3);
        assert!((angle_of(point) - PI * 0.75).abs() < 1e-5);
    }
}
