//! Circle geometry for robots and particles
//!
//! Every body in the arena is a circle. Overlap tests tolerate contact up to
//! `EPSIL_ZERO`, so two circles resting exactly against each other do not
//! collide.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{EPSIL_ALIGNEMENT, EPSIL_ZERO};
use crate::normalize_angle;

/// A circle in the arena plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

/// Angle of the vector a→b, in (-π, π]
#[inline]
pub fn angle(a: DVec2, b: DVec2) -> f64 {
    let d = b - a;
    normalize_angle(d.y.atan2(d.x))
}

/// True if either coordinate lies outside [-max, max]
#[inline]
pub fn is_outside_bounds(point: DVec2, max: f64) -> bool {
    point.x.abs() > max || point.y.abs() > max
}

/// True if the angle lies outside [-π, π] (before normalization)
#[inline]
pub fn is_angle_out_of_range(alpha: f64) -> bool {
    alpha.abs() > std::f64::consts::PI
}

/// True if the point lies strictly inside the circle, with tolerance
#[inline]
pub fn is_point_inside_circle(point: DVec2, circle: &Circle) -> bool {
    distance(point, circle.center) < circle.radius - EPSIL_ZERO
}

/// Overlap test between two circles
///
/// Returns whether they overlap beyond tolerance, along with the distance
/// between their centres so callers do not need to recompute it.
#[inline]
pub fn circles_collide(a: &Circle, b: &Circle) -> (bool, f64) {
    let dist = distance(a.center, b.center);
    (dist < a.radius + b.radius - EPSIL_ZERO, dist)
}

/// Angular offset between `heading` and the bearing from `from` to `to`
///
/// `None` when the two points coincide (bearing undefined).
pub fn angular_offset(from: DVec2, heading: f64, to: DVec2) -> Option<f64> {
    if distance(from, to) > EPSIL_ZERO {
        Some(normalize_angle(angle(from, to) - heading))
    } else {
        None
    }
}

/// True if `heading` points at `to` within `EPSIL_ALIGNEMENT`
pub fn is_aligned(from: DVec2, heading: f64, to: DVec2) -> bool {
    angular_offset(from, heading, to).is_some_and(|offset| offset.abs() < EPSIL_ALIGNEMENT)
}

/// Shorten a travel segment so a moving circle stops at first contact
///
/// Triangle with sides `la` (distance travelled), `lb` (tentative distance
/// to the obstacle) and `lc` (start distance to the obstacle). Keeping `lc`
/// fixed and lengthening `lb` to `lb_new` (sum of radii), returns the new
/// travel length from the law of cosines.
///
/// Requires `la, lc > EPSIL_ZERO`, `lb >= 0` and `lb <= lb_new <= lc`.
pub fn resolve_overlap_distance(la: f64, lb: f64, lc: f64, lb_new: f64) -> Option<f64> {
    if !(la > EPSIL_ZERO && lb >= 0.0 && lc > EPSIL_ZERO && lb_new >= lb && lb_new <= lc) {
        return None;
    }
    let cos_beta = (la * la + lc * lc - lb * lb) / (2.0 * la * lc);
    let b = -2.0 * lc * cos_beta;
    let c = lc * lc - lb_new * lb_new;
    // Rounding can push an exactly tangent case slightly negative
    let discriminant = (b * b - 4.0 * c).max(0.0);
    let la_new = (-b - discriminant.sqrt()) / 2.0;
    la_new.is_finite().then_some(la_new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_angle_quadrants() {
        let o = DVec2::ZERO;
        assert!((angle(o, DVec2::new(1.0, 0.0))).abs() < 1e-12);
        assert!((angle(o, DVec2::new(0.0, 1.0)) - PI / 2.0).abs() < 1e-12);
        assert!((angle(o, DVec2::new(-1.0, 0.0)) - PI).abs() < 1e-12);
        assert!((angle(o, DVec2::new(0.0, -1.0)) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_and_angle_range() {
        assert!(!is_outside_bounds(DVec2::new(20.0, -20.0), 20.0));
        assert!(is_outside_bounds(DVec2::new(20.1, 0.0), 20.0));
        assert!(!is_angle_out_of_range(PI));
        assert!(!is_angle_out_of_range(-PI));
        assert!(is_angle_out_of_range(3.2));
    }

    #[test]
    fn test_point_inside_circle_tolerance() {
        let c = Circle::new(DVec2::ZERO, 1.0);
        assert!(is_point_inside_circle(DVec2::new(0.5, 0.0), &c));
        // On the rim (within tolerance) is not inside
        assert!(!is_point_inside_circle(DVec2::new(0.995, 0.0), &c));
    }

    #[test]
    fn test_circles_touching_do_not_collide() {
        let a = Circle::new(DVec2::ZERO, 0.5);
        let b = Circle::new(DVec2::new(1.0, 0.0), 0.5);
        let (hit, dist) = circles_collide(&a, &b);
        assert!(!hit);
        assert!((dist - 1.0).abs() < 1e-12);

        let c = Circle::new(DVec2::new(0.5, 0.0), 0.5);
        assert!(circles_collide(&a, &c).0);
    }

    #[test]
    fn test_angular_offset_undefined_when_coincident() {
        assert!(angular_offset(DVec2::ZERO, 0.0, DVec2::new(0.001, 0.0)).is_none());
        let offset = angular_offset(DVec2::ZERO, PI / 2.0, DVec2::new(1.0, 0.0)).unwrap();
        assert!((offset + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_alignment() {
        assert!(is_aligned(DVec2::ZERO, 0.05, DVec2::new(5.0, 0.0)));
        assert!(!is_aligned(DVec2::ZERO, 0.07, DVec2::new(5.0, 0.0)));
        assert!(!is_aligned(DVec2::ZERO, 0.0, DVec2::ZERO));
    }

    #[test]
    fn test_resolve_overlap_head_on() {
        // Robot moves 0.1875 straight at an obstacle 1.625 away, needs 1.5 clearance
        let la_new = resolve_overlap_distance(0.1875, 1.4375, 1.625, 1.5).unwrap();
        assert!((la_new - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_overlap_rejects_invalid_triangle() {
        assert!(resolve_overlap_distance(0.0, 1.0, 2.0, 1.5).is_none());
        assert!(resolve_overlap_distance(0.5, 1.0, 0.0, 1.5).is_none());
        // lb_new beyond the starting distance: the start already overlapped
        assert!(resolve_overlap_distance(0.5, 1.0, 1.2, 1.5).is_none());
        // lb_new shorter than lb: nothing to resolve
        assert!(resolve_overlap_distance(0.5, 1.6, 2.0, 1.5).is_none());
    }

    proptest! {
        #[test]
        fn collision_is_symmetric(
            ax in -20.0f64..20.0, ay in -20.0f64..20.0, ar in 0.1f64..4.0,
            bx in -20.0f64..20.0, by in -20.0f64..20.0, br in 0.1f64..4.0,
        ) {
            let a = Circle::new(DVec2::new(ax, ay), ar);
            let b = Circle::new(DVec2::new(bx, by), br);
            prop_assert_eq!(circles_collide(&a, &b).0, circles_collide(&b, &a).0);
        }
    }
}
