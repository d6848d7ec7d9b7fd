//! Plane geometry helpers shared by the transform engine, hit testing,
//! and the constrained point picking in the bulk-move flow.
//!
//! All angles are in degrees. Pure functions — no state, no failure
//! modes beyond standard floating-point semantics.

use kurbo::Point;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Midpoint of the segment a–b.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Angle of the vector a→b in degrees, measured counter-clockwise from
/// the positive x axis. Coincident points yield 0.
pub fn angle(a: Point, b: Point) -> f64 {
    if a == b {
        0.0
    } else {
        (b.y - a.y).atan2(b.x - a.x).to_degrees()
    }
}

/// Signed smallest-magnitude equivalent of an angular difference.
///
/// Uses a true IEEE-754 remainder (round-ties-even), not a truncating
/// modulo: a truncating modulo biases results past ±180°.
pub fn angle_difference(to_deg: f64, from_deg: f64) -> f64 {
    ieee_remainder(to_deg - from_deg, 360.0)
}

/// IEEE-754 `remainder` operation: `x - y * n` where `n` is `x / y`
/// rounded to the nearest integer, ties to even.
pub fn ieee_remainder(x: f64, y: f64) -> f64 {
    x - y * (x / y).round_ties_even()
}

/// Point on the segment start–end closest to `p`.
///
/// Degenerate segments (start == end) yield `start`.
pub fn closest_point_on_segment(start: Point, end: Point, p: Point) -> Point {
    let d = end - start;
    let len_sq = d.hypot2();
    if len_sq == 0.0 {
        return start;
    }

    let u = ((p - start).dot(d) / len_sq).clamp(0.0, 1.0);
    start + d * u
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let d = distance(Point::new(1.0, 2.0), Point::new(4.0, 6.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn angle_of_axes() {
        let o = Point::ORIGIN;
        assert_eq!(angle(o, Point::new(10.0, 0.0)), 0.0);
        assert!((angle(o, Point::new(0.0, 10.0)) - 90.0).abs() < 1e-12);
        assert!((angle(o, Point::new(-10.0, 0.0)) - 180.0).abs() < 1e-12);
        assert!((angle(o, Point::new(0.0, -10.0)) + 90.0).abs() < 1e-12);
    }

    #[test]
    fn angle_of_coincident_points_is_zero() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(angle(p, p), 0.0);
    }

    #[test]
    fn difference_normalizes_past_half_turn() {
        // 270° apart should come back as the smaller -90° rotation.
        assert!((angle_difference(270.0, 0.0) + 90.0).abs() < 1e-12);
        assert!((angle_difference(0.0, 270.0) - 90.0).abs() < 1e-12);
        // Already-small differences pass through unchanged.
        assert!((angle_difference(30.0, 10.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn remainder_rounds_ties_to_even() {
        // 540 / 360 = 1.5: ties-to-even picks n = 2, so the result is -180.
        assert!((ieee_remainder(540.0, 360.0) + 180.0).abs() < 1e-12);
        // 180 / 360 = 0.5: ties-to-even picks n = 0, so 180 stays 180.
        assert!((ieee_remainder(180.0, 360.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn closest_point_clamps_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(
            closest_point_on_segment(a, b, Point::new(5.0, 3.0)),
            Point::new(5.0, 0.0)
        );
        assert_eq!(
            closest_point_on_segment(a, b, Point::new(-4.0, 1.0)),
            a,
            "points before the segment clamp to its start"
        );
        assert_eq!(
            closest_point_on_segment(a, b, Point::new(14.0, -2.0)),
            b,
            "points past the segment clamp to its end"
        );
    }

    #[test]
    fn closest_point_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        assert_eq!(closest_point_on_segment(a, a, Point::new(9.0, 9.0)), a);
    }
}
