//! Circular arithmetic on ecliptic longitudes.
//!
//! Every longitude, distance and midpoint in the engine goes through these
//! helpers so the 0°/360° seam is handled in one place.

/// Tolerance used when comparing degrees that went through floating point
/// normalization.
pub const DEGREE_EPSILON: f64 = 1e-9;

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Absolute distance between two longitudes measured on the circle, in `[0, 180]`.
pub fn circular_distance(lon1: f64, lon2: f64) -> f64 {
    let raw_diff = (lon1 - lon2).abs() % 360.0;
    if raw_diff > 180.0 {
        360.0 - raw_diff
    } else {
        raw_diff
    }
}

/// Signed separation `lon1 - lon2` wrapped into `(-180, 180]`.
///
/// Positive when `lon1` lies ahead of `lon2` along the shorter arc.
pub fn signed_separation(lon1: f64, lon2: f64) -> f64 {
    let diff = normalize_degrees(lon1 - lon2);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Midpoint of two longitudes along the shorter arc between them.
///
/// The inputs are ordered before the arc is measured, so an exactly antipodal
/// pair resolves to the same midpoint whichever argument comes first.
pub fn circular_midpoint(lon1: f64, lon2: f64) -> f64 {
    let a = normalize_degrees(lon1);
    let b = normalize_degrees(lon2);
    let (lon_a, lon_b) = if a <= b { (a, b) } else { (b, a) };

    let diff = normalize_degrees(lon_b - lon_a);
    if diff <= 180.0 {
        normalize_degrees(lon_a + diff / 2.0)
    } else {
        normalize_degrees(lon_b + (360.0 - diff) / 2.0)
    }
}

/// Whether `lon` lies on the shorter arc joining `from` and `to` (inclusive).
pub fn lies_on_shorter_arc(lon: f64, from: f64, to: f64) -> bool {
    let span = circular_distance(from, to);
    let via = circular_distance(from, lon) + circular_distance(lon, to);
    (via - span).abs() < DEGREE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);
    }

    #[test]
    fn test_circular_distance_wraps_through_zero() {
        assert_eq!(circular_distance(5.0, 355.0), 10.0);
        assert_eq!(circular_distance(355.0, 5.0), 10.0);
        assert_eq!(circular_distance(10.0, 70.0), 60.0);
        assert_eq!(circular_distance(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_circular_distance_symmetric_and_bounded() {
        let mut a = 0.0;
        while a < 360.0 {
            let mut b = 0.0;
            while b < 360.0 {
                let d = circular_distance(a, b);
                assert_eq!(d, circular_distance(b, a));
                assert!((0.0..=180.0).contains(&d), "d({a}, {b}) = {d}");
                b += 17.5;
            }
            a += 13.25;
        }
    }

    #[test]
    fn test_signed_separation() {
        assert_eq!(signed_separation(10.0, 350.0), 20.0);
        assert_eq!(signed_separation(350.0, 10.0), -20.0);
        assert_eq!(signed_separation(180.0, 0.0), 180.0);
    }

    #[test]
    fn test_midpoint_across_zero() {
        assert_eq!(circular_midpoint(10.0, 350.0), 0.0);
        assert_eq!(circular_midpoint(350.0, 10.0), 0.0);
        assert_eq!(circular_midpoint(20.0, 40.0), 30.0);
        assert_eq!(circular_midpoint(300.0, 100.0), 20.0);
    }

    #[test]
    fn test_midpoint_antipodal_is_order_independent() {
        assert_eq!(circular_midpoint(0.0, 180.0), circular_midpoint(180.0, 0.0));
        assert_eq!(circular_midpoint(0.0, 180.0), 90.0);
        assert_eq!(circular_midpoint(270.0, 90.0), 180.0);
    }

    #[test]
    fn test_midpoint_on_shorter_arc_and_symmetric() {
        let mut a = 0.0;
        while a < 360.0 {
            let mut b = 0.0;
            while b < 360.0 {
                let m = circular_midpoint(a, b);
                assert_eq!(m, circular_midpoint(b, a));
                assert!((0.0..360.0).contains(&m));
                assert!(lies_on_shorter_arc(m, a, b), "midpoint({a}, {b}) = {m}");
                b += 23.0;
            }
            a += 11.0;
        }
    }
}
