//! Lateral deviation of a point sequence from the baseline.

use crate::baseline::BaselineFrame;
use crate::geo::GeoPoint;

/// Largest absolute across-baseline distance over `points`, in meters.
///
/// An empty sequence has no measurable deviation and yields `0.0`.
pub fn max_lateral_offset(points: &[GeoPoint], frame: &BaselineFrame) -> f64 {
    points
        .iter()
        .map(|point| frame.to_local(*point).across.abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Utm;
    use crate::spatial::offset_by_bearing;

    const A: GeoPoint = GeoPoint::new(51.55166, 4.93284);
    const B: GeoPoint = GeoPoint::new(51.56619, 4.94022);

    fn frame() -> BaselineFrame {
        BaselineFrame::new(A, B, Utm::new(31, true).unwrap()).unwrap()
    }

    #[test]
    fn empty_sequence_is_zero() {
        assert_eq!(max_lateral_offset(&[], &frame()), 0.0);
    }

    #[test]
    fn points_on_the_baseline_have_no_offset() {
        let offset = max_lateral_offset(&[A, B], &frame());
        assert!(offset < 1e-6);
    }

    #[test]
    fn matches_brute_force_maximum() {
        let frame = frame();
        let points: Vec<GeoPoint> = (0..40)
            .map(|i| {
                let bearing = (i as f64 * 37.0).to_radians();
                offset_by_bearing(A, 50.0 + i as f64 * 31.0, bearing)
            })
            .collect();

        let mut expected = 0.0_f64;
        for p in &points {
            let across = frame.to_local(*p).across.abs();
            if across > expected {
                expected = across;
            }
        }

        let offset = max_lateral_offset(&points, &frame);
        assert!(offset >= 0.0);
        assert_eq!(offset, expected);
    }

    #[test]
    fn offset_is_perpendicular_distance() {
        let frame = frame();
        // Step 700 m perpendicular to the baseline from its start.
        let heading = crate::spatial::bearing(A, B);
        let side = offset_by_bearing(A, 700.0, heading - std::f64::consts::FRAC_PI_2);
        let offset = max_lateral_offset(&[A, side, B], &frame);
        assert!((offset - 700.0).abs() < 5.0, "offset {offset}");
    }
}
