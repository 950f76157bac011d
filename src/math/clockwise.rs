use std::cmp::Ordering;

use super::polygon_2d::centroid;
use super::Point3;

/// Orders points clockwise around an origin.
///
/// The angle of a point is measured with `atan2(dx, dy)`, i.e. from the
/// up axis rather than the right axis. Points are ordered by non-increasing
/// angle. When two points share an angle the one farther from the origin
/// comes first; bit-identical points compare equal.
///
/// A polygon in this order has a positive signed area, which is clockwise
/// with the y axis pointing down.
#[derive(Debug, Clone, Copy)]
pub struct ClockwiseComparer {
    origin: Point3,
}

impl ClockwiseComparer {
    /// Creates a comparer around `origin`.
    #[must_use]
    pub fn new(origin: Point3) -> Self {
        Self { origin }
    }

    /// Angle of `point` around the origin, using the `atan2(dx, dy)` axis
    /// convention.
    #[must_use]
    pub fn angle(&self, point: &Point3) -> f64 {
        let (dx, dy) = self.offset(point);
        dx.atan2(dy)
    }

    /// Compares two points. `Less` means `a` comes before `b`.
    #[must_use]
    pub fn compare(&self, a: &Point3, b: &Point3) -> Ordering {
        if bit_identical(a, b) {
            return Ordering::Equal;
        }
        let angle_a = self.angle(a);
        let angle_b = self.angle(b);
        angle_b
            .total_cmp(&angle_a)
            .then_with(|| self.distance_sq(b).total_cmp(&self.distance_sq(a)))
    }

    fn distance_sq(&self, point: &Point3) -> f64 {
        let (dx, dy) = self.offset(point);
        dx * dx + dy * dy
    }

    /// Offset from the origin with signed zeros folded to `+0.0`, so `atan2`
    /// gives one angle for points that differ only in the sign of a zero.
    fn offset(&self, point: &Point3) -> (f64, f64) {
        (point.x - self.origin.x + 0.0, point.y - self.origin.y + 0.0)
    }
}

fn bit_identical(a: &Point3, b: &Point3) -> bool {
    a.coords
        .iter()
        .zip(b.coords.iter())
        .all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Sorts `points` clockwise around `origin`.
pub fn sort_clockwise(points: &mut [Point3], origin: Point3) {
    let cmp = ClockwiseComparer::new(origin);
    points.sort_by(|a, b| cmp.compare(a, b));
}

/// Sorts `points` clockwise around their own centroid.
pub fn sort_clockwise_around_centroid(points: &mut [Point3]) {
    if points.is_empty() {
        return;
    }
    let origin = centroid(points);
    sort_clockwise(points, origin);
}

/// Returns `true` if `points` are already in clockwise order around `origin`.
#[must_use]
pub fn is_clockwise_sorted(points: &[Point3], origin: Point3) -> bool {
    let cmp = ClockwiseComparer::new(origin);
    points
        .windows(2)
        .all(|pair| cmp.compare(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::signed_area_2d;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn square_sorted_from_scrambled_input() {
        let mut pts = vec![p(0.0, 2.0), p(2.0, 0.0), p(0.0, 0.0), p(2.0, 2.0)];
        sort_clockwise_around_centroid(&mut pts);
        assert_eq!(pts, vec![p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0), p(0.0, 0.0)]);
    }

    #[test]
    fn angles_non_increasing_after_sort() {
        let mut pts = vec![
            p(3.0, 1.0),
            p(-2.0, 4.0),
            p(0.5, -3.0),
            p(-1.0, -1.5),
            p(4.0, 4.0),
            p(-3.0, 0.2),
            p(1.0, 5.0),
        ];
        let origin = centroid(&pts);
        sort_clockwise(&mut pts, origin);

        let cmp = ClockwiseComparer::new(origin);
        let angles: Vec<f64> = pts.iter().map(|pt| cmp.angle(pt)).collect();
        assert!(angles.windows(2).all(|w| w[0] >= w[1]), "{angles:?}");
        assert!(is_clockwise_sorted(&pts, origin));
    }

    #[test]
    fn sorted_polygon_has_positive_area() {
        let mut pts = vec![p(0.0, 0.0), p(4.0, 1.0), p(3.0, 5.0), p(-1.0, 3.0)];
        pts.reverse();
        sort_clockwise_around_centroid(&mut pts);
        assert!(signed_area_2d(&pts) > 0.0);
    }

    #[test]
    fn collinear_tie_puts_farther_point_first() {
        let origin = p(0.0, 0.0);
        // (0, 1) and (0, -1) are equidistant; (0, 1) and (0, 3) share an angle.
        for _ in 0..10 {
            let mut pts = vec![p(0.0, 1.0), p(0.0, -1.0), p(0.0, 3.0)];
            sort_clockwise(&mut pts, origin);
            assert_eq!(pts, vec![p(0.0, -1.0), p(0.0, 3.0), p(0.0, 1.0)]);
        }
        let cmp = ClockwiseComparer::new(origin);
        assert_eq!(cmp.compare(&p(0.0, 3.0), &p(0.0, 1.0)), Ordering::Less);
        assert_eq!(cmp.compare(&p(0.0, 1.0), &p(0.0, 3.0)), Ordering::Greater);
    }

    #[test]
    fn identical_points_compare_equal() {
        let cmp = ClockwiseComparer::new(p(1.0, 1.0));
        assert_eq!(cmp.compare(&p(2.5, -4.0), &p(2.5, -4.0)), Ordering::Equal);
    }

    #[test]
    fn signed_zero_offsets_share_one_angle() {
        let cmp = ClockwiseComparer::new(p(0.0, 0.0));
        let a = p(0.0, -1.0);
        let b = p(-0.0, -1.0);
        let c = p(1.0, 0.0);

        assert_eq!(cmp.angle(&a).to_bits(), cmp.angle(&b).to_bits());
        assert_eq!(cmp.compare(&a, &b), Ordering::Equal);
        assert_eq!(cmp.compare(&a, &c), Ordering::Less);
        assert_eq!(cmp.compare(&b, &c), Ordering::Less);
        assert_eq!(cmp.compare(&c, &b), Ordering::Greater);

        let mut pts = vec![c, b, p(-1.0, 0.0), a, p(0.0, 1.0), b];
        sort_clockwise(&mut pts, p(0.0, 0.0));
        assert!(is_clockwise_sorted(&pts, p(0.0, 0.0)));
        assert_eq!(pts[3], c);
    }

    #[test]
    fn bit_identity_distinguishes_signed_zero() {
        assert!(bit_identical(&p(0.0, -1.0), &p(0.0, -1.0)));
        assert!(!bit_identical(&p(0.0, -1.0), &p(-0.0, -1.0)));
    }

    #[test]
    fn angle_uses_up_axis_reference() {
        let cmp = ClockwiseComparer::new(p(0.0, 0.0));
        assert!(cmp.angle(&p(0.0, 1.0)).abs() < 1e-12);
        assert!((cmp.angle(&p(1.0, 0.0)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_left_alone() {
        let mut pts: Vec<Point3> = Vec::new();
        sort_clockwise_around_centroid(&mut pts);
        assert!(pts.is_empty());
    }
}
