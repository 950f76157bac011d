use super::{Point3, Vector3, TOLERANCE};

/// Computes the signed area of a polygon in the XY plane (shoelace formula).
///
/// Positive for clockwise boundaries in editor convention (y axis down),
/// which is counter-clockwise in a y-up frame.
#[must_use]
pub fn signed_area_2d(points: &[Point3]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Arithmetic mean of the points. Returns the origin for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, pt| acc + pt.coords);
    Point3::from(sum / points.len() as f64)
}

/// Polygon normal by Newell's method, not normalized.
///
/// Its length is twice the polygon area; zero for a degenerate polygon.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Returns `true` if two consecutive vertices (including last → first) coincide.
#[must_use]
pub fn has_consecutive_duplicates(points: &[Point3]) -> bool {
    let n = points.len();
    (0..n).any(|i| {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        n > 1 && (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
    })
}

/// Twice the signed area of triangle `abc` in the XY plane.
#[must_use]
pub fn orient_2d(a: &Point3, b: &Point3, c: &Point3) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Returns `true` if closed segments `a0-a1` and `b0-b1` share any point in the XY plane.
#[must_use]
pub fn segments_touch_2d(a0: &Point3, a1: &Point3, b0: &Point3, b1: &Point3) -> bool {
    let d1 = orient_2d(b0, b1, a0);
    let d2 = orient_2d(b0, b1, a1);
    let d3 = orient_2d(a0, a1, b0);
    let d4 = orient_2d(a0, a1, b1);

    if ((d1 > TOLERANCE && d2 < -TOLERANCE) || (d1 < -TOLERANCE && d2 > TOLERANCE))
        && ((d3 > TOLERANCE && d4 < -TOLERANCE) || (d3 < -TOLERANCE && d4 > TOLERANCE))
    {
        return true;
    }

    (d1.abs() <= TOLERANCE && on_segment(b0, b1, a0))
        || (d2.abs() <= TOLERANCE && on_segment(b0, b1, a1))
        || (d3.abs() <= TOLERANCE && on_segment(a0, a1, b0))
        || (d4.abs() <= TOLERANCE && on_segment(a0, a1, b1))
}

/// For a point known to be collinear with `a-b`, checks it lies within the segment's box.
fn on_segment(a: &Point3, b: &Point3, p: &Point3) -> bool {
    p.x >= a.x.min(b.x) - TOLERANCE
        && p.x <= a.x.max(b.x) + TOLERANCE
        && p.y >= a.y.min(b.y) - TOLERANCE
        && p.y <= a.y.max(b.y) + TOLERANCE
}

/// Returns `true` if the closed polygon has no self-intersections in the XY plane.
///
/// Non-adjacent edges must not touch; adjacent edges must not fold back onto
/// each other. Fewer than 3 points or coincident consecutive points are not simple.
#[must_use]
pub fn is_simple_2d(points: &[Point3]) -> bool {
    let n = points.len();
    if n < 3 || has_consecutive_duplicates(points) {
        return false;
    }

    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let c = &points[(i + 2) % n];
        // Adjacent edges a-b and b-c overlap when c doubles back along a-b.
        if orient_2d(a, b, c).abs() <= TOLERANCE && (a - b).dot(&(c - b)) > 0.0 {
            return false;
        }
    }

    for i in 0..n {
        let a0 = &points[i];
        let a1 = &points[(i + 1) % n];
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = &points[j];
            let b1 = &points[(j + 1) % n];
            if segments_touch_2d(a0, a1, b0, b1) {
                return false;
            }
        }
    }
    true
}
