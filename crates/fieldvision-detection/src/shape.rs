//! Pure geometric descriptors over contour point sets.
//!
//! The oriented-box rotation convention used throughout the crate: the
//! caliper edge angle is reduced mod 90 and shifted into `(-90, 0]`, so a
//! stripe leaning 15 degrees off vertical reports -75 while one leaning 75
//! off vertical reports -15. Axis-aligned boxes report 0. Near-square boxes
//! report the angle as measured; no renormalization is applied.

use imageproc::point::Point;

/// Minimal enclosing circle of a contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleCandidate {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_px: f64,
}

/// Axis-aligned bounding box with pixel-count extents, matching the
/// `boundingRect` convention (`width = max_x - min_x + 1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Minimal-area rotated bounding box. Extents are geometric spans, and
/// `width` is the span along the caliper edge the box rests on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

// Axis-aligned bounds of a point set.
pub fn bounding_rect(points: &[Point<i32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

// Andrew monotone chain. Returns hull vertices in counter-clockwise order
// (image coordinates, y down).
fn convex_hull(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut pts: Vec<Point<i32>> = points.to_vec();
    pts.sort_unstable_by(|a, b| (a.x, a.y).cmp(&(b.x, b.y)));
    pts.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: Point<i32>, a: Point<i32>, b: Point<i32>) -> i64 {
        (a.x as i64 - o.x as i64) * (b.y as i64 - o.y as i64)
            - (a.y as i64 - o.y as i64) * (b.x as i64 - o.x as i64)
    }

    let mut lower: Vec<Point<i32>> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point<i32>> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Deterministic minimal enclosing circle (incremental construction over
/// the convex hull, fixed visiting order). `None` for an empty point set.
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<CircleCandidate> {
    if points.is_empty() {
        return None;
    }
    let hull = convex_hull(points);
    let pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();

    let mut circle = (pts[0].0, pts[0].1, 0.0);
    for i in 1..pts.len() {
        if contains(circle, pts[i]) {
            continue;
        }
        circle = (pts[i].0, pts[i].1, 0.0);
        for j in 0..i {
            if contains(circle, pts[j]) {
                continue;
            }
            circle = circle_from_two(pts[i], pts[j]);
            for k in 0..j {
                if !contains(circle, pts[k]) {
                    circle = circle_from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }

    Some(CircleCandidate {
        center_x: circle.0,
        center_y: circle.1,
        radius_px: circle.2,
    })
}

fn contains(circle: (f64, f64, f64), p: (f64, f64)) -> bool {
    let dx = p.0 - circle.0;
    let dy = p.1 - circle.1;
    (dx * dx + dy * dy).sqrt() <= circle.2 + 1e-7 * (1.0 + circle.2)
}

fn circle_from_two(a: (f64, f64), b: (f64, f64)) -> (f64, f64, f64) {
    let cx = (a.0 + b.0) / 2.0;
    let cy = (a.1 + b.1) / 2.0;
    let r = ((a.0 - b.0).hypot(a.1 - b.1)) / 2.0;
    (cx, cy, r)
}

fn circle_from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> (f64, f64, f64) {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < 1e-12 {
        // Collinear; fall back to the widest two-point circle.
        let candidates = [
            circle_from_two(a, b),
            circle_from_two(b, c),
            circle_from_two(a, c),
        ];
        return candidates
            .into_iter()
            .max_by(|x, y| x.2.total_cmp(&y.2))
            .unwrap_or((a.0, a.1, 0.0));
    }
    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let cx = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let cy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let r = (a.0 - cx).hypot(a.1 - cy);
    (cx, cy, r)
}

/// Minimal-area rotated bounding box via rotating calipers over the convex
/// hull. `None` for an empty point set; a single point yields a degenerate
/// zero-extent box at angle 0.
pub fn oriented_rect(points: &[Point<i32>]) -> Option<OrientedBox> {
    let hull = convex_hull(points);
    let first = hull.first()?;
    if hull.len() == 1 {
        return Some(OrientedBox {
            center_x: first.x as f64,
            center_y: first.y as f64,
            width: 0.0,
            height: 0.0,
            angle_deg: 0.0,
        });
    }

    let pts: Vec<(f64, f64)> = hull.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    let mut best: Option<(f64, usize, f64, f64, f64, f64)> = None;

    for i in 0..pts.len() {
        let a = pts[i];
        let b = pts[(i + 1) % pts.len()];
        let (mut ux, mut uy) = (b.0 - a.0, b.1 - a.1);
        let len = ux.hypot(uy);
        if len < 1e-12 {
            continue;
        }
        ux /= len;
        uy /= len;

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &pts {
            let u = x * ux + y * uy;
            let v = -x * uy + y * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        let area = (max_u - min_u) * (max_v - min_v);
        if best.map_or(true, |(best_area, ..)| area < best_area) {
            best = Some((area, i, min_u, max_u, min_v, max_v));
        }
    }

    let (_, i, min_u, max_u, min_v, max_v) = best?;
    let a = pts[i];
    let b = pts[(i + 1) % pts.len()];
    let len = (b.0 - a.0).hypot(b.1 - a.1);
    let (ux, uy) = ((b.0 - a.0) / len, (b.1 - a.1) / len);

    let cu = (min_u + max_u) / 2.0;
    let cv = (min_v + max_v) / 2.0;
    let center_x = cu * ux - cv * uy;
    let center_y = cu * uy + cv * ux;

    Some(OrientedBox {
        center_x,
        center_y,
        width: max_u - min_u,
        height: max_v - min_v,
        angle_deg: canonical_angle(uy.atan2(ux).to_degrees()),
    })
}

// Reduces an edge angle to the crate convention: `(-90, 0]`, with
// axis-aligned edges mapping to 0.
fn canonical_angle(edge_deg: f64) -> f64 {
    let reduced = edge_deg.rem_euclid(90.0);
    if reduced == 0.0 {
        0.0
    } else {
        reduced - 90.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rotated_rect_points(
        cx: f64,
        cy: f64,
        half_long: f64,
        half_short: f64,
        long_axis_deg: f64,
    ) -> Vec<Point<i32>> {
        let (sin, cos) = long_axis_deg.to_radians().sin_cos();
        [
            (half_long, half_short),
            (-half_long, half_short),
            (-half_long, -half_short),
            (half_long, -half_short),
        ]
        .iter()
        .map(|&(x, y)| {
            Point::new(
                (cx + x * cos - y * sin).round() as i32,
                (cy + x * sin + y * cos).round() as i32,
            )
        })
        .collect()
    }

    #[test]
    fn enclosing_circle_of_square_corners() {
        let pts = vec![
            Point::new(0, 0),
            Point::new(4, 0),
            Point::new(0, 4),
            Point::new(4, 4),
        ];
        let circle = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(circle.center_x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(circle.center_y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(circle.radius_px, 8.0_f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn enclosing_circle_of_single_point_is_degenerate() {
        let circle = min_enclosing_circle(&[Point::new(7, 9)]).unwrap();
        assert_eq!(circle.radius_px, 0.0);
        assert_eq!((circle.center_x, circle.center_y), (7.0, 9.0));
    }

    #[test]
    fn enclosing_circle_of_empty_set_is_none() {
        assert!(min_enclosing_circle(&[]).is_none());
    }

    #[test]
    fn enclosing_circle_of_collinear_points_spans_them() {
        let pts = vec![Point::new(0, 0), Point::new(10, 0), Point::new(4, 0)];
        let circle = min_enclosing_circle(&pts).unwrap();
        assert_relative_eq!(circle.center_x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(circle.radius_px, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn bounding_rect_uses_pixel_count_extents() {
        let pts = vec![Point::new(2, 3), Point::new(9, 3), Point::new(5, 11)];
        let rect = bounding_rect(&pts).unwrap();
        assert_eq!(rect, BoundingBox { x: 2, y: 3, width: 8, height: 9 });
    }

    #[test]
    fn axis_aligned_box_reports_zero_angle() {
        let pts = vec![
            Point::new(10, 10),
            Point::new(40, 10),
            Point::new(40, 20),
            Point::new(10, 20),
        ];
        let rect = oriented_rect(&pts).unwrap();
        assert_relative_eq!(rect.angle_deg, 0.0, epsilon = 1e-9);
        assert_relative_eq!(rect.width * rect.height, 300.0, epsilon = 1e-6);
        assert_relative_eq!(rect.center_x, 25.0, epsilon = 1e-9);
        assert_relative_eq!(rect.center_y, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn steep_stripe_reports_near_minus_75() {
        // Long axis 14.5 degrees off vertical, the 2019 chevron left stripe.
        let pts = rotated_rect_points(500.0, 300.0, 200.0, 50.0, 104.5);
        let rect = oriented_rect(&pts).unwrap();
        assert_relative_eq!(rect.angle_deg, -75.5, epsilon = 1.0);
    }

    #[test]
    fn shallow_stripe_reports_near_minus_15() {
        let pts = rotated_rect_points(500.0, 300.0, 200.0, 50.0, 75.5);
        let rect = oriented_rect(&pts).unwrap();
        assert_relative_eq!(rect.angle_deg, -14.5, epsilon = 1.0);
    }

    #[test]
    fn near_square_angle_is_reported_as_measured() {
        let pts = rotated_rect_points(300.0, 300.0, 100.0, 99.0, 30.0);
        let rect = oriented_rect(&pts).unwrap();
        assert_relative_eq!(rect.angle_deg, -60.0, epsilon = 1.0);
    }
}
