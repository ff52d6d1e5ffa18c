//! Small 2D vector helpers shared by the sensor and steering code

use glam::Vec2;

/// Tolerance for parallel / degenerate tests
const EPSILON: f32 = 1e-6;

/// Project `point` onto the infinite line through `origin` and `through`.
///
/// Returns `origin` when the line is degenerate (both points coincide).
pub fn project_onto_line(point: Vec2, origin: Vec2, through: Vec2) -> Vec2 {
    let u = through - origin;
    let mag_sq = u.length_squared();
    if mag_sq == 0.0 {
        return origin;
    }
    let k = (point - origin).dot(u) / mag_sq;
    origin + k * u
}

/// Perpendicular distance from `point` to the line through `origin` and `through`
#[inline]
pub fn distance_to_line(point: Vec2, origin: Vec2, through: Vec2) -> f32 {
    point.distance(project_onto_line(point, origin, through))
}

/// Split `v` into components parallel and perpendicular to `axis`.
///
/// A zero axis yields a zero parallel part (everything is perpendicular).
pub fn decompose(v: Vec2, axis: Vec2) -> (Vec2, Vec2) {
    let u = axis.normalize_or_zero();
    let parallel = v.dot(u) * u;
    (parallel, v - parallel)
}

/// Intersect a ray with the segment `a`-`b`.
///
/// `dir` must be unit length; the ray is limited to `[0, max_range]`.
/// Returns the distance along the ray of the nearest shared point. When the
/// segment lies on the ray the nearest point of the overlap is returned.
pub fn ray_segment_intersection(
    origin: Vec2,
    dir: Vec2,
    max_range: f32,
    a: Vec2,
    b: Vec2,
) -> Option<f32> {
    let edge = b - a;
    let denom = dir.perp_dot(edge);
    let to_a = a - origin;

    if denom.abs() < EPSILON {
        // Parallel: only a collinear overlap can hit
        if to_a.perp_dot(dir).abs() > EPSILON * max_range.max(1.0) {
            return None;
        }
        let ta = to_a.dot(dir);
        let tb = (b - origin).dot(dir);
        let (lo, hi) = if ta <= tb { (ta, tb) } else { (tb, ta) };
        if hi < 0.0 || lo > max_range {
            return None;
        }
        return Some(lo.max(0.0));
    }

    // origin + t*dir = a + s*edge
    let t = to_a.perp_dot(edge) / denom;
    let s = to_a.perp_dot(dir) / denom;
    if (0.0..=max_range).contains(&t) && (-EPSILON..=1.0 + EPSILON).contains(&s) {
        Some(t)
    } else {
        None
    }
}

/// Signed area of a closed ring (positive when counter-clockwise in y-up axes)
pub fn signed_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, &p) in vertices.iter().enumerate() {
        let q = vertices[(i + 1) % vertices.len()];
        sum += p.perp_dot(q);
    }
    sum * 0.5
}
