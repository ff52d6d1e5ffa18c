//! Guidance curve shaping
//!
//! The guidance curve is a quadratic Bézier from the user to the steering
//! endpoint. Its control point starts at the midpoint and is pushed sideways
//! by the quadrant repulsion and by any cloud points hugging the straight path.

use glam::Vec2;

use super::geometry::project_onto_line;

/// Bend intensity from the nearest obstacle distance.
///
/// 0.3 for obstacles at or beyond `threshold`, rising linearly to 1.0 at
/// distance zero.
pub fn bend_intensity(min_dist: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 0.3;
    }
    0.3 + 0.7 * (threshold - min_dist).max(0.0) / threshold
}

/// Local push away from cloud points close to the straight path.
///
/// Every point whose perpendicular distance to the line `start -> end` is
/// below `avoid_thresh` adds `(avoid_thresh - dist) * repulsion_factor` in the
/// direction from the point toward its projection on the line. Points lying
/// on the line have no defined side and add nothing.
pub fn repulsion_control_offset(
    start: Vec2,
    end: Vec2,
    points: &[Vec2],
    avoid_thresh: f32,
    repulsion_factor: f32,
) -> Vec2 {
    points.iter().fold(Vec2::ZERO, |acc, &pt| {
        let projection = project_onto_line(pt, start, end);
        let dist = pt.distance(projection);
        if dist >= avoid_thresh {
            return acc;
        }
        let away = (projection - pt).normalize_or_zero();
        acc + away * (avoid_thresh - dist) * repulsion_factor
    })
}

/// Control point for the guidance curve.
///
/// The midpoint of `start`/`end` is moved `|repulsion| * bend` along the
/// perpendicular of `net_direction`, on the side facing away from the
/// repulsion vector, then shifted by `local_offset`.
pub fn control_point(
    start: Vec2,
    end: Vec2,
    net_direction: Vec2,
    repulsion: Vec2,
    bend: f32,
    local_offset: Vec2,
) -> Vec2 {
    let midpoint = (start + end) * 0.5;
    let perp = net_direction.perp();
    let side = if perp.dot(repulsion) > 0.0 { -perp } else { perp };
    midpoint + side * repulsion.length() * bend + local_offset
}

/// Sample a quadratic Bézier at `num_pts` evenly spaced `t` in `[0, 1]`.
///
/// Both ends are included, so the first sample is `p0` and the last is `p2`.
pub fn quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, num_pts: usize) -> Vec<Vec2> {
    match num_pts {
        0 => Vec::new(),
        1 => vec![p0],
        _ => (0..num_pts)
            .map(|i| {
                let t = i as f32 / (num_pts - 1) as f32;
                let u = 1.0 - t;
                u * u * p0 + 2.0 * u * t * p1 + t * t * p2
            })
            .collect(),
    }
}
