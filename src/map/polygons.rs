//! Segment thickening and polygon merging
//!
//! Vertex rings here are plain `Vec<Vec2>` without a repeated closing vertex.
//! Boolean union is delegated to `geo`.

use geo::{BooleanOps, Coord, LineString, MultiPolygon};
use glam::Vec2;

use crate::sim::geometry::signed_area;

/// Quadrilateral of width `thickness` centred on segment `a`-`b`.
///
/// Returns `None` for a zero-length segment.
pub fn thicken_segment(a: Vec2, b: Vec2, thickness: f32) -> Option<Vec<Vec2>> {
    let along = b - a;
    let len = along.length();
    if len == 0.0 {
        return None;
    }
    let offset = along.perp() / len * (thickness * 0.5);
    Some(vec![a + offset, a - offset, b - offset, b + offset])
}

/// Intersection of lines `p + t*d` and `q + s*e`
fn line_intersection(p: Vec2, d: Vec2, q: Vec2, e: Vec2) -> Option<Vec2> {
    let denom = d.perp_dot(e);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (q - p).perp_dot(e) / denom;
    Some(p + d * t)
}

/// Outward offset of a convex ring by `distance`, with mitred corners.
///
/// A rectangle grows into a larger rectangle, so thickened segments get
/// square end caps.
pub fn buffer_convex(ring: &[Vec2], distance: f32) -> Vec<Vec2> {
    let n = ring.len();
    let area = signed_area(ring);
    if n < 3 || area == 0.0 {
        return ring.to_vec();
    }
    // Outward normal side depends on winding
    let sign = if area > 0.0 { -1.0 } else { 1.0 };
    let shifted: Vec<(Vec2, Vec2)> = (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            let dir = b - a;
            let normal = dir.perp().normalize_or_zero() * sign;
            (a + normal * distance, dir)
        })
        .collect();

    (0..n)
        .map(|i| {
            let (p_prev, d_prev) = shifted[(i + n - 1) % n];
            let (p, d) = shifted[i];
            // Collinear neighbours: the shifted start point is already the corner
            line_intersection(p_prev, d_prev, p, d).unwrap_or(p)
        })
        .collect()
}

fn to_geo(ring: &[Vec2]) -> geo::Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|v| Coord {
            x: v.x as f64,
            y: v.y as f64,
        })
        .collect();
    geo::Polygon::new(LineString::new(coords), Vec::new())
}

fn exterior_ring(poly: &geo::Polygon<f64>) -> Vec<Vec2> {
    let mut ring: Vec<Vec2> = poly
        .exterior()
        .coords()
        .map(|c| Vec2::new(c.x as f32, c.y as f32))
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Buffer every ring by `merge_thresh` and union the overlapping ones.
///
/// Rings with fewer than three vertices are skipped. Only exterior rings of
/// the union are returned; holes are discarded.
pub fn merge_polygons(rings: &[Vec<Vec2>], merge_thresh: f32) -> Vec<Vec<Vec2>> {
    let mut buffered = rings
        .iter()
        .filter(|r| r.len() >= 3)
        .map(|r| to_geo(&buffer_convex(r, merge_thresh)));

    let Some(first) = buffered.next() else {
        return Vec::new();
    };
    let merged = buffered.fold(MultiPolygon::new(vec![first]), |acc, poly| {
        acc.union(&MultiPolygon::new(vec![poly]))
    });

    merged.0.iter().map(exterior_ring).collect()
}

/// Drop rings whose enclosed area is below `area_thresh`
pub fn filter_by_area(rings: Vec<Vec<Vec2>>, area_thresh: f32) -> Vec<Vec<Vec2>> {
    rings
        .into_iter()
        .filter(|r| signed_area(r).abs() >= area_thresh)
        .collect()
}

/// Uniform scale about the centre of a `size` image
pub fn scale_about_center(ring: &[Vec2], scale: f32, size: Vec2) -> Vec<Vec2> {
    let shift = size * 0.5 * (scale - 1.0);
    ring.iter().map(|&p| p * scale - shift).collect()
}
