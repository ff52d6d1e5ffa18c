//! Static obstacle shapes
//!
//! Two closed shape kinds share one contract: ray intersection, point
//! containment and a bounding box. Obstacles are built once per scene and
//! never mutated afterwards.

use glam::Vec2;

use super::geometry::{ray_segment_intersection, signed_area};

/// Nearest point where a ray meets an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec2,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Axis-aligned rectangle, `pos` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Inclusive containment (edges count as inside)
    pub fn contains(&self, p: Vec2) -> bool {
        let max = self.pos + self.size;
        p.x >= self.pos.x && p.x <= max.x && p.y >= self.pos.y && p.y <= max.y
    }

    /// Slab test against the ray `[origin, origin + max_range * dir]`.
    ///
    /// An origin inside the rectangle hits at distance 0.
    pub fn intersect(&self, origin: Vec2, dir: Vec2, max_range: f32) -> Option<RayHit> {
        let max = self.pos + self.size;
        let mut t_near = 0.0_f32;
        let mut t_far = max_range;

        for axis in 0..2 {
            let (o, d, lo, hi) = (origin[axis], dir[axis], self.pos[axis], max[axis]);
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some(RayHit {
            distance: t_near,
            point: origin + dir * t_near,
        })
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.pos,
            max: self.pos + self.size,
        }
    }
}

/// Simple closed polygon (the closing edge back to the first vertex is implied)
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Build a polygon from a ring of vertices.
    ///
    /// A repeated closing vertex is dropped. Returns `None` for rings with
    /// fewer than three distinct vertices or zero area.
    pub fn new(mut vertices: Vec<Vec2>) -> Option<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 || signed_area(&vertices).abs() <= f32::EPSILON {
            return None;
        }
        Some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Iterate edges as (start, end) pairs, including the closing edge
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn area(&self) -> f32 {
        signed_area(&self.vertices).abs()
    }

    /// Even-odd containment test
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Nearest boundary crossing along the ray `[origin, origin + max_range * dir]`.
    ///
    /// An origin inside the polygon hits at distance 0. Ties between edges
    /// resolve to the first edge in ring order.
    pub fn intersect(&self, origin: Vec2, dir: Vec2, max_range: f32) -> Option<RayHit> {
        if self.contains(origin) {
            return Some(RayHit {
                distance: 0.0,
                point: origin,
            });
        }
        let mut best: Option<f32> = None;
        for (a, b) in self.edges() {
            if let Some(t) = ray_segment_intersection(origin, dir, max_range, a, b) {
                if best.is_none_or(|nearest| t < nearest) {
                    best = Some(t);
                }
            }
        }
        best.map(|distance| RayHit {
            distance,
            point: origin + dir * distance,
        })
    }

    pub fn bounds(&self) -> Bounds {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for &v in &self.vertices {
            min = min.min(v);
            max = max.max(v);
        }
        Bounds { min, max }
    }
}

/// Obstacle placed in a scene
#[derive(Debug, Clone, PartialEq)]
pub enum Obstacle {
    Rect(Rect),
    Polygon(Polygon),
}

impl Obstacle {
    pub fn rect(pos: Vec2, size: Vec2) -> Self {
        Obstacle::Rect(Rect::new(pos, size))
    }

    /// Polygon obstacle, `None` if the ring is degenerate
    pub fn polygon(vertices: Vec<Vec2>) -> Option<Self> {
        Polygon::new(vertices).map(Obstacle::Polygon)
    }

    /// First hit along the ray `[origin, origin + max_range * dir]`.
    ///
    /// Both shapes report distance 0 when `origin` is already inside, the
    /// same answer the marching cast gives at its first sample.
    pub fn intersect(&self, origin: Vec2, dir: Vec2, max_range: f32) -> Option<RayHit> {
        match self {
            Obstacle::Rect(r) => r.intersect(origin, dir, max_range),
            Obstacle::Polygon(p) => p.intersect(origin, dir, max_range),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Obstacle::Rect(r) => r.contains(p),
            Obstacle::Polygon(poly) => poly.contains(p),
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            Obstacle::Rect(r) => r.bounds(),
            Obstacle::Polygon(p) => p.bounds(),
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(self, Obstacle::Polygon(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, side: f32) -> Polygon {
        Polygon::new(vec![
            Vec2::new(x, y),
            Vec2::new(x + side, y),
            Vec2::new(x + side, y + side),
            Vec2::new(x, y + side),
        ])
        .expect("valid square")
    }

    #[test]
    fn test_rect_intersect_front_face() {
        let rect = Rect::new(Vec2::new(100.0, -10.0), Vec2::new(20.0, 20.0));
        let hit = rect.intersect(Vec2::ZERO, Vec2::X, 200.0).expect("hit");
        assert!((hit.distance - 100.0).abs() < 1e-4);
        assert!((hit.point - Vec2::new(100.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_rect_intersect_respects_range() {
        let rect = Rect::new(Vec2::new(100.0, -10.0), Vec2::new(20.0, 20.0));
        assert!(rect.intersect(Vec2::ZERO, Vec2::X, 99.0).is_none());
        assert!(rect.intersect(Vec2::ZERO, -Vec2::X, 200.0).is_none());
        assert!(rect.intersect(Vec2::ZERO, Vec2::Y, 200.0).is_none());
    }

    #[test]
    fn test_rect_origin_inside_hits_at_zero() {
        let rect = Rect::new(Vec2::new(-5.0, -5.0), Vec2::new(10.0, 10.0));
        let hit = rect.intersect(Vec2::ZERO, Vec2::X, 50.0).expect("hit");
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_polygon_rejects_degenerate() {
        assert!(Polygon::new(vec![]).is_none());
        assert!(Polygon::new(vec![Vec2::ZERO, Vec2::X]).is_none());
        // Collinear ring has no area
        assert!(Polygon::new(vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]).is_none());
        // Closed triangle with repeated first vertex keeps three vertices
        let tri = Polygon::new(vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ZERO]).expect("triangle");
        assert_eq!(tri.vertices().len(), 3);
    }

    #[test]
    fn test_polygon_intersect_takes_nearest_edge() {
        let poly = square(50.0, -10.0, 20.0);
        let hit = poly.intersect(Vec2::ZERO, Vec2::X, 200.0).expect("hit");
        assert!((hit.distance - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_polygon_intersect_along_edge() {
        // Ray runs exactly along the bottom edge
        let poly = square(50.0, 0.0, 20.0);
        let hit = poly.intersect(Vec2::ZERO, Vec2::X, 200.0).expect("hit");
        assert!((hit.distance - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_origin_inside_hits_at_zero_for_both_shapes() {
        let rect = Obstacle::rect(Vec2::new(-10.0, -10.0), Vec2::new(20.0, 20.0));
        let poly = Obstacle::Polygon(square(-10.0, -10.0, 20.0));
        for obstacle in [rect, poly] {
            let hit = obstacle.intersect(Vec2::ZERO, Vec2::X, 50.0).expect("hit");
            assert_eq!(hit.distance, 0.0);
            assert_eq!(hit.point, Vec2::ZERO);
        }
    }

    #[test]
    fn test_polygon_contains() {
        let poly = square(0.0, 0.0, 10.0);
        assert!(poly.contains(Vec2::new(5.0, 5.0)));
        assert!(!poly.contains(Vec2::new(15.0, 5.0)));
        assert!((poly.area() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_obstacle_bounds() {
        let o = Obstacle::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(-3.0, 8.0),
        ])
        .expect("triangle");
        let b = o.bounds();
        assert_eq!(b.min, Vec2::new(-3.0, 0.0));
        assert_eq!(b.max, Vec2::new(10.0, 8.0));
        assert!(o.is_polygon());
    }
}
