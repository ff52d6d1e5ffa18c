//! Rotating range sensor
//!
//! Casts `num_rays` rays evenly across the field of view and keeps the
//! nearest hit per ray. Ray `i` points at `heading + i * (fov / num_rays) - fov / 2`
//! degrees. Rays that hit nothing contribute no point, so the cloud is not
//! index-aligned with ray angles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, RayHit};
use crate::direction_from_degrees;
use crate::settings::SensorSettings;

/// First-hit points of one sweep, in ray order
pub type PointCloud = Vec<Vec2>;

/// How each ray is tested against the obstacles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CastStrategy {
    /// Exact ray/shape intersection. Works for every obstacle kind.
    Analytic,
    /// Step outward by `step` units testing containment at each sample.
    /// Approximate (resolution-limited); meant for rectangle scenes.
    Marching { step: f32 },
}

impl CastStrategy {
    /// Strategy actually used for a scene: polygon scenes need exact geometry
    pub fn resolve(self, obstacles: &[Obstacle]) -> CastStrategy {
        match self {
            CastStrategy::Marching { .. } if obstacles.iter().any(Obstacle::is_polygon) => {
                CastStrategy::Analytic
            }
            CastStrategy::Marching { step } if step <= 0.0 => CastStrategy::Analytic,
            other => other,
        }
    }
}

/// Simulated LiDAR
#[derive(Debug, Clone)]
pub struct LidarSensor {
    /// Maximum ray length
    pub range: f32,
    /// Field of view (degrees)
    pub fov: f32,
    /// Forward axis (degrees)
    pub heading: f32,
    pub strategy: CastStrategy,
}

impl LidarSensor {
    pub fn new(range: f32, fov: f32, strategy: CastStrategy) -> Self {
        Self {
            range,
            fov,
            heading: 0.0,
            strategy,
        }
    }

    pub fn from_settings(settings: &SensorSettings) -> Self {
        Self {
            range: settings.range,
            fov: settings.fov,
            heading: settings.heading,
            strategy: settings.strategy,
        }
    }

    /// Angle of ray `index` in degrees, relative to the world +x axis
    pub fn ray_angle(&self, index: usize, num_rays: usize) -> f32 {
        self.heading + index as f32 * (self.fov / num_rays as f32) - self.fov / 2.0
    }

    /// Nearest hit of a single ray cast from `origin` at `degrees`
    pub fn cast_ray(&self, origin: Vec2, degrees: f32, obstacles: &[Obstacle]) -> Option<RayHit> {
        let dir = direction_from_degrees(degrees);
        self.cast(self.strategy.resolve(obstacles), origin, dir, obstacles)
    }

    fn cast(
        &self,
        strategy: CastStrategy,
        origin: Vec2,
        dir: Vec2,
        obstacles: &[Obstacle],
    ) -> Option<RayHit> {
        match strategy {
            CastStrategy::Analytic => cast_analytic(origin, dir, self.range, obstacles),
            CastStrategy::Marching { step } => {
                cast_marching(origin, dir, self.range, step, obstacles)
            }
        }
    }

    /// Sweep all rays from `origin` and collect the first-hit points
    pub fn simulate(&self, origin: Vec2, num_rays: usize, obstacles: &[Obstacle]) -> PointCloud {
        if num_rays == 0 || obstacles.is_empty() || self.range <= 0.0 {
            return PointCloud::new();
        }

        let strategy = self.strategy.resolve(obstacles);
        if strategy != self.strategy {
            log::debug!("Sensor strategy {:?} resolved to {:?}", self.strategy, strategy);
        }

        (0..num_rays)
            .filter_map(|i| {
                let dir = direction_from_degrees(self.ray_angle(i, num_rays));
                self.cast(strategy, origin, dir, obstacles).map(|h| h.point)
            })
            .collect()
    }
}

/// Closest exact intersection over all obstacles (first obstacle wins ties)
fn cast_analytic(origin: Vec2, dir: Vec2, range: f32, obstacles: &[Obstacle]) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    for obstacle in obstacles {
        if let Some(hit) = obstacle.intersect(origin, dir, range) {
            if best.is_none_or(|b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
    }
    best
}

/// March outward in fixed steps until a sample lands inside any obstacle
fn cast_marching(
    origin: Vec2,
    dir: Vec2,
    range: f32,
    step: f32,
    obstacles: &[Obstacle],
) -> Option<RayHit> {
    let steps = (range / step).floor() as usize;
    (0..=steps).find_map(|k| {
        let distance = (k as f32 * step).min(range);
        let point = origin + dir * distance;
        obstacles
            .iter()
            .any(|o| o.contains(point))
            .then_some(RayHit { distance, point })
    })
}
