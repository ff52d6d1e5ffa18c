//! Scene construction
//!
//! A scene is the static obstacle set plus an optional spawn point. Scenes
//! come from hand placement, a seeded scatter, or a map image.

use std::path::Path;

use glam::Vec2;
use image::DynamicImage;
use image::imageops::FilterType;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::obstacle::{Bounds, Obstacle, Rect};
use crate::map::{MapBuilder, extract_rects, load_image, to_working_size};
use crate::settings::MapSettings;

/// Static obstacle layout
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    pub obstacles: Vec<Obstacle>,
    /// Overrides the configured spawn point
    pub spawn: Option<Vec2>,
}

impl Scene {
    /// No obstacles at all
    pub fn empty() -> Self {
        Self {
            name: "empty".into(),
            obstacles: Vec::new(),
            spawn: None,
        }
    }

    /// Three hand-placed rectangles near the world origin
    pub fn demo() -> Self {
        Self {
            name: "demo".into(),
            obstacles: vec![
                Obstacle::rect(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0)),
                Obstacle::rect(Vec2::new(-100.0, 150.0), Vec2::new(50.0, 100.0)),
                Obstacle::rect(Vec2::new(-50.0, -50.0), Vec2::new(10.0, 100.0)),
            ],
            spawn: None,
        }
    }

    /// Reproducible random rectangles inside `extent`.
    ///
    /// Rectangles overlapping a `clearance` radius around `keep_clear` are
    /// rejected so the user never spawns inside an obstacle.
    pub fn scattered(
        seed: u64,
        count: usize,
        extent: Bounds,
        keep_clear: Vec2,
        clearance: f32,
    ) -> Self {
        const MIN_SIDE: f32 = 10.0;
        const MAX_SIDE: f32 = 120.0;
        // Bounded retries keep generation finite in cramped extents
        let max_attempts = count * 20;

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut obstacles = Vec::with_capacity(count);
        let size = extent.size();

        for _ in 0..max_attempts {
            if obstacles.len() >= count {
                break;
            }
            let side = Vec2::new(
                rng.random_range(MIN_SIDE..MAX_SIDE),
                rng.random_range(MIN_SIDE..MAX_SIDE),
            );
            let free = (size - side).max(Vec2::ZERO);
            let pos = extent.min
                + Vec2::new(
                    rng.random_range(0.0..=free.x),
                    rng.random_range(0.0..=free.y),
                );
            let rect = Rect::new(pos, side);

            let closest = keep_clear.clamp(rect.pos, rect.pos + rect.size);
            if closest.distance(keep_clear) < clearance {
                continue;
            }
            obstacles.push(Obstacle::Rect(rect));
        }

        if obstacles.len() < count {
            log::warn!(
                "Scattered scene placed {} of {} obstacles (seed {})",
                obstacles.len(),
                count,
                seed
            );
        }

        Self {
            name: format!("scattered-{seed}"),
            obstacles,
            spawn: Some(keep_clear),
        }
    }

    /// Polygon scene from vertex rings; degenerate rings are skipped
    pub fn from_polygons(name: &str, rings: Vec<Vec<Vec2>>) -> Self {
        let total = rings.len();
        let obstacles: Vec<Obstacle> = rings.into_iter().filter_map(Obstacle::polygon).collect();
        if obstacles.len() < total {
            log::warn!(
                "Rejected {} degenerate polygons in scene '{}'",
                total - obstacles.len(),
                name
            );
        }
        Self {
            name: name.into(),
            obstacles,
            spawn: None,
        }
    }

    /// Scene from a scanned floorplan image (skeleton + line extraction).
    ///
    /// An unreadable image yields an empty scene.
    pub fn from_image(path: &Path, settings: &MapSettings) -> Self {
        let builder = MapBuilder::new(settings.clone());
        let polygons = builder.build_from_path(path);
        Self {
            name: path.display().to_string(),
            obstacles: polygons.into_iter().map(Obstacle::Polygon).collect(),
            spawn: None,
        }
    }

    /// Scene from a flat-color map image (dark pixel runs become rectangles).
    ///
    /// An unreadable image yields an empty scene.
    pub fn from_grid_image(path: &Path, settings: &MapSettings) -> Self {
        let name = path.display().to_string();
        match load_image(path) {
            Ok(img) => Self::from_grid(&name, &img, settings),
            Err(e) => {
                log::warn!("{e}; continuing with no obstacles");
                Self {
                    name,
                    obstacles: Vec::new(),
                    spawn: None,
                }
            }
        }
    }

    /// Rectangle scene from an already decoded flat-color image
    pub fn from_grid(name: &str, img: &DynamicImage, settings: &MapSettings) -> Self {
        let rgba = to_working_size(img.to_rgba8(), settings, FilterType::Nearest);
        let rects = extract_rects(&rgba, settings.dark_threshold);
        log::info!("Extracted {} rectangles from {}", rects.len(), name);
        Self {
            name: name.into(),
            obstacles: rects.into_iter().map(Obstacle::Rect).collect(),
            spawn: None,
        }
    }
}
