//! Map ingestion
//!
//! Two ways to turn an image into obstacles:
//! - `MapBuilder`: scanned floorplans. Walls are thinned to centerlines,
//!   fitted with line segments, then thickened and merged into polygons.
//! - `extract_rects`: flat-color maps. Dark pixel runs become rectangles.
//!
//! Both run once before the simulation starts.

pub mod edges;
pub mod grid;
pub mod hough;
pub mod polygons;
pub mod raster;

use std::path::Path;

use glam::Vec2;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Pixel};

pub use edges::canny;
pub use grid::extract_rects;
pub use hough::{HoughParams, LineSegment, probabilistic_hough};
pub use polygons::{
    buffer_convex, filter_by_area, merge_polygons, scale_about_center, thicken_segment,
};
pub use raster::{
    StructuringElement, adaptive_threshold_inv, close, gaussian_blur_3x3, skeletonize,
};

use crate::error::MapError;
use crate::settings::MapSettings;
use crate::sim::Polygon;

/// Open an image file, rejecting zero-sized images
pub fn load_image(path: &Path) -> Result<DynamicImage, MapError> {
    let img = image::open(path).map_err(|source| MapError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    if img.width() == 0 || img.height() == 0 {
        return Err(MapError::EmptyImage(path.to_path_buf()));
    }
    Ok(img)
}

/// Rescale to the configured working resolution.
///
/// A zero working width or height keeps the native resolution.
pub fn to_working_size<P>(
    img: ImageBuffer<P, Vec<P::Subpixel>>,
    settings: &MapSettings,
    filter: FilterType,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (w, h) = (settings.working_width, settings.working_height);
    if w == 0 || h == 0 || img.dimensions() == (w, h) {
        img
    } else {
        image::imageops::resize(&img, w, h, filter)
    }
}

/// Floorplan image to polygon obstacles
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    settings: MapSettings,
}

impl MapBuilder {
    pub fn new(settings: MapSettings) -> Self {
        Self { settings }
    }

    /// Blur, threshold (walls become foreground) and close small gaps
    pub fn wall_mask(&self, gray: &GrayImage) -> GrayImage {
        let s = &self.settings;
        let blurred = gaussian_blur_3x3(gray);
        let mut mask = adaptive_threshold_inv(&blurred, s.block_size, s.threshold_offset);
        let kernel = StructuringElement::square(s.close_kernel);
        for _ in 0..s.close_iter {
            mask = close(&mask, &kernel);
        }
        mask
    }

    /// Wall centerline segments in working-image pixels
    pub fn extract_segments(&self, gray: &GrayImage) -> Vec<LineSegment> {
        let s = &self.settings;
        let mask = self.wall_mask(gray);
        let skeleton = skeletonize(&mask);
        let edges = canny(&skeleton, s.canny_low, s.canny_high);
        let params = HoughParams {
            threshold: s.hough_threshold,
            min_line_len: s.min_line_len,
            max_line_gap: s.max_line_gap,
            ..Default::default()
        };
        let segments = probabilistic_hough(&edges, &params);
        log::debug!(
            "Map stages: {} mask px, {} skeleton px, {} edge px, {} segments",
            raster::count_nonzero(&mask),
            raster::count_nonzero(&skeleton),
            raster::count_nonzero(&edges),
            segments.len()
        );
        segments
    }

    /// Thicken, merge, filter and scale segments into vertex rings
    pub fn rings_from_segments(&self, segments: &[LineSegment], image_size: Vec2) -> Vec<Vec<Vec2>> {
        let s = &self.settings;
        let quads: Vec<Vec<Vec2>> = segments
            .iter()
            .filter_map(|seg| thicken_segment(seg.start.as_vec2(), seg.end.as_vec2(), s.thickness))
            .collect();
        let merged = merge_polygons(&quads, s.merge_thresh);
        let merged_count = merged.len();
        let kept = filter_by_area(merged, s.area_thresh);
        log::debug!(
            "Map polygons: {} quads, {} merged, {} above area {}",
            quads.len(),
            merged_count,
            kept.len(),
            s.area_thresh
        );

        if s.scale == 1.0 {
            kept
        } else {
            kept.iter()
                .map(|ring| scale_about_center(ring, s.scale, image_size))
                .collect()
        }
    }

    /// Run the full pipeline on a decoded image
    pub fn build(&self, img: &DynamicImage) -> Vec<Polygon> {
        let gray = to_working_size(img.to_luma8(), &self.settings, FilterType::Triangle);
        let size = Vec2::new(gray.width() as f32, gray.height() as f32);
        let segments = self.extract_segments(&gray);
        let rings = self.rings_from_segments(&segments, size);
        let total = rings.len();
        let polygons: Vec<Polygon> = rings.into_iter().filter_map(Polygon::new).collect();
        if polygons.len() < total {
            log::warn!("Rejected {} degenerate map polygons", total - polygons.len());
        }
        log::info!("Map built: {} polygons", polygons.len());
        polygons
    }

    pub fn try_build_from_path(&self, path: &Path) -> Result<Vec<Polygon>, MapError> {
        let img = load_image(path)?;
        log::info!("Loaded map {} ({}x{})", path.display(), img.width(), img.height());
        Ok(self.build(&img))
    }

    /// Like `try_build_from_path`, but a missing or unreadable image gives no
    /// obstacles
    pub fn build_from_path(&self, path: &Path) -> Vec<Polygon> {
        self.try_build_from_path(path).unwrap_or_else(|e| {
            log::warn!("{e}; continuing with no obstacles");
            Vec::new()
        })
    }
}
