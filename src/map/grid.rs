//! Rectangle extraction from flat-color map images
//!
//! Each opaque dark pixel is an obstacle cell. Runs of cells are greedily
//! merged into maximal axis-aligned rectangles, one pixel per world unit.

use glam::Vec2;
use image::RgbaImage;

use crate::sim::Rect;

fn is_obstacle(px: &image::Rgba<u8>, dark_threshold: u8) -> bool {
    let [r, g, b, a] = px.0;
    a == 255 && r <= dark_threshold && g <= dark_threshold && b <= dark_threshold
}

/// Cover every obstacle pixel with non-overlapping rectangles.
///
/// Scans columns left to right, top to bottom within a column. At each
/// uncovered obstacle pixel the rectangle first grows right along the row,
/// then down while the full row span is uncovered obstacle.
pub fn extract_rects(img: &RgbaImage, dark_threshold: u8) -> Vec<Rect> {
    let (w, h) = img.dimensions();
    let mut covered = vec![false; (w * h) as usize];
    let idx = |x: u32, y: u32| (y * w + x) as usize;
    let free = |covered: &[bool], x: u32, y: u32| {
        !covered[idx(x, y)] && is_obstacle(img.get_pixel(x, y), dark_threshold)
    };

    let mut rects = Vec::new();
    for x in 0..w {
        for y in 0..h {
            if !free(&covered, x, y) {
                continue;
            }
            let mut x_end = x + 1;
            while x_end < w && free(&covered, x_end, y) {
                x_end += 1;
            }
            let mut y_end = y + 1;
            while y_end < h && (x..x_end).all(|cx| free(&covered, cx, y_end)) {
                y_end += 1;
            }
            for cy in y..y_end {
                for cx in x..x_end {
                    covered[idx(cx, cy)] = true;
                }
            }
            rects.push(Rect::new(
                Vec2::new(x as f32, y as f32),
                Vec2::new((x_end - x) as f32, (y_end - y) as f32),
            ));
        }
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, WHITE)
    }

    fn fill(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32) {
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, BLACK);
            }
        }
    }

    #[test]
    fn test_blank_has_no_rects() {
        assert!(extract_rects(&canvas(16, 16), 0).is_empty());
    }

    #[test]
    fn test_single_block() {
        let mut img = canvas(20, 20);
        fill(&mut img, 3, 4, 9, 7);
        let rects = extract_rects(&img, 0);
        assert_eq!(rects, vec![Rect::new(Vec2::new(3.0, 4.0), Vec2::new(6.0, 3.0))]);
    }

    #[test]
    fn test_l_shape_fully_covered_without_overlap() {
        let mut img = canvas(20, 20);
        fill(&mut img, 2, 2, 4, 12);
        fill(&mut img, 2, 10, 12, 12);
        let rects = extract_rects(&img, 0);

        let covered: f32 = rects.iter().map(|r| r.size.x * r.size.y).sum();
        assert_eq!(covered, 20.0 + 16.0);
        for y in 0..20 {
            for x in 0..20 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let hits = rects.iter().filter(|r| r.contains(p)).count();
                let expected = usize::from(*img.get_pixel(x, y) == BLACK);
                assert_eq!(hits, expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_transparent_and_grey_pixels_ignored() {
        let mut img = canvas(8, 8);
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(2, 2, Rgba([40, 40, 40, 255]));
        assert!(extract_rects(&img, 0).is_empty());
        assert_eq!(extract_rects(&img, 50).len(), 1);
    }
}
