//! Raster preprocessing on 8-bit grayscale images
//!
//! Binary images use 0 for background and 255 for foreground. Out-of-bounds
//! neighbours are ignored by every filter here, so borders never erode or
//! grow on their own.

use image::GrayImage;

/// Structuring element as pixel offsets from the anchor
#[derive(Debug, Clone)]
pub struct StructuringElement {
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    /// Filled `size` x `size` square anchored at its center
    pub fn square(size: u32) -> Self {
        let size = size.max(1) as i32;
        let lo = -(size / 2);
        let hi = lo + size - 1;
        let offsets = (lo..=hi)
            .flat_map(|dy| (lo..=hi).map(move |dx| (dx, dy)))
            .collect();
        Self { offsets }
    }

    /// 3x3 cross (center plus the four edge neighbours)
    pub fn cross() -> Self {
        Self {
            offsets: vec![(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)],
        }
    }
}

#[inline]
fn clamp_index(v: i32, len: u32) -> usize {
    v.clamp(0, len as i32 - 1) as usize
}

/// 3x3 Gaussian blur (kernel [1 2 1] ⊗ [1 2 1] / 16), edge pixels replicated
pub fn gaussian_blur_3x3(img: &GrayImage) -> GrayImage {
    const K: [u32; 3] = [1, 2, 1];
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    let src: &[u8] = img.as_raw();
    let dst: &mut [u8] = &mut out;

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let mut acc = 0u32;
            for (ky, wy) in K.iter().enumerate() {
                let sy = clamp_index(y + ky as i32 - 1, h);
                for (kx, wx) in K.iter().enumerate() {
                    let sx = clamp_index(x + kx as i32 - 1, w);
                    acc += wy * wx * src[sy * w as usize + sx] as u32;
                }
            }
            dst[y as usize * w as usize + x as usize] = ((acc + 8) / 16) as u8;
        }
    }
    out
}

/// Inverted adaptive threshold against the local mean.
///
/// A pixel becomes foreground (255) when it is no brighter than the mean of
/// its `block_size` neighbourhood minus `offset`, so dark walls on a light
/// background come out white.
pub fn adaptive_threshold_inv(img: &GrayImage, block_size: u32, offset: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    if w == 0 || h == 0 {
        return out;
    }
    let (wu, hu) = (w as usize, h as usize);
    let src: &[u8] = img.as_raw();

    // Summed-area table with a zero row/column in front
    let mut integral = vec![0u64; (wu + 1) * (hu + 1)];
    for y in 0..hu {
        let mut row = 0u64;
        for x in 0..wu {
            row += src[y * wu + x] as u64;
            integral[(y + 1) * (wu + 1) + x + 1] = integral[y * (wu + 1) + x + 1] + row;
        }
    }

    let radius = (block_size.max(1) / 2) as usize;
    let dst: &mut [u8] = &mut out;
    for y in 0..hu {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(hu);
        for x in 0..wu {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(wu);
            let sum = integral[y1 * (wu + 1) + x1] + integral[y0 * (wu + 1) + x0]
                - integral[y0 * (wu + 1) + x1]
                - integral[y1 * (wu + 1) + x0];
            let count = ((y1 - y0) * (x1 - x0)) as f32;
            let mean = sum as f32 / count;
            if src[y * wu + x] as f32 <= mean - offset {
                dst[y * wu + x] = 255;
            }
        }
    }
    out
}

fn morph(img: &GrayImage, se: &StructuringElement, take_max: bool) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    let src: &[u8] = img.as_raw();
    let dst: &mut [u8] = &mut out;
    let (wi, hi) = (w as i32, h as i32);

    for y in 0..hi {
        for x in 0..wi {
            let mut acc = if take_max { u8::MIN } else { u8::MAX };
            for &(dx, dy) in &se.offsets {
                let (sx, sy) = (x + dx, y + dy);
                if sx < 0 || sy < 0 || sx >= wi || sy >= hi {
                    continue;
                }
                let v = src[(sy * wi + sx) as usize];
                acc = if take_max { acc.max(v) } else { acc.min(v) };
            }
            dst[(y * wi + x) as usize] = acc;
        }
    }
    out
}

/// Grayscale dilation (local maximum under the element)
pub fn dilate(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    morph(img, se, true)
}

/// Grayscale erosion (local minimum under the element)
pub fn erode(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    morph(img, se, false)
}

/// Morphological closing: dilate then erode
pub fn close(img: &GrayImage, se: &StructuringElement) -> GrayImage {
    erode(&dilate(img, se), se)
}

/// Saturating per-pixel `a - b`
pub fn subtract(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut out = a.clone();
    for (o, v) in out.iter_mut().zip(b.iter()) {
        *o = o.saturating_sub(*v);
    }
    out
}

/// Per-pixel bitwise or, in place
pub fn or_assign(acc: &mut GrayImage, other: &GrayImage) {
    for (o, v) in acc.iter_mut().zip(other.iter()) {
        *o |= *v;
    }
}

pub fn count_nonzero(img: &GrayImage) -> usize {
    img.iter().filter(|&&v| v != 0).count()
}

/// Morphological skeleton.
///
/// Repeatedly erodes the working image; at each round the part removed by an
/// opening (`img - dilate(erode(img))`) is accumulated. Stops once the
/// working image is empty.
pub fn skeletonize(mask: &GrayImage) -> GrayImage {
    let se = StructuringElement::cross();
    let (w, h) = mask.dimensions();
    let mut skeleton = GrayImage::new(w, h);
    let mut working = mask.clone();
    // Every round strips at least the outer layer, so the diagonal bounds
    // the number of rounds
    let max_rounds = (w as f32).hypot(h as f32).ceil() as usize + 1;

    for round in 0..max_rounds {
        if count_nonzero(&working) == 0 {
            log::debug!("Skeleton converged after {round} rounds");
            break;
        }
        let eroded = erode(&working, &se);
        let opened = dilate(&eroded, &se);
        or_assign(&mut skeleton, &subtract(&working, &opened));
        working = eroded;
    }
    skeleton
}
