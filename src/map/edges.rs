//! Canny edge detection

use image::GrayImage;

/// Sobel gradients with replicated borders
fn sobel(img: &GrayImage) -> (Vec<i32>, Vec<i32>) {
    let (w, h) = img.dimensions();
    let (wi, hi) = (w as i32, h as i32);
    let src: &[u8] = img.as_raw();
    let at = |x: i32, y: i32| -> i32 {
        let x = x.clamp(0, wi - 1);
        let y = y.clamp(0, hi - 1);
        src[(y * wi + x) as usize] as i32
    };

    let mut gx = vec![0i32; (w * h) as usize];
    let mut gy = vec![0i32; (w * h) as usize];
    for y in 0..hi {
        for x in 0..wi {
            let i = (y * wi + x) as usize;
            gx[i] = (at(x + 1, y - 1) + 2 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x - 1, y) + at(x - 1, y + 1));
            gy[i] = (at(x - 1, y + 1) + 2 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2 * at(x, y - 1) + at(x + 1, y - 1));
        }
    }
    (gx, gy)
}

/// Neighbour offsets across the edge for a quantized gradient direction
fn across_edge(gx: i32, gy: i32) -> (i32, i32) {
    // tan(22.5°) and tan(67.5°) in 15-bit fixed point
    const TAN_22_5: i64 = 13573;
    const TAN_67_5: i64 = 79109;
    let ax = (gx as i64).abs();
    let ay = (gy as i64).abs() << 15;

    if ay < ax * TAN_22_5 {
        (1, 0)
    } else if ay > ax * TAN_67_5 {
        (0, 1)
    } else if (gx ^ gy) < 0 {
        (1, -1)
    } else {
        (1, 1)
    }
}

/// Binary edge map (255 on edges) with hysteresis thresholds `low`/`high`
/// applied to the L1 gradient magnitude.
pub fn canny(img: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let (wi, hi) = (w as i32, h as i32);
    let idx = |x: i32, y: i32| (y * wi + x) as usize;

    let (gx, gy) = sobel(img);
    let mag: Vec<f32> = gx
        .iter()
        .zip(&gy)
        .map(|(x, y)| (x.abs() + y.abs()) as f32)
        .collect();

    // Non-maximum suppression, one pixel border left empty
    let mut candidate = vec![false; mag.len()];
    let mut strong = Vec::new();
    for y in 1..hi - 1 {
        for x in 1..wi - 1 {
            let i = idx(x, y);
            let m = mag[i];
            if m <= low {
                continue;
            }
            let (dx, dy) = across_edge(gx[i], gy[i]);
            let before = mag[idx(x - dx, y - dy)];
            let after = mag[idx(x + dx, y + dy)];
            if m > before && m >= after {
                candidate[i] = true;
                if m > high {
                    strong.push((x, y));
                }
            }
        }
    }

    // Hysteresis: grow strong edges through 8-connected weak candidates
    let dst: &mut [u8] = &mut out;
    for &(x, y) in &strong {
        dst[idx(x, y)] = 255;
    }
    let mut stack = strong;
    while let Some((x, y)) = stack.pop() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= wi || ny >= hi {
                    continue;
                }
                let n = idx(nx, ny);
                if candidate[n] && dst[n] == 0 {
                    dst[n] = 255;
                    stack.push((nx, ny));
                }
            }
        }
    }
    out
}
