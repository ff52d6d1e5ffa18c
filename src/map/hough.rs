//! Probabilistic Hough line extraction
//!
//! Edge pixels vote in random order; as soon as one (rho, theta) bin reaches
//! the threshold, the corresponding line is walked across the edge mask and
//! its pixels are retired. The visiting order comes from a seeded PCG so the
//! output is identical across runs.

use glam::IVec2;
use image::GrayImage;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

/// Fixed seed for the voting order
pub const HOUGH_SEED: u64 = 0x5eed_1da2;

/// Angular bins over [0, π)
const NUM_ANGLES: usize = 180;
/// Fixed-point fraction bits for the line walk
const SHIFT: i32 = 16;

/// Detected line segment in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub start: IVec2,
    pub end: IVec2,
}

impl LineSegment {
    pub fn length(&self) -> f32 {
        (self.end - self.start).as_vec2().length()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HoughParams {
    /// Minimum votes for a bin to yield a line
    pub threshold: u32,
    /// Minimum extent along x or y
    pub min_line_len: u32,
    /// Maximum run of missing pixels bridged while walking a line
    pub max_line_gap: u32,
    pub max_lines: usize,
    pub seed: u64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            threshold: 40,
            min_line_len: 20,
            max_line_gap: 15,
            max_lines: usize::MAX,
            seed: HOUGH_SEED,
        }
    }
}

struct Accumulator {
    cos: Vec<f32>,
    sin: Vec<f32>,
    num_rho: usize,
    votes: Vec<i32>,
}

impl Accumulator {
    fn new(width: u32, height: u32) -> Self {
        let step = std::f32::consts::PI / NUM_ANGLES as f32;
        let (sin, cos): (Vec<f32>, Vec<f32>) = (0..NUM_ANGLES)
            .map(|n| (n as f32 * step).sin_cos())
            .unzip();
        let num_rho = ((width + height) * 2 + 1) as usize;
        Self {
            cos,
            sin,
            num_rho,
            votes: vec![0; NUM_ANGLES * num_rho],
        }
    }

    #[inline]
    fn bin(&self, n: usize, x: i32, y: i32) -> usize {
        let r = (x as f32 * self.cos[n] + y as f32 * self.sin[n]).round() as i32;
        let r = (r + (self.num_rho as i32 - 1) / 2) as usize;
        n * self.num_rho + r
    }

    /// Add the point's votes; returns the strongest angle and its count
    fn vote(&mut self, x: i32, y: i32) -> (usize, i32) {
        let mut best = (0, 0);
        for n in 0..NUM_ANGLES {
            let b = self.bin(n, x, y);
            self.votes[b] += 1;
            if self.votes[b] > best.1 {
                best = (n, self.votes[b]);
            }
        }
        best
    }

    fn unvote(&mut self, x: i32, y: i32) {
        for n in 0..NUM_ANGLES {
            let b = self.bin(n, x, y);
            self.votes[b] -= 1;
        }
    }
}

/// Fixed-point walker along a line through a start pixel
#[derive(Clone, Copy)]
struct Walk {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    /// Major axis is x (`x` is integral, `y` is fixed-point)
    x_major: bool,
}

impl Walk {
    fn new(px: i32, py: i32, dir_x: f32, dir_y: f32) -> Self {
        let half = 1 << (SHIFT - 1);
        if dir_x.abs() > dir_y.abs() {
            Self {
                x: px,
                y: (py << SHIFT) + half,
                dx: if dir_x > 0.0 { 1 } else { -1 },
                dy: (dir_y * (1 << SHIFT) as f32 / dir_x.abs()).round() as i32,
                x_major: true,
            }
        } else {
            Self {
                x: (px << SHIFT) + half,
                y: py,
                dx: (dir_x * (1 << SHIFT) as f32 / dir_y.abs()).round() as i32,
                dy: if dir_y > 0.0 { 1 } else { -1 },
                x_major: false,
            }
        }
    }

    fn reversed(self) -> Self {
        Self {
            dx: -self.dx,
            dy: -self.dy,
            ..self
        }
    }

    fn pixel(&self) -> (i32, i32) {
        if self.x_major {
            (self.x, self.y >> SHIFT)
        } else {
            (self.x >> SHIFT, self.y)
        }
    }

    fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
    }
}

/// Extract line segments from a binary edge image
pub fn probabilistic_hough(edges: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
    let (w, h) = edges.dimensions();
    let mut lines = Vec::new();
    if w == 0 || h == 0 || params.max_lines == 0 {
        return lines;
    }
    let (wi, hi) = (w as i32, h as i32);
    let idx = |x: i32, y: i32| (y * wi + x) as usize;
    let inside = |x: i32, y: i32| x >= 0 && y >= 0 && x < wi && y < hi;

    let mut mask: Vec<bool> = edges.iter().map(|&v| v != 0).collect();
    let mut points: Vec<(i32, i32)> = (0..hi)
        .flat_map(|y| (0..wi).map(move |x| (x, y)))
        .filter(|&(x, y)| mask[idx(x, y)])
        .collect();
    let mut rng = Pcg32::seed_from_u64(params.seed);
    points.shuffle(&mut rng);

    let mut acc = Accumulator::new(w, h);
    let threshold = params.threshold.max(1) as i32;
    let min_len = params.min_line_len as i32;
    let max_gap = params.max_line_gap;

    for (px, py) in points {
        // Already consumed by an earlier line
        if !mask[idx(px, py)] {
            continue;
        }
        let (best_n, best_votes) = acc.vote(px, py);
        if best_votes < threshold {
            continue;
        }

        // Direction along the line is perpendicular to the bin's normal
        let forward = Walk::new(px, py, -acc.sin[best_n], acc.cos[best_n]);
        let walks = [forward, forward.reversed()];

        let mut ends = [(px, py); 2];
        for (k, start) in walks.iter().enumerate() {
            let mut walk = *start;
            let mut gap = 0;
            loop {
                let (x, y) = walk.pixel();
                if !inside(x, y) {
                    break;
                }
                if mask[idx(x, y)] {
                    gap = 0;
                    ends[k] = (x, y);
                } else {
                    gap += 1;
                    if gap > max_gap {
                        break;
                    }
                }
                walk.advance();
            }
        }

        let good = (ends[1].0 - ends[0].0).abs() >= min_len
            || (ends[1].1 - ends[0].1).abs() >= min_len;

        // Retire the walked pixels; a kept line also takes back their votes
        for (k, start) in walks.iter().enumerate() {
            let mut walk = *start;
            loop {
                let (x, y) = walk.pixel();
                if !inside(x, y) {
                    break;
                }
                if mask[idx(x, y)] {
                    if good {
                        acc.unvote(x, y);
                    }
                    mask[idx(x, y)] = false;
                }
                if (x, y) == ends[k] {
                    break;
                }
                walk.advance();
            }
        }

        if good {
            lines.push(LineSegment {
                start: IVec2::new(ends[0].0, ends[0].1),
                end: IVec2::new(ends[1].0, ends[1].1),
            });
            if lines.len() >= params.max_lines {
                break;
            }
        }
    }
    lines
}
