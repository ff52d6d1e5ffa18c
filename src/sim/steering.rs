//! Reactive steering and path shaping
//!
//! Recomputed from scratch every tick from the point cloud and the user's
//! movement keys. Four steps, in order:
//! 1. Directional slowdown multipliers from four angular cones
//! 2. Quadrant repulsion blended with the desired direction
//! 3. Quadratic guidance curve bent away from nearby obstacles
//! 4. Lateral nudge toward the curve

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::curve::{bend_intensity, control_point, quadratic_bezier, repulsion_control_offset};
use super::geometry::decompose;
use crate::bearing_degrees;
use crate::consts::MIN_SLOWDOWN;
use crate::settings::{AssistLevel, SteeringSettings};

/// Cardinal movement directions (screen axes, +y is down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Center bearing of this direction's cone (degrees)
    pub fn center_angle(&self) -> f32 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => 90.0,
            Direction::Left => 180.0,
            Direction::Up => 270.0,
        }
    }

    /// Unit impulse for this direction's movement key
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Right => Vec2::X,
            Direction::Down => Vec2::Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Up => Vec2::NEG_Y,
        }
    }

    /// Whether `bearing` (degrees, [0, 360)) lies within `half_width` of the cone center
    pub fn cone_contains(&self, bearing: f32, half_width: f32) -> bool {
        let diff = (bearing - self.center_angle()).abs();
        diff.min(360.0 - diff) <= half_width
    }
}

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementIntent {
    pub fn is_held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.desired_direction() == Vec2::ZERO
    }

    /// Normalized sum of the held keys' unit impulses (zero when idle or cancelled)
    pub fn desired_direction(&self) -> Vec2 {
        Direction::ALL
            .iter()
            .filter(|d| self.is_held(**d))
            .map(Direction::unit)
            .sum::<Vec2>()
            .normalize_or_zero()
    }
}

/// Per-direction speed multipliers in [0.1, 1.0]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slowdown {
    pub left: f32,
    pub right: f32,
    pub up: f32,
    pub down: f32,
}

impl Default for Slowdown {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Slowdown {
    pub const IDENTITY: Slowdown = Slowdown {
        left: 1.0,
        right: 1.0,
        up: 1.0,
        down: 1.0,
    };

    pub fn get(&self, dir: Direction) -> f32 {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    fn set(&mut self, dir: Direction, value: f32) {
        match dir {
            Direction::Left => self.left = value,
            Direction::Right => self.right = value,
            Direction::Up => self.up = value,
            Direction::Down => self.down = value,
        }
    }
}

/// How accumulated cone contents become a multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlowdownModel {
    /// `1 - factor * sum(weight)` over every point in the cone
    WeightSum { factor: f32 },
    /// Cones with fewer than `thin_count_threshold` points are thin obstacles,
    /// penalized by their closest point; others by aggregate weight. Points
    /// behind the current movement are ignored.
    ThinWide {
        factor_wide: f32,
        factor_thin: f32,
        thin_count_threshold: usize,
    },
}

impl Default for SlowdownModel {
    fn default() -> Self {
        SlowdownModel::ThinWide {
            factor_wide: 0.05,
            factor_thin: 0.1,
            thin_count_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ConeStats {
    min_dist: f32,
    sum_weight: f32,
    count: usize,
}

/// Directional slowdown multipliers around `user_pos`.
///
/// Each point within `range` (and not exactly at the user) adds the proximity
/// weight `(range - dist) / range` to every cone its bearing falls in.
pub fn compute_slowdown(
    points: &[Vec2],
    user_pos: Vec2,
    range: f32,
    movement: Vec2,
    cone_angle: f32,
    model: SlowdownModel,
) -> Slowdown {
    if range <= 0.0 {
        return Slowdown::IDENTITY;
    }

    let gate_on_movement = matches!(model, SlowdownModel::ThinWide { .. });
    let heading = movement.normalize_or_zero();
    let mut stats = [ConeStats {
        min_dist: range,
        sum_weight: 0.0,
        count: 0,
    }; 4];

    for &pt in points {
        let diff = pt - user_pos;
        let dist = diff.length();
        if dist == 0.0 || dist > range {
            continue;
        }
        if gate_on_movement && heading != Vec2::ZERO && heading.dot(diff / dist) < 0.0 {
            continue;
        }

        let weight = (range - dist) / range;
        let bearing = bearing_degrees(user_pos, pt);
        for (dir, cone) in Direction::ALL.iter().zip(stats.iter_mut()) {
            if dir.cone_contains(bearing, cone_angle) {
                cone.count += 1;
                cone.sum_weight += weight;
                cone.min_dist = cone.min_dist.min(dist);
            }
        }
    }

    let mut slowdown = Slowdown::IDENTITY;
    for (dir, cone) in Direction::ALL.iter().zip(stats.iter()) {
        if cone.count == 0 {
            continue;
        }
        let raw = match model {
            SlowdownModel::WeightSum { factor } => 1.0 - factor * cone.sum_weight,
            SlowdownModel::ThinWide {
                factor_wide,
                factor_thin,
                thin_count_threshold,
            } => {
                if cone.count < thin_count_threshold {
                    1.0 - factor_thin * (range - cone.min_dist) / range
                } else {
                    1.0 - factor_wide * cone.sum_weight
                }
            }
        };
        slowdown.set(*dir, raw.clamp(MIN_SLOWDOWN, 1.0));
    }
    slowdown
}

/// Quadrant-count repulsion: `(right - left, down - up)`.
///
/// Points sharing an axis with the user belong to no quadrant.
pub fn quadrant_repulsion(points: &[Vec2], user_pos: Vec2) -> Vec2 {
    let (mut left, mut right, mut up, mut down) = (0i32, 0i32, 0i32, 0i32);
    for pt in points {
        let d = *pt - user_pos;
        if d.x == 0.0 || d.y == 0.0 {
            continue;
        }
        if d.x < 0.0 {
            left += 1;
        } else {
            right += 1;
        }
        if d.y < 0.0 {
            up += 1;
        } else {
            down += 1;
        }
    }
    Vec2::new((right - left) as f32, (down - up) as f32)
}

/// Blend the desired direction with repulsion.
///
/// Returns `(net_vector, net_direction)`. Repulsion may shrink either axis
/// but never flips it against the desired direction; a flipped axis is reset
/// to the desired value. A zero net vector falls back to `desired`.
pub fn blend_direction(
    desired: Vec2,
    repulsion: Vec2,
    user_weight: f32,
    obstacle_weight: f32,
) -> (Vec2, Vec2) {
    let mut net = user_weight * desired - obstacle_weight * repulsion;

    if desired.x != 0.0 && net.x * desired.x < 0.0 {
        net.x = desired.x;
    }
    if desired.y != 0.0 && net.y * desired.y < 0.0 {
        net.y = desired.y;
    }

    let net_direction = if net == Vec2::ZERO {
        desired
    } else {
        net.normalize_or_zero()
    };
    (net, net_direction)
}

/// Sideways correction toward the guidance curve.
///
/// Takes the vector from the user to `curve[lookahead]`, keeps only the part
/// perpendicular to the input direction and scales it by `strength`.
/// Zero when there is no input or no curve.
pub fn lateral_nudge(
    user_pos: Vec2,
    curve: &[Vec2],
    input_dir: Vec2,
    lookahead: usize,
    strength: f32,
) -> Vec2 {
    if input_dir == Vec2::ZERO || curve.is_empty() {
        return Vec2::ZERO;
    }
    let target = curve[lookahead.min(curve.len() - 1)];
    let (_, perpendicular) = decompose(target - user_pos, input_dir);
    perpendicular * strength
}

/// Distance from `user_pos` to the nearest cloud point
pub fn nearest_distance(points: &[Vec2], user_pos: Vec2) -> Option<f32> {
    points
        .iter()
        .map(|p| p.distance(user_pos))
        .min_by(|a, b| a.total_cmp(b))
}

/// Everything the steering engine derived for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct SteeringFrame {
    /// Unit vector from the held keys, or zero
    pub desired_direction: Vec2,
    /// Raw quadrant-count repulsion
    pub repulsion_vector: Vec2,
    /// Blended (clamped) direction before normalization
    pub net_vector: Vec2,
    /// Unit blended direction
    pub net_direction: Vec2,
    /// `user_pos + net_direction * range`
    pub endpoint: Vec2,
    /// Bézier control point
    pub control_point: Vec2,
    /// Sampled guidance curve, user to endpoint
    pub guidance_curve: Vec<Vec2>,
    /// Per-direction speed multipliers
    pub slowdown: Slowdown,
    /// Position correction for this tick
    pub nudge: Vec2,
    /// Nearest cloud point distance, if any point was seen
    pub nearest_obstacle: Option<f32>,
}

/// Stateless steering computation configured once per session
#[derive(Debug, Clone)]
pub struct SteeringEngine {
    pub settings: SteeringSettings,
    pub assist: AssistLevel,
}

impl SteeringEngine {
    pub fn new(settings: SteeringSettings, assist: AssistLevel) -> Self {
        Self { settings, assist }
    }

    /// Compute the steering frame for one tick
    pub fn steer(
        &self,
        user_pos: Vec2,
        cloud: &[Vec2],
        range: f32,
        intent: MovementIntent,
    ) -> SteeringFrame {
        let cfg = &self.settings;
        let desired = intent.desired_direction();

        if !self.assist.is_enabled() {
            return self.straight_frame(user_pos, range, desired);
        }

        let slowdown = compute_slowdown(cloud, user_pos, range, desired, cfg.cone_angle, cfg.slowdown);

        let repulsion = quadrant_repulsion(cloud, user_pos);
        let (net_vector, net_direction) =
            blend_direction(desired, repulsion, cfg.user_weight, cfg.obstacle_weight);
        let endpoint = user_pos + net_direction * range;

        let nearest = nearest_distance(cloud, user_pos);
        let min_dist = nearest.unwrap_or(range).min(range);
        let bend = bend_intensity(min_dist, cfg.bend_threshold);
        let local = repulsion_control_offset(
            user_pos,
            endpoint,
            cloud,
            cfg.avoid_thresh,
            cfg.repulsion_factor,
        );
        let control = control_point(user_pos, endpoint, net_direction, repulsion, bend, local);
        let guidance_curve = quadratic_bezier(user_pos, control, endpoint, cfg.curve_resolution);

        let strength = if range > 0.0 {
            self.assist.control_strength() * (range - min_dist) / range
        } else {
            0.0
        };
        let nudge = lateral_nudge(user_pos, &guidance_curve, desired, cfg.lookahead_index, strength);

        SteeringFrame {
            desired_direction: desired,
            repulsion_vector: repulsion,
            net_vector,
            net_direction,
            endpoint,
            control_point: control,
            guidance_curve,
            slowdown,
            nudge,
            nearest_obstacle: nearest,
        }
    }

    /// Frame used while assistance is off: go straight, no slowdown, no nudge
    fn straight_frame(&self, user_pos: Vec2, range: f32, desired: Vec2) -> SteeringFrame {
        let endpoint = user_pos + desired * range;
        let control = (user_pos + endpoint) * 0.5;
        SteeringFrame {
            desired_direction: desired,
            repulsion_vector: Vec2::ZERO,
            net_vector: desired,
            net_direction: desired,
            endpoint,
            control_point: control,
            guidance_curve: quadratic_bezier(
                user_pos,
                control,
                endpoint,
                self.settings.curve_resolution,
            ),
            slowdown: Slowdown::IDENTITY,
            nudge: Vec2::ZERO,
            nearest_obstacle: None,
        }
    }
}
