//! Per-tick sensor and steering core
//!
//! Everything here is pure and deterministic:
//! - Obstacles are immutable once a scene is built
//! - The sensor and steering engine keep no state between ticks
//! - No rendering or input-device dependencies

pub mod curve;
pub mod geometry;
pub mod obstacle;
pub mod scene;
pub mod sensor;
pub mod state;
pub mod steering;
pub mod tick;

pub use curve::{bend_intensity, control_point, quadratic_bezier, repulsion_control_offset};
pub use geometry::{decompose, distance_to_line, project_onto_line};
pub use obstacle::{Bounds, Obstacle, Polygon, RayHit, Rect};
pub use scene::Scene;
pub use sensor::{CastStrategy, LidarSensor, PointCloud};
pub use state::{SimState, User};
pub use steering::{
    Direction, MovementIntent, Slowdown, SlowdownModel, SteeringEngine, SteeringFrame,
    blend_direction, compute_slowdown, lateral_nudge, quadrant_repulsion,
};
pub use tick::{TickInput, tick};
