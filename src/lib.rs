//! LiDAR Assist - a 2D range-sensor simulation with reactive steering
//!
//! Core modules:
//! - `sim`: Per-tick sensor and steering core (pure, deterministic)
//! - `map`: One-shot raster image to obstacle polygon pipeline
//! - `settings`: Tunables with JSON persistence
//! - `error`: Errors surfaced at the fallible boundaries

pub mod error;
pub mod map;
pub mod settings;
pub mod sim;

pub use error::{MapError, SettingsError};
pub use settings::{AssistLevel, Settings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one sensor sweep per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Working resolution maps are rescaled to before processing
    pub const WORKING_WIDTH: u32 = 1280;
    pub const WORKING_HEIGHT: u32 = 720;

    /// Sensor defaults (distances in world units, angles in degrees)
    pub const LIDAR_RANGE: f32 = 200.0;
    pub const LIDAR_FOV: f32 = 360.0;
    pub const LIDAR_NUM_RAYS: usize = 360;

    /// User defaults
    pub const USER_SPEED: f32 = 600.0;
    pub const USER_RADIUS: f32 = 20.0;

    /// Slowdown multipliers never drop below this, so the user is never frozen
    pub const MIN_SLOWDOWN: f32 = 0.1;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Bearing from `from` to `to` in degrees, [0, 360), measured from +x toward +y
#[inline]
pub fn bearing_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    normalize_degrees(d.y.atan2(d.x).to_degrees())
}

/// Unit vector pointing along an angle given in degrees
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(cos, sin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-4);
        assert!((normalize_degrees(450.0) - 90.0).abs() < 1e-4);
        assert!(normalize_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn test_bearing_degrees() {
        let o = Vec2::ZERO;
        assert!(bearing_degrees(o, Vec2::new(1.0, 0.0)).abs() < 1e-4);
        assert!((bearing_degrees(o, Vec2::new(0.0, 1.0)) - 90.0).abs() < 1e-4);
        assert!((bearing_degrees(o, Vec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-4);
        assert!((bearing_degrees(o, Vec2::new(0.0, -1.0)) - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_direction_from_degrees() {
        let d = direction_from_degrees(90.0);
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }
}
