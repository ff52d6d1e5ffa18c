//! Simulation settings and tunables
//!
//! Persisted as JSON. Every field has a default, so partial files are fine.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::{CastStrategy, SlowdownModel};

/// Steering assistance strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssistLevel {
    /// Steering bypassed entirely: identity slowdown, straight curve, no nudge
    Off,
    Low,
    #[default]
    Medium,
    High,
}

impl AssistLevel {
    pub const ALL: [AssistLevel; 4] = [
        AssistLevel::Off,
        AssistLevel::Low,
        AssistLevel::Medium,
        AssistLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssistLevel::Off => "Off",
            AssistLevel::Low => "Low",
            AssistLevel::Medium => "Medium",
            AssistLevel::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(AssistLevel::Off),
            "low" => Some(AssistLevel::Low),
            "medium" | "med" => Some(AssistLevel::Medium),
            "high" => Some(AssistLevel::High),
            _ => None,
        }
    }

    /// Fraction of the lateral offset toward the guidance curve applied per tick
    pub fn control_strength(&self) -> f32 {
        match self {
            AssistLevel::Off => 0.0,
            AssistLevel::Low => 0.05,
            AssistLevel::Medium => 0.1,
            AssistLevel::High => 0.2,
        }
    }

    /// Whether the steering engine runs at all
    pub fn is_enabled(&self) -> bool {
        *self != AssistLevel::Off
    }
}

/// Ray-casting sensor tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    /// Maximum ray length (world units)
    pub range: f32,
    /// Angular span covered by the rays (degrees)
    pub fov: f32,
    /// Rays per sweep
    pub num_rays: usize,
    /// Forward axis of the sensor (degrees); irrelevant for a 360° sweep
    pub heading: f32,
    /// Intersection strategy
    pub strategy: CastStrategy,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            range: LIDAR_RANGE,
            fov: LIDAR_FOV,
            num_rays: LIDAR_NUM_RAYS,
            heading: 0.0,
            strategy: CastStrategy::Analytic,
        }
    }
}

/// Steering / path-shaping tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringSettings {
    /// Half-width of each directional slowdown cone (degrees)
    pub cone_angle: f32,
    /// Which slowdown model converts cone contents into multipliers
    pub slowdown: SlowdownModel,
    /// Weight of the user's desired direction in the blend
    pub user_weight: f32,
    /// Weight of the quadrant repulsion vector in the blend
    pub obstacle_weight: f32,
    /// Nearest-obstacle distance below which the curve starts bending harder
    pub bend_threshold: f32,
    /// Perpendicular distance from the straight path that counts as a hazard
    pub avoid_thresh: f32,
    /// Scale of the local repulsion-control offset
    pub repulsion_factor: f32,
    /// Number of samples along the guidance curve
    pub curve_resolution: usize,
    /// Curve sample the lateral nudge steers toward
    pub lookahead_index: usize,
}

impl Default for SteeringSettings {
    fn default() -> Self {
        Self {
            cone_angle: 30.0,
            slowdown: SlowdownModel::default(),
            user_weight: 1.0,
            obstacle_weight: 0.05,
            bend_threshold: 50.0,
            avoid_thresh: 30.0,
            repulsion_factor: 0.5,
            curve_resolution: 20,
            lookahead_index: 5,
        }
    }
}

/// User movement tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Movement speed at multiplier 1.0 (world units per second)
    pub speed: f32,
    /// Where the user starts
    pub spawn: Vec2,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            speed: USER_SPEED,
            spawn: Vec2::new(WORKING_WIDTH as f32 / 2.0, WORKING_HEIGHT as f32 / 2.0),
        }
    }
}

/// Map ingestion tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Resolution the source image is rescaled to
    pub working_width: u32,
    pub working_height: u32,
    /// Adaptive threshold neighbourhood (odd, pixels)
    pub block_size: u32,
    /// Subtracted from the local mean before thresholding
    pub threshold_offset: f32,
    /// Square structuring element side for the closing pass
    pub close_kernel: u32,
    /// Closing rounds
    pub close_iter: u32,
    /// Canny hysteresis thresholds
    pub canny_low: f32,
    pub canny_high: f32,
    /// Minimum accumulator votes for a Hough line
    pub hough_threshold: u32,
    /// Minimum extent of an accepted segment (pixels)
    pub min_line_len: u32,
    /// Largest gap bridged while walking a segment (pixels)
    pub max_line_gap: u32,
    /// Wall thickness applied to each segment
    pub thickness: f32,
    /// Buffer distance used to bridge near-touching walls when merging
    pub merge_thresh: f32,
    /// Polygons smaller than this are dropped
    pub area_thresh: f32,
    /// Uniform scale about the working-image center
    pub scale: f32,
    /// Grid extraction: max channel value counted as an obstacle pixel
    pub dark_threshold: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            working_width: WORKING_WIDTH,
            working_height: WORKING_HEIGHT,
            block_size: 11,
            threshold_offset: 2.0,
            close_kernel: 5,
            close_iter: 3,
            canny_low: 50.0,
            canny_high: 150.0,
            hough_threshold: 40,
            min_line_len: 20,
            max_line_gap: 15,
            thickness: 8.0,
            merge_thresh: 5.0,
            area_thresh: 200.0,
            scale: 1.0,
            dark_threshold: 0,
        }
    }
}

/// All simulation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Assistance level
    pub assist: AssistLevel,

    // === Components ===
    pub sensor: SensorSettings,
    pub steering: SteeringSettings,
    pub user: UserSettings,
    pub map: MapSettings,
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        if let Some(path) = path {
            match Self::try_load(path) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring settings file {}: {}", path.display(), e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
