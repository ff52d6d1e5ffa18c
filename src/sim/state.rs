//! Simulation state
//!
//! One explicit struct owns everything a tick reads or writes; nothing is global.

use glam::Vec2;

use super::obstacle::Obstacle;
use super::scene::Scene;
use super::sensor::{LidarSensor, PointCloud};
use super::steering::{Direction, MovementIntent, Slowdown, SteeringEngine, SteeringFrame};
use crate::settings::{AssistLevel, Settings};

/// The user-controlled point the sensor is mounted on
#[derive(Debug, Clone)]
pub struct User {
    pub pos: Vec2,
    /// Speed at multiplier 1.0 (world units per second)
    pub speed: f32,
    /// Keys held this tick
    pub intent: MovementIntent,
}

impl User {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            speed,
            intent: MovementIntent::default(),
        }
    }

    /// Move one step along every held direction, scaled by its slowdown multiplier
    pub fn apply_movement(&mut self, slowdown: &Slowdown, dt: f32) {
        for dir in Direction::ALL {
            if self.intent.is_held(dir) {
                self.pos += dir.unit() * self.speed * dt * slowdown.get(dir);
            }
        }
    }

    /// Shift sideways toward the guidance curve
    pub fn apply_nudge(&mut self, nudge: Vec2) {
        self.pos += nudge;
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub settings: Settings,
    /// Static for the whole session
    pub obstacles: Vec<Obstacle>,
    pub user: User,
    pub sensor: LidarSensor,
    pub engine: SteeringEngine,
    /// Point cloud from the latest tick
    pub cloud: PointCloud,
    /// Steering result from the latest tick
    pub frame: SteeringFrame,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl SimState {
    /// Create a new simulation over `scene`
    pub fn new(settings: Settings, scene: Scene) -> Self {
        let spawn = scene.spawn.unwrap_or(settings.user.spawn);
        let user = User::new(spawn, settings.user.speed);
        let sensor = LidarSensor::from_settings(&settings.sensor);
        let engine = SteeringEngine::new(settings.steering.clone(), settings.assist);

        log::info!(
            "Simulation '{}' with {} obstacles, user at ({:.1}, {:.1})",
            scene.name,
            scene.obstacles.len(),
            spawn.x,
            spawn.y
        );

        let cloud = sensor.simulate(spawn, settings.sensor.num_rays, &scene.obstacles);
        let frame = engine.steer(spawn, &cloud, sensor.range, MovementIntent::default());

        Self {
            settings,
            obstacles: scene.obstacles,
            user,
            sensor,
            engine,
            cloud,
            frame,
            time_ticks: 0,
        }
    }

    /// Change the assistance level
    pub fn set_assist(&mut self, level: AssistLevel) {
        if self.engine.assist != level {
            log::info!("Assist level: {} -> {}", self.engine.assist.as_str(), level.as_str());
            self.engine.assist = level;
            self.settings.assist = level;
        }
    }

    /// World point drawn at the top-left of a viewport centred on the user
    pub fn camera_origin(&self, viewport: Vec2) -> Vec2 {
        self.user.pos - viewport * 0.5
    }
}
