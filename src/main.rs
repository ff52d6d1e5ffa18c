//! LiDAR assist headless driver
//!
//! Builds a scene, then runs the fixed-timestep loop with a held movement
//! and reports how the steering engine shaped the path.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};
    use glam::Vec2;

    use lidar_assist::consts::*;
    use lidar_assist::settings::{AssistLevel, Settings};
    use lidar_assist::sim::{Bounds, MovementIntent, Scene, SimState, TickInput, tick};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Key {
        Left,
        Right,
        Up,
        Down,
    }

    fn parse_assist(s: &str) -> Result<AssistLevel, String> {
        AssistLevel::from_str(s).ok_or_else(|| format!("unknown assist level '{s}'"))
    }

    /// Run the LiDAR steering simulation without a display
    #[derive(Parser, Debug)]
    #[command(name = "lidar-assist")]
    struct Args {
        /// Floorplan image to build obstacles from
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Treat the map as a flat-color grid (dark pixels become rectangles)
        #[arg(long, requires = "map")]
        grid: bool,

        /// Random rectangle scene with this seed (ignored with --map)
        #[arg(long)]
        scatter: Option<u64>,

        /// Settings JSON; defaults are used when missing or invalid
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Write the effective settings to this path and continue
        #[arg(long)]
        dump_settings: Option<PathBuf>,

        /// Override the assistance level (off, low, medium, high)
        #[arg(short, long, value_parser = parse_assist)]
        assist: Option<AssistLevel>,

        /// Movement keys held for the whole run
        #[arg(long, value_enum, value_delimiter = ',', default_value = "up,left")]
        keys: Vec<Key>,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "240")]
        ticks: u64,
    }

    fn intent(keys: &[Key]) -> MovementIntent {
        MovementIntent {
            left: keys.contains(&Key::Left),
            right: keys.contains(&Key::Right),
            up: keys.contains(&Key::Up),
            down: keys.contains(&Key::Down),
        }
    }

    fn build_scene(args: &Args, settings: &Settings) -> Scene {
        match (&args.map, args.scatter) {
            (Some(path), _) if args.grid => Scene::from_grid_image(path, &settings.map),
            (Some(path), _) => Scene::from_image(path, &settings.map),
            (None, Some(seed)) => {
                let extent = Bounds {
                    min: Vec2::ZERO,
                    max: Vec2::new(settings.map.working_width as f32, settings.map.working_height as f32),
                };
                Scene::scattered(seed, 25, extent, settings.user.spawn, USER_RADIUS * 3.0)
            }
            (None, None) => Scene::demo(),
        }
    }

    pub fn run() {
        env_logger::init();
        let args = Args::parse();
        log::info!("LiDAR assist (native) starting...");

        let mut settings = Settings::load(args.settings.as_deref());
        if let Some(level) = args.assist {
            settings.assist = level;
        }
        if let Some(path) = &args.dump_settings {
            if let Err(e) = settings.save(path) {
                log::warn!("Could not write settings to {}: {}", path.display(), e);
            }
        }

        let scene = build_scene(&args, &settings);
        let mut state = SimState::new(settings, scene);

        let input = TickInput {
            movement: intent(&args.keys),
            assist: None,
        };
        let start = state.user.pos;
        let mut closest = f32::INFINITY;
        let mut slowest = 1.0f32;

        for _ in 0..args.ticks {
            tick(&mut state, &input, SIM_DT);
            if let Some(d) = state.frame.nearest_obstacle {
                closest = closest.min(d);
            }
            let s = state.frame.slowdown;
            slowest = slowest.min(s.left.min(s.right).min(s.up).min(s.down));
        }

        let end = state.user.pos;
        let camera = state.camera_origin(Vec2::new(WORKING_WIDTH as f32, WORKING_HEIGHT as f32));
        log::info!(
            "Ran {} ticks at assist {}: ({:.1}, {:.1}) -> ({:.1}, {:.1}), camera at ({:.1}, {:.1})",
            state.time_ticks,
            state.settings.assist.as_str(),
            start.x,
            start.y,
            end.x,
            end.y,
            camera.x,
            camera.y
        );
        if closest.is_finite() {
            log::info!("Closest obstacle {:.1}, lowest slowdown {:.2}", closest, slowest);
        } else {
            log::info!("No obstacle came within sensor range");
        }
        println!(
            "travelled {:.1} in {} ticks, final position ({:.1}, {:.1})",
            start.distance(end),
            state.time_ticks,
            end.x,
            end.y
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library has no web front end; nothing to drive here
}
