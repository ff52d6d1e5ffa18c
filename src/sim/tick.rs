//! Fixed timestep simulation tick
//!
//! One tick = sense, steer, move, nudge. Nothing carries over between ticks
//! except the user's position.

use super::state::SimState;
use super::steering::MovementIntent;
use crate::settings::AssistLevel;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub movement: MovementIntent,
    /// Switch assistance level (UI button)
    pub assist: Option<AssistLevel>,
}

/// Advance the simulation by one fixed timestep
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) {
    if let Some(level) = input.assist {
        state.set_assist(level);
    }

    state.time_ticks += 1;
    state.user.intent = input.movement;

    // Sense from the current position
    let cloud = state.sensor.simulate(
        state.user.pos,
        state.settings.sensor.num_rays,
        &state.obstacles,
    );

    // Steer
    let frame = state
        .engine
        .steer(state.user.pos, &cloud, state.sensor.range, input.movement);

    // Move with slowdown, then slide toward the guidance curve
    state.user.apply_movement(&frame.slowdown, dt);
    state.user.apply_nudge(frame.nudge);

    log::trace!(
        "tick {}: {} points, slowdown r{:.2} l{:.2} u{:.2} d{:.2}",
        state.time_ticks,
        cloud.len(),
        frame.slowdown.right,
        frame.slowdown.left,
        frame.slowdown.up,
        frame.slowdown.down
    );

    state.cloud = cloud;
    state.frame = frame;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::{Obstacle, Scene};
    use glam::Vec2;

    fn wall_scene() -> Scene {
        Scene {
            name: "wall".into(),
            obstacles: vec![Obstacle::rect(Vec2::new(100.0, -50.0), Vec2::new(20.0, 100.0))],
            spawn: Some(Vec2::ZERO),
        }
    }

    fn right() -> TickInput {
        TickInput {
            movement: MovementIntent {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_moves_user() {
        let mut state = SimState::new(Settings::default(), Scene::empty());
        let start = state.user.pos;
        tick(&mut state, &right(), SIM_DT);
        assert_eq!(state.time_ticks, 1);
        assert!((state.user.pos.x - start.x - 10.0).abs() < 1e-3);
        assert_eq!(state.user.pos.y, start.y);
    }

    #[test]
    fn test_idle_tick_keeps_position() {
        let mut state = SimState::new(Settings::default(), wall_scene());
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.user.pos, Vec2::ZERO);
        assert!(!state.cloud.is_empty());
    }

    #[test]
    fn test_wall_slows_approach() {
        let mut free = SimState::new(Settings::default(), Scene::empty());
        let mut blocked = SimState::new(Settings::default(), wall_scene());
        free.user.pos = Vec2::ZERO;

        tick(&mut free, &right(), SIM_DT);
        tick(&mut blocked, &right(), SIM_DT);

        assert!(blocked.frame.slowdown.right < 1.0);
        assert!(blocked.user.pos.x < free.user.pos.x);
    }

    #[test]
    fn test_assist_off_ignores_obstacles() {
        let mut state = SimState::new(Settings::default(), wall_scene());
        let input = TickInput {
            assist: Some(AssistLevel::Off),
            ..right()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.engine.assist, AssistLevel::Off);
        assert_eq!(state.settings.assist, AssistLevel::Off);
        assert!((state.user.pos.x - 10.0).abs() < 1e-3);
        assert_eq!(state.user.pos.y, 0.0);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = SimState::new(Settings::default(), wall_scene());
        let mut state2 = SimState::new(Settings::default(), wall_scene());

        let inputs = [
            right(),
            TickInput {
                movement: MovementIntent {
                    right: true,
                    down: true,
                    ..Default::default()
                },
                ..Default::default()
            },
            TickInput::default(),
            right(),
        ];

        for input in &inputs {
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.user.pos, state2.user.pos);
        assert_eq!(state1.frame, state2.frame);
    }
}
