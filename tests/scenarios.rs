//! End-to-end scenarios and property tests for the sensor, steering and map
//! pipeline.
//!
//! Run with: cargo test --test scenarios

use glam::Vec2;
use image::{DynamicImage, GrayImage, Luma};
use proptest::prelude::*;

use lidar_assist::consts::MIN_SLOWDOWN;
use lidar_assist::map::MapBuilder;
use lidar_assist::settings::{AssistLevel, MapSettings, SteeringSettings};
use lidar_assist::sim::{
    CastStrategy, LidarSensor, MovementIntent, Obstacle, Slowdown, SlowdownModel, SteeringEngine,
    blend_direction, compute_slowdown, quadratic_bezier, repulsion_control_offset,
};

const RANGE: f32 = 200.0;

// =============================================================================
// End-to-end scenarios
// =============================================================================

#[test]
fn scenario_single_rect_ahead() {
    let obstacles = vec![Obstacle::rect(Vec2::new(100.0, -10.0), Vec2::new(20.0, 20.0))];
    let sensor = LidarSensor::new(RANGE, 360.0, CastStrategy::Analytic);

    let hits: Vec<usize> = (0..360)
        .filter(|&i| {
            sensor
                .cast_ray(Vec2::ZERO, sensor.ray_angle(i, 360), &obstacles)
                .is_some()
        })
        .collect();

    // One contiguous span of rays centred on bearing 0 (index 180)
    assert!(!hits.is_empty());
    assert!(hits.windows(2).all(|w| w[1] == w[0] + 1), "{hits:?}");
    assert!(hits.contains(&180));
    assert_eq!(hits.len(), 11);

    let cloud = sensor.simulate(Vec2::ZERO, 360, &obstacles);
    assert_eq!(cloud.len(), hits.len());
    let nearest = cloud
        .iter()
        .min_by(|a, b| a.length().total_cmp(&b.length()))
        .unwrap();
    assert!((nearest.length() - 100.0).abs() < 1e-3);
    assert!((*nearest - Vec2::new(100.0, 0.0)).length() < 1e-3);
}

#[test]
fn scenario_single_rect_marching_agrees() {
    let obstacles = vec![Obstacle::rect(Vec2::new(100.0, -10.0), Vec2::new(20.0, 20.0))];
    let analytic = LidarSensor::new(RANGE, 360.0, CastStrategy::Analytic);
    let marching = LidarSensor::new(RANGE, 360.0, CastStrategy::Marching { step: 1.0 });

    let a = analytic.cast_ray(Vec2::ZERO, 0.0, &obstacles).unwrap();
    let m = marching.cast_ray(Vec2::ZERO, 0.0, &obstacles).unwrap();
    assert!((a.distance - m.distance).abs() <= 1.0);
}

#[test]
fn scenario_empty_scene_goes_straight() {
    let sensor = LidarSensor::new(RANGE, 360.0, CastStrategy::Analytic);
    let user = Vec2::new(640.0, 360.0);
    let cloud = sensor.simulate(user, 360, &[]);
    assert!(cloud.is_empty());

    let engine = SteeringEngine::new(SteeringSettings::default(), AssistLevel::Medium);
    let intent = MovementIntent {
        right: true,
        up: true,
        ..Default::default()
    };
    let frame = engine.steer(user, &cloud, RANGE, intent);
    let dir = intent.desired_direction();

    assert_eq!(frame.slowdown, Slowdown::IDENTITY);
    assert_eq!(frame.nudge, Vec2::ZERO);
    assert!((frame.endpoint - (user + dir * RANGE)).length() < 1e-3);
    // Every curve sample lies on the straight segment
    for p in &frame.guidance_curve {
        let along = (*p - user).dot(dir);
        let off = (*p - user).perp_dot(dir);
        assert!(off.abs() < 1e-3);
        assert!((-1e-3..=RANGE + 1e-3).contains(&along));
    }
    assert_eq!(frame.guidance_curve.first(), Some(&user));
}

#[test]
fn scenario_point_near_path_pushes_away() {
    let settings = SteeringSettings::default();
    let start = Vec2::ZERO;
    let end = Vec2::new(RANGE, 0.0);
    let obstacle = Vec2::new(100.0, settings.avoid_thresh / 2.0);

    let offset = repulsion_control_offset(
        start,
        end,
        &[obstacle],
        settings.avoid_thresh,
        settings.repulsion_factor,
    );
    assert_ne!(offset, Vec2::ZERO);
    // Obstacle sits below the path (+y), so the push goes up (-y)
    assert!(offset.y < 0.0);
    assert!(offset.x.abs() < 1e-4);
    assert!((offset.y + 7.5).abs() < 1e-4);
}

fn small_map_settings() -> MapSettings {
    MapSettings {
        working_width: 320,
        working_height: 180,
        ..Default::default()
    }
}

#[test]
fn scenario_blank_image_has_no_polygons() {
    let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(640, 360, Luma([255])));
    let polygons = MapBuilder::new(small_map_settings()).build(&blank);
    assert!(polygons.is_empty());
}

/// White floorplan with an L-shaped dark wall
fn floorplan() -> DynamicImage {
    let img = GrayImage::from_fn(320, 180, |x, y| {
        let horizontal = (40..280).contains(&x) && (40..48).contains(&y);
        let vertical = (40..48).contains(&x) && (40..150).contains(&y);
        if horizontal || vertical {
            Luma([20])
        } else {
            Luma([240])
        }
    });
    DynamicImage::ImageLuma8(img)
}

#[test]
fn map_builder_is_idempotent() {
    let builder = MapBuilder::new(small_map_settings());
    let img = floorplan();
    let first = builder.build(&img);
    let second = builder.build(&img);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn map_polygons_feed_the_sensor() {
    let polygons = MapBuilder::new(small_map_settings()).build(&floorplan());
    let obstacles: Vec<Obstacle> = polygons.into_iter().map(Obstacle::Polygon).collect();
    let sensor = LidarSensor::new(RANGE, 360.0, CastStrategy::Marching { step: 1.0 });

    // Standing below the horizontal wall, looking up
    let hit = sensor
        .cast_ray(Vec2::new(160.0, 100.0), -90.0, &obstacles)
        .expect("wall above the user");
    assert!(hit.distance > 0.0 && hit.distance < 60.0);
}

// =============================================================================
// Properties
// =============================================================================

fn arb_vec(lo: f32, hi: f32) -> impl Strategy<Value = Vec2> {
    (lo..hi, lo..hi).prop_map(|(x, y)| Vec2::new(x, y))
}

fn arb_rect() -> impl Strategy<Value = Obstacle> {
    (arb_vec(-300.0, 300.0), arb_vec(1.0, 120.0)).prop_map(|(pos, size)| Obstacle::rect(pos, size))
}

/// Convex quad: one jittered vertex per quadrant of a circle, in angular order
fn arb_polygon() -> impl Strategy<Value = Obstacle> {
    (
        arb_vec(-300.0, 300.0),
        5.0f32..80.0,
        prop::array::uniform4(0.1f32..1.4),
    )
        .prop_filter_map("degenerate quad", |(centre, radius, jitter)| {
            let vertices = jitter
                .iter()
                .enumerate()
                .map(|(q, j)| {
                    let a = q as f32 * std::f32::consts::FRAC_PI_2 + j;
                    centre + Vec2::from_angle(a) * radius
                })
                .collect();
            Obstacle::polygon(vertices)
        })
}

fn arb_obstacle() -> impl Strategy<Value = Obstacle> {
    prop_oneof![arb_rect(), arb_polygon()]
}

fn arb_strategy() -> impl Strategy<Value = CastStrategy> {
    prop_oneof![
        Just(CastStrategy::Analytic),
        (0.5f32..5.0).prop_map(|step| CastStrategy::Marching { step }),
    ]
}

fn arb_intent() -> impl Strategy<Value = MovementIntent> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(left, right, up, down)| MovementIntent {
            left,
            right,
            up,
            down,
        },
    )
}

fn arb_model() -> impl Strategy<Value = SlowdownModel> {
    prop_oneof![
        (0.0f32..1.0).prop_map(|factor| SlowdownModel::WeightSum { factor }),
        (0.0f32..1.0, 0.0f32..1.0, 0usize..20).prop_map(|(factor_wide, factor_thin, n)| {
            SlowdownModel::ThinWide {
                factor_wide,
                factor_thin,
                thin_count_threshold: n,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn prop_hit_distance_within_range(
        obstacles in prop::collection::vec(arb_obstacle(), 1..6),
        origin in arb_vec(-200.0, 200.0),
        angle in -180.0f32..180.0,
        strategy in arb_strategy(),
    ) {
        let sensor = LidarSensor::new(RANGE, 360.0, strategy);
        if let Some(hit) = sensor.cast_ray(origin, angle, &obstacles) {
            prop_assert!(hit.distance >= 0.0);
            prop_assert!(hit.distance <= RANGE + 1e-3);
        }
    }

    #[test]
    fn prop_cloud_never_exceeds_ray_count(
        obstacles in prop::collection::vec(arb_obstacle(), 0..8),
        num_rays in 0usize..400,
    ) {
        let sensor = LidarSensor::new(RANGE, 360.0, CastStrategy::Analytic);
        let cloud = sensor.simulate(Vec2::ZERO, num_rays, &obstacles);
        prop_assert!(cloud.len() <= num_rays);
        for p in &cloud {
            prop_assert!(p.length() <= RANGE + 1e-3);
        }
    }

    #[test]
    fn prop_slowdown_bounded(
        points in prop::collection::vec(arb_vec(-250.0, 250.0), 0..200),
        intent in arb_intent(),
        model in arb_model(),
    ) {
        let s = compute_slowdown(&points, Vec2::ZERO, RANGE, intent.desired_direction(), 30.0, model);
        for v in [s.left, s.right, s.up, s.down] {
            prop_assert!((MIN_SLOWDOWN..=1.0).contains(&v));
        }
    }

    #[test]
    fn prop_slowdown_identity_when_out_of_range(
        points in prop::collection::vec(arb_vec(300.0, 600.0), 0..50),
        model in arb_model(),
    ) {
        let s = compute_slowdown(&points, Vec2::ZERO, RANGE, Vec2::X, 30.0, model);
        prop_assert_eq!(s, Slowdown::IDENTITY);
    }

    #[test]
    fn prop_blend_never_opposes_desired(
        intent in arb_intent(),
        repulsion in arb_vec(-1000.0, 1000.0),
        obstacle_weight in 0.0f32..2.0,
    ) {
        let desired = intent.desired_direction();
        let (net, _) = blend_direction(desired, repulsion, 1.0, obstacle_weight);
        if desired.x != 0.0 {
            prop_assert!(net.x * desired.x >= 0.0);
        }
        if desired.y != 0.0 {
            prop_assert!(net.y * desired.y >= 0.0);
        }
    }

    #[test]
    fn prop_bezier_hits_endpoints(
        p0 in arb_vec(-1000.0, 1000.0),
        p1 in arb_vec(-1000.0, 1000.0),
        p2 in arb_vec(-1000.0, 1000.0),
        n in 2usize..60,
    ) {
        let curve = quadratic_bezier(p0, p1, p2, n);
        prop_assert_eq!(curve.len(), n);
        prop_assert!((curve[0] - p0).length() < 1e-3);
        prop_assert!((curve[n - 1] - p2).length() < 1e-3);
    }

    #[test]
    fn prop_bezier_control_shift_is_bounded(
        p0 in arb_vec(-200.0, 200.0),
        p1 in arb_vec(-200.0, 200.0),
        p2 in arb_vec(-200.0, 200.0),
        delta in arb_vec(-5.0, 5.0),
        n in 2usize..60,
    ) {
        // Moving P1 by delta shifts each sample by 2t(1-t) * delta, at most |delta| / 2
        let base = quadratic_bezier(p0, p1, p2, n);
        let moved = quadratic_bezier(p0, p1 + delta, p2, n);
        for (a, b) in base.iter().zip(&moved) {
            prop_assert!(a.distance(*b) <= delta.length() / 2.0 + 1e-3);
        }
    }

    #[test]
    fn prop_bezier_steps_are_bounded(
        p0 in arb_vec(-200.0, 200.0),
        p1 in arb_vec(-200.0, 200.0),
        p2 in arb_vec(-200.0, 200.0),
        n in 2usize..60,
    ) {
        // |B'| <= 2 * max(|P1 - P0|, |P2 - P1|), so no jumps between samples
        let max_leg = p0.distance(p1).max(p1.distance(p2));
        let bound = 2.0 * max_leg / (n - 1) as f32 + 1e-2;
        let curve = quadratic_bezier(p0, p1, p2, n);
        for w in curve.windows(2) {
            prop_assert!(w[0].distance(w[1]) <= bound);
        }
    }
}
