//! Property tests for the motion integrator and collision resolver.
//!
//! Run with: cargo test -p robot-motion --test motion_properties

use nalgebra::Point2;
use proptest::prelude::*;
use robot_motion::{
    CollisionParams, CollisionResolver, HeadControl, MotionIntegrator, MotionParams,
    ObstacleRegistry,
};
use robot_types::{InputFlag, InputState, KinematicState, RobotPose};

// =============================================================================
// Strategies
// =============================================================================

/// Any combination of the six flags, including contradictory ones.
fn arb_input() -> impl Strategy<Value = InputState> {
    (0u8..64).prop_map(|mask| {
        InputFlag::ALL
            .iter()
            .enumerate()
            .fold(InputState::none(), |state, (i, flag)| {
                state.with(*flag, mask & (1 << i) != 0)
            })
    })
}

/// Kinematics already within the configured limits.
fn arb_kinematics(p: &MotionParams) -> impl Strategy<Value = KinematicState> {
    let v = p.max_speed;
    let w = p.max_turn_speed;
    let h = p.head_turn_speed;
    (-v..=v, -w..=w, -h..=h).prop_map(|(velocity, angular_velocity, head_angular_velocity)| {
        KinematicState {
            velocity,
            angular_velocity,
            head_angular_velocity,
        }
    })
}

/// A pose somewhere in the open arena with a disturbed suspension.
fn arb_pose(p: &MotionParams) -> impl Strategy<Value = RobotPose> {
    let head = p.head_max_rotation;
    (
        -8.0..8.0f64,
        -8.0..11.0f64,
        -10.0..10.0f64,
        -head..=head,
        -0.2..0.2f64,
        -2.0..2.0f64,
    )
        .prop_map(|(x, z, heading, head_yaw, offset, velocity)| RobotPose {
            head_yaw,
            suspension_offset: offset,
            suspension_velocity: velocity,
            ..RobotPose::at(Point2::new(x, z), heading)
        })
}

fn open_floor() -> CollisionResolver {
    CollisionResolver::new(CollisionParams::default(), ObstacleRegistry::new())
}

fn warehouse() -> CollisionResolver {
    CollisionResolver::new(CollisionParams::default(), ObstacleRegistry::warehouse())
}

// =============================================================================
// Integrator bounds
// =============================================================================

proptest! {
    /// One step never pushes a velocity or the head past its limit, whatever
    /// the frame time.
    #[test]
    fn step_respects_limits(
        input in arb_input(),
        dt in prop_oneof![0.0..0.2f64, 0.2..100.0f64, Just(0.0), Just(f64::INFINITY)],
        kin in arb_kinematics(&MotionParams::default()),
        pose in arb_pose(&MotionParams::default()),
    ) {
        let integrator = MotionIntegrator::default();
        let p = integrator.params().clone();
        let resolver = warehouse();
        let mut pose = pose;
        let mut kin = kin;

        let outcome = integrator.step(input, HeadControl::User, dt, &mut pose, &mut kin, &resolver);

        prop_assert!(outcome.dt >= 0.0 && outcome.dt <= p.max_dt);
        prop_assert!(kin.velocity.abs() <= p.max_speed + 1e-12);
        prop_assert!(kin.angular_velocity.abs() <= p.max_turn_speed + 1e-12);
        prop_assert!(kin.head_angular_velocity.abs() <= p.head_turn_speed + 1e-12);
        prop_assert!(pose.head_yaw.abs() <= p.head_max_rotation);
        prop_assert!(pose.is_finite());
        prop_assert!((0.0..=100.0).contains(&outcome.telemetry.speed_percent));
    }

    /// With no input everything settles to exactly zero.
    #[test]
    fn no_input_converges_to_rest(
        kin in arb_kinematics(&MotionParams::default()),
        pose in arb_pose(&MotionParams::default()),
    ) {
        let integrator = MotionIntegrator::default();
        let resolver = open_floor();
        let mut pose = pose;
        let mut kin = kin;

        for _ in 0..1200 {
            integrator.step(
                InputState::none(),
                HeadControl::User,
                1.0 / 60.0,
                &mut pose,
                &mut kin,
                &resolver,
            );
        }

        prop_assert_eq!(kin.velocity, 0.0);
        prop_assert_eq!(kin.angular_velocity, 0.0);
        prop_assert_eq!(kin.head_angular_velocity, 0.0);
        prop_assert_eq!(pose.suspension_offset, 0.0);
        prop_assert_eq!(pose.suspension_velocity, 0.0);
    }
}

// =============================================================================
// Collision resolver
// =============================================================================

proptest! {
    /// Resolving an already-resolved point does not move it.
    #[test]
    fn resolution_is_idempotent(x in -30.0..30.0f64, z in -30.0..30.0f64) {
        let resolver = warehouse();
        let once = resolver.resolve(Point2::new(x, z));
        let twice = resolver.resolve(once.position);
        prop_assert!((once.position - twice.position).norm() < 1e-9);
    }

    /// Resolved points are inside the inset arena and outside every prop.
    #[test]
    fn resolved_points_are_legal(x in -30.0..30.0f64, z in -30.0..30.0f64) {
        let resolver = warehouse();
        let reach = resolver.params().effective_radius();
        let arena = resolver.params().arena;
        let p = resolver.resolve(Point2::new(x, z)).position;

        prop_assert!(p.x >= arena.min_x + reach && p.x <= arena.max_x - reach);
        prop_assert!(p.y >= arena.min_z + reach && p.y <= arena.max_z - reach);
        for (center, radius) in resolver.obstacles().circles() {
            prop_assert!(nalgebra::distance(&p, &center) >= reach + radius - 1e-9);
        }
    }
}

// =============================================================================
// Driving scenarios
// =============================================================================

#[test]
fn full_throttle_into_a_shelf_stops_at_contact() {
    let integrator = MotionIntegrator::default();
    let resolver = warehouse();
    // Face the shelf at (-6.5, -2) from the east
    let mut pose = RobotPose::at(Point2::new(-2.0, -2.0), -std::f64::consts::FRAC_PI_2);
    let mut kin = KinematicState::default();
    let input = InputState::none().with(InputFlag::Forward, true);

    let mut collisions = 0;
    for _ in 0..300 {
        let outcome = integrator.step(
            input,
            HeadControl::User,
            1.0 / 60.0,
            &mut pose,
            &mut kin,
            &resolver,
        );
        collisions += usize::from(outcome.collided);
    }

    assert!(collisions > 0);
    let gap = nalgebra::distance(&pose.position, &Point2::new(-6.5, -2.0));
    assert!((gap - 1.7).abs() < 1e-6, "gap = {gap}");
}

#[test]
fn long_drive_stays_inside_the_arena() {
    let integrator = MotionIntegrator::default();
    let resolver = warehouse();
    let mut pose = RobotPose::at(Point2::new(0.0, 2.0), 0.0);
    let mut kin = KinematicState::default();

    let forward = InputState::none().with(InputFlag::Forward, true);
    let arc = forward.with(InputFlag::TurnLeft, true);
    let reverse = InputState::none()
        .with(InputFlag::Backward, true)
        .with(InputFlag::TurnRight, true);

    for frame in 0..3600 {
        let input = match (frame / 120) % 3 {
            0 => forward,
            1 => arc,
            _ => reverse,
        };
        // Uneven frame times, including a spike
        let dt = if frame % 500 == 499 { 0.5 } else { 1.0 / 60.0 + f64::from(frame % 7) * 0.002 };
        integrator.step(input, HeadControl::User, dt, &mut pose, &mut kin, &resolver);

        let arena = resolver.params().arena;
        assert!(pose.position.x > arena.min_x && pose.position.x < arena.max_x);
        assert!(pose.position.y > arena.min_z && pose.position.y < arena.max_z);
        assert!(pose.is_finite());
    }
}
