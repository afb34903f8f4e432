//! Per-frame motion integration.
//!
//! [`MotionIntegrator::step`] advances the robot by one variable-length frame:
//!
//! 1. Clamp `dt` to `[0, max_dt]`
//! 2. Drive linear velocity toward the input target (asymmetric ramps, friction)
//! 3. Drive turn rate toward its speed-scaled target (exponential)
//! 4. Drive head yaw, or pin it to a scripted value
//! 5. Integrate heading and propose a new position
//! 6. Resolve the proposal against obstacles and the arena
//! 7. Accumulate wheel spin; smooth body tilt and lean
//! 8. Integrate the suspension spring-damper in fixed substeps
//!
//! The step never fails. Every velocity stays within its configured limit and
//! every pose component stays finite for any `dt >= 0`.
//!
//! # Example
//!
//! ```
//! use robot_motion::{
//!     CollisionParams, CollisionResolver, HeadControl, MotionIntegrator, MotionParams,
//!     ObstacleRegistry,
//! };
//! use robot_types::{InputFlag, InputState, KinematicState, RobotPose};
//!
//! let integrator = MotionIntegrator::new(MotionParams::default());
//! let resolver = CollisionResolver::new(CollisionParams::default(), ObstacleRegistry::new());
//! let mut pose = RobotPose::default();
//! let mut kin = KinematicState::default();
//!
//! let input = InputState::none().with(InputFlag::Forward, true);
//! for _ in 0..60 {
//!     integrator.step(input, HeadControl::User, 1.0 / 60.0, &mut pose, &mut kin, &resolver);
//! }
//!
//! // One second of forward input moves the robot toward +Z
//! assert!(pose.position.y > 1.0);
//! assert!(kin.velocity > 0.0);
//! ```

use robot_types::{InputState, KinematicState, RobotPose, TelemetrySample, forward_axis};
use tracing::trace;

use crate::collision::CollisionResolver;
use crate::params::MotionParams;

/// Who drives the head this frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum HeadControl {
    /// Head follows the head-left/head-right flags.
    #[default]
    User,
    /// Head is pinned to a scripted yaw (radians, clamped to the head limit).
    Scripted(f64),
}

/// What happened during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Frame time actually applied (after clamping).
    pub dt: f64,
    /// Velocity the input asked for.
    pub target_velocity: f64,
    /// True if the collision resolver corrected the proposed position.
    pub collided: bool,
    /// Signed distance travelled along the forward axis.
    pub distance_moved: f64,
    /// Telemetry derived from the resulting velocities.
    pub telemetry: TelemetrySample,
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[must_use]
pub fn move_toward(current: f64, target: f64, max_delta: f64) -> f64 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(delta)
    }
}

/// Frame-rate independent-ish exponential approach, saturating at the target.
#[must_use]
pub fn exp_approach(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    current + (target - current) * (rate * dt).min(1.0)
}

/// Exponential decay toward zero with a hard snap below `epsilon`.
#[must_use]
pub fn decay_to_zero(current: f64, rate: f64, dt: f64, epsilon: f64) -> f64 {
    let next = current * (1.0 - rate * dt).max(0.0);
    if next.abs() < epsilon { 0.0 } else { next }
}

/// Advances [`RobotPose`] and [`KinematicState`] from input and frame time.
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    params: MotionParams,
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new(MotionParams::default())
    }
}

impl MotionIntegrator {
    /// Create an integrator with `params`.
    #[must_use]
    pub fn new(params: MotionParams) -> Self {
        Self { params }
    }

    /// Integrator parameters.
    #[must_use]
    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Clamp a raw frame time into `[0, max_dt]`. Non-finite input yields 0.
    #[must_use]
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_finite() {
            dt.clamp(0.0, self.params.max_dt)
        } else {
            0.0
        }
    }

    /// Linear velocity requested by `input`. Forward wins over backward.
    #[must_use]
    pub fn target_velocity(&self, input: InputState) -> f64 {
        if input.forward() {
            self.params.max_speed
        } else if input.backward() {
            -self.params.reverse_speed()
        } else {
            0.0
        }
    }

    /// Turn rate requested by `input` at the given linear speed.
    ///
    /// Turning is crisper at low speed: the rate shrinks by
    /// `turn_speed_falloff * |v| / max_speed`.
    #[must_use]
    pub fn target_turn_rate(&self, input: InputState, velocity: f64) -> f64 {
        let p = &self.params;
        let direction = f64::from(i8::from(input.turn_left()) - i8::from(input.turn_right()));
        let speed_ratio = (velocity.abs() / p.max_speed).min(1.0);
        direction * p.max_turn_speed * (1.0 - p.turn_speed_falloff * speed_ratio)
    }

    /// Advance one frame.
    ///
    /// `dt` is clamped with [`clamp_dt`](Self::clamp_dt). The pose and
    /// kinematics are updated in place.
    pub fn step(
        &self,
        input: InputState,
        head: HeadControl,
        dt: f64,
        pose: &mut RobotPose,
        kin: &mut KinematicState,
        resolver: &CollisionResolver,
    ) -> StepOutcome {
        let p = &self.params;
        let dt = self.clamp_dt(dt);

        // Linear velocity
        let target_velocity = self.target_velocity(input);
        kin.velocity = self.approach_velocity(kin.velocity, target_velocity, dt);

        // Turn rate
        let turning = input.turn_left() || input.turn_right();
        kin.angular_velocity = if turning {
            let target = self.target_turn_rate(input, kin.velocity);
            exp_approach(kin.angular_velocity, target, p.turn_accel, dt)
        } else {
            decay_to_zero(kin.angular_velocity, p.turn_friction, dt, p.velocity_epsilon)
        };

        self.step_head(input, head, dt, pose, kin);

        // Heading and position
        pose.heading += kin.angular_velocity * dt;
        let forward = forward_axis(pose.heading);
        let proposed = pose.position + forward * (kin.velocity * dt);
        let resolution = resolver.resolve(proposed);

        if resolution.collided {
            trace!(
                x = resolution.position.x,
                z = resolution.position.y,
                velocity = kin.velocity,
                "collision resolved"
            );
            if kin.velocity != 0.0 {
                pose.suspension_velocity -= kin.velocity.signum() * p.collision_bounce;
            }
            kin.velocity *= 0.5;
        }

        let distance_moved = (resolution.position - pose.position).dot(&forward);
        pose.position = resolution.position;
        pose.wheel_spin += distance_moved / p.wheel_radius;

        // Body attitude
        let tilt_target = -(target_velocity - kin.velocity) * 0.5 * p.tilt_amount;
        pose.body_tilt = exp_approach(pose.body_tilt, tilt_target, p.tilt_smoothing, dt);

        let speed_factor = (kin.velocity.abs() / p.max_speed).max(p.lean_speed_floor);
        let lean_target = -kin.angular_velocity * p.lean_amount * speed_factor;
        pose.body_lean = exp_approach(pose.body_lean, lean_target, p.lean_smoothing, dt);

        // Suspension
        let gap = (target_velocity - kin.velocity).abs();
        if gap > p.bump_threshold {
            pose.suspension_velocity -= (gap - p.bump_threshold) * p.bump_gain * dt;
        }
        self.integrate_suspension(pose, dt);

        debug_assert!(pose.is_finite(), "non-finite pose after step: {pose:?}");
        debug_assert!(kin.is_finite(), "non-finite kinematics after step: {kin:?}");

        StepOutcome {
            dt,
            target_velocity,
            collided: resolution.collided,
            distance_moved,
            telemetry: TelemetrySample::from_motion(
                kin.velocity,
                kin.angular_velocity,
                p.max_speed,
                p.motion_label_threshold,
            ),
        }
    }

    fn approach_velocity(&self, velocity: f64, target: f64, dt: f64) -> f64 {
        let p = &self.params;
        if target == 0.0 {
            return decay_to_zero(velocity, p.friction, dt, p.velocity_epsilon);
        }
        let speeding_up = velocity * target >= 0.0 && velocity.abs() < target.abs();
        let rate = if speeding_up { p.acceleration } else { p.deceleration };
        move_toward(velocity, target, rate * dt)
    }

    fn step_head(
        &self,
        input: InputState,
        head: HeadControl,
        dt: f64,
        pose: &mut RobotPose,
        kin: &mut KinematicState,
    ) {
        let p = &self.params;
        match head {
            HeadControl::Scripted(yaw) => {
                kin.head_angular_velocity = 0.0;
                pose.head_yaw = yaw.clamp(-p.head_max_rotation, p.head_max_rotation);
            }
            HeadControl::User => {
                let direction =
                    f64::from(i8::from(input.head_left()) - i8::from(input.head_right()));
                let target = direction * p.head_turn_speed;
                let mut velocity =
                    exp_approach(kin.head_angular_velocity, target, p.head_friction, dt);
                if !input.head_active() && velocity.abs() < p.velocity_epsilon {
                    velocity = 0.0;
                }
                kin.head_angular_velocity = velocity;
                pose.head_yaw = (pose.head_yaw + velocity * dt)
                    .clamp(-p.head_max_rotation, p.head_max_rotation);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn integrate_suspension(&self, pose: &mut RobotPose, dt: f64) {
        let p = &self.params;
        if dt > 0.0 {
            let substeps = (dt / p.suspension_substep).ceil().max(1.0) as u32;
            let h = dt / f64::from(substeps);
            for _ in 0..substeps {
                let accel = -pose.suspension_offset * p.suspension_stiffness
                    - pose.suspension_velocity * p.suspension_damping;
                pose.suspension_velocity += accel * h;
                pose.suspension_offset += pose.suspension_velocity * h;
            }
        }
        if pose.suspension_offset.abs() < p.settle_epsilon
            && pose.suspension_velocity.abs() < p.settle_epsilon
        {
            pose.suspension_offset = 0.0;
            pose.suspension_velocity = 0.0;
        }
    }
}
