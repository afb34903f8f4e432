//! Tuning parameters for motion, collision and ambient animation.
//!
//! Every struct follows the same pattern: a `Default` tuned for the
//! warehouse scene, a few `#[must_use]` builder methods, and a `validate()`
//! that rejects non-finite or non-positive rates before the simulation starts.

use robot_types::{RobotError, ensure_non_negative, ensure_positive};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of the motion integrator.
///
/// Rates are per second. Linear ramps (`acceleration`, `deceleration`) are in
/// units/s²; exponential rates (`friction`, `turn_accel`, ...) are in 1/s.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionParams {
    /// Top forward speed.
    pub max_speed: f64,
    /// Reverse speed as a fraction of `max_speed`.
    pub reverse_factor: f64,
    /// Ramp rate while speeding up toward the target.
    pub acceleration: f64,
    /// Ramp rate while slowing toward a smaller or opposite target.
    pub deceleration: f64,
    /// Exponential decay rate while coasting with no drive input.
    pub friction: f64,
    /// Velocities below this snap to exactly zero when no input drives them.
    pub velocity_epsilon: f64,

    /// Top turn rate (rad/s).
    pub max_turn_speed: f64,
    /// Fraction of turn rate lost at full speed.
    pub turn_speed_falloff: f64,
    /// Exponential approach rate toward the target turn rate.
    pub turn_accel: f64,
    /// Exponential decay rate with no turn input.
    pub turn_friction: f64,

    /// Head yaw rate while a head flag is held (rad/s).
    pub head_turn_speed: f64,
    /// Exponential approach rate for head yaw velocity.
    pub head_friction: f64,
    /// Head yaw limit either side of centre (rad).
    pub head_max_rotation: f64,

    /// Wheel radius used to turn distance into wheel spin.
    pub wheel_radius: f64,

    /// Fore/aft pitch per unit of velocity error.
    pub tilt_amount: f64,
    /// Exponential smoothing rate for tilt.
    pub tilt_smoothing: f64,
    /// Sideways roll per unit of turn rate.
    pub lean_amount: f64,
    /// Minimum speed factor applied to lean.
    pub lean_speed_floor: f64,
    /// Exponential smoothing rate for lean.
    pub lean_smoothing: f64,

    /// Suspension spring stiffness (per unit mass).
    pub suspension_stiffness: f64,
    /// Suspension damping (per unit mass).
    pub suspension_damping: f64,
    /// Longest suspension integration substep (seconds).
    pub suspension_substep: f64,
    /// Velocity error above which a bump is injected.
    pub bump_threshold: f64,
    /// Bump impulse per unit of excess velocity error per second.
    pub bump_gain: f64,
    /// Suspension velocity impulse on collision.
    pub collision_bounce: f64,
    /// Suspension offset and velocity below this snap to rest.
    pub settle_epsilon: f64,

    /// Largest frame time the integrator will apply in one step.
    pub max_dt: f64,
    /// Speed / turn rate below which telemetry reports no motion.
    pub motion_label_threshold: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        let stiffness = 160.0;
        Self {
            max_speed: 3.0,
            reverse_factor: 0.6,
            acceleration: 6.0,
            deceleration: 9.0,
            friction: 3.0,
            velocity_epsilon: 0.01,

            max_turn_speed: 2.2,
            turn_speed_falloff: 0.3,
            turn_accel: 8.0,
            turn_friction: 7.0,

            head_turn_speed: 1.8,
            head_friction: 10.0,
            head_max_rotation: 1.2,

            wheel_radius: 0.18,

            tilt_amount: 0.06,
            tilt_smoothing: 6.0,
            lean_amount: 0.06,
            lean_speed_floor: 0.3,
            lean_smoothing: 5.0,

            suspension_stiffness: stiffness,
            // Critical damping for unit mass
            suspension_damping: 2.0 * f64::sqrt(stiffness),
            suspension_substep: 1.0 / 120.0,
            bump_threshold: 1.5,
            bump_gain: 0.6,
            collision_bounce: 0.35,
            settle_epsilon: 1e-4,

            max_dt: 0.1,
            motion_label_threshold: 0.05,
        }
    }
}

impl MotionParams {
    /// A slower, gentler preset for tight spaces.
    #[must_use]
    pub fn cautious() -> Self {
        Self {
            max_speed: 1.5,
            acceleration: 3.0,
            max_turn_speed: 1.4,
            ..Default::default()
        }
    }

    /// Set the top speed.
    #[must_use]
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Set the suspension spring, keeping it critically damped.
    #[must_use]
    pub fn with_critical_suspension(mut self, stiffness: f64) -> Self {
        self.suspension_stiffness = stiffness;
        self.suspension_damping = 2.0 * stiffness.max(0.0).sqrt();
        self
    }

    /// Target reverse speed (positive magnitude).
    #[must_use]
    pub fn reverse_speed(&self) -> f64 {
        self.max_speed * self.reverse_factor
    }

    /// Validate the parameters.
    pub fn validate(&self) -> robot_types::Result<()> {
        for (name, value) in [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("friction", self.friction),
            ("velocity_epsilon", self.velocity_epsilon),
            ("max_turn_speed", self.max_turn_speed),
            ("turn_accel", self.turn_accel),
            ("turn_friction", self.turn_friction),
            ("head_turn_speed", self.head_turn_speed),
            ("head_friction", self.head_friction),
            ("head_max_rotation", self.head_max_rotation),
            ("wheel_radius", self.wheel_radius),
            ("tilt_smoothing", self.tilt_smoothing),
            ("lean_smoothing", self.lean_smoothing),
            ("suspension_stiffness", self.suspension_stiffness),
            ("suspension_substep", self.suspension_substep),
            ("settle_epsilon", self.settle_epsilon),
            ("max_dt", self.max_dt),
        ] {
            ensure_positive(name, value)?;
        }
        for (name, value) in [
            ("tilt_amount", self.tilt_amount),
            ("lean_amount", self.lean_amount),
            ("suspension_damping", self.suspension_damping),
            ("bump_threshold", self.bump_threshold),
            ("bump_gain", self.bump_gain),
            ("collision_bounce", self.collision_bounce),
            ("motion_label_threshold", self.motion_label_threshold),
        ] {
            ensure_non_negative(name, value)?;
        }
        if !(0.0..=1.0).contains(&self.reverse_factor) {
            return Err(RobotError::invalid_config("reverse_factor must be in [0, 1]"));
        }
        if !(0.0..1.0).contains(&self.turn_speed_falloff) {
            return Err(RobotError::invalid_config("turn_speed_falloff must be in [0, 1)"));
        }
        if !(0.0..=1.0).contains(&self.lean_speed_floor) {
            return Err(RobotError::invalid_config("lean_speed_floor must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Axis-aligned arena limits on the ground plane.
///
/// The robot's centre is kept `CollisionParams::effective_radius()` inside
/// these bounds. The default arena is deeper on +Z, where the loading bay
/// opens.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArenaBounds {
    /// Lowest X.
    pub min_x: f64,
    /// Highest X.
    pub max_x: f64,
    /// Lowest Z.
    pub min_z: f64,
    /// Highest Z (loading-bay side).
    pub max_z: f64,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min_x: -9.0,
            max_x: 9.0,
            min_z: -9.0,
            max_z: 12.0,
        }
    }
}

impl ArenaBounds {
    /// A square arena `[-half, half]²`.
    #[must_use]
    pub const fn square(half_extent: f64) -> Self {
        Self {
            min_x: -half_extent,
            max_x: half_extent,
            min_z: -half_extent,
            max_z: half_extent,
        }
    }

    /// Width along X.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Depth along Z.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }
}

/// Parameters of the collision resolver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollisionParams {
    /// Robot footprint radius.
    pub robot_radius: f64,
    /// Extra clearance kept around the footprint.
    pub padding: f64,
    /// Centre distances at or below this are treated as unresolvable this frame.
    pub contact_epsilon: f64,
    /// Arena limits.
    pub arena: ArenaBounds,
}

impl Default for CollisionParams {
    fn default() -> Self {
        Self {
            robot_radius: 0.5,
            padding: 0.1,
            contact_epsilon: 1e-6,
            arena: ArenaBounds::default(),
        }
    }
}

impl CollisionParams {
    /// Footprint radius including padding.
    #[must_use]
    pub fn effective_radius(&self) -> f64 {
        self.robot_radius + self.padding
    }

    /// Set the arena.
    #[must_use]
    pub fn with_arena(mut self, arena: ArenaBounds) -> Self {
        self.arena = arena;
        self
    }

    /// Validate the parameters.
    pub fn validate(&self) -> robot_types::Result<()> {
        ensure_positive("robot_radius", self.robot_radius)?;
        ensure_non_negative("padding", self.padding)?;
        ensure_positive("contact_epsilon", self.contact_epsilon)?;
        let inset = 2.0 * self.effective_radius();
        if !(self.arena.width() > inset && self.arena.depth() > inset) {
            return Err(RobotError::invalid_config(format!(
                "arena {:?} is too small for a robot of effective radius {}",
                self.arena,
                self.effective_radius()
            )));
        }
        Ok(())
    }
}

/// Parameters of the idle animator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IdleParams {
    /// Speed and turn rate below which the robot counts as idle.
    pub idle_threshold: f64,
    /// Shortest wait before the next glance (seconds).
    pub min_interval: f64,
    /// Longest wait before the next glance (seconds).
    pub max_interval: f64,
    /// How long a glance is held (seconds).
    pub look_hold: f64,
    /// Largest glance yaw offset (rad).
    pub max_look_yaw: f64,
    /// Largest glance pitch offset (rad).
    pub max_look_pitch: f64,
    /// Exponential easing rate of the look offset.
    pub look_ease: f64,
    /// Breathing bob amplitude.
    pub bob_amplitude: f64,
    /// Breathing bob angular frequency (rad/s).
    pub bob_frequency: f64,
    /// Idle sway tilt amplitude (rad).
    pub tilt_amplitude: f64,
    /// Idle sway angular frequency (rad/s).
    pub tilt_frequency: f64,
    /// Rate at which the idle blend fades in and out.
    pub blend_rate: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for IdleParams {
    fn default() -> Self {
        Self {
            idle_threshold: 0.05,
            min_interval: 2.0,
            max_interval: 6.0,
            look_hold: 1.5,
            max_look_yaw: 0.45,
            max_look_pitch: 0.15,
            look_ease: 3.0,
            bob_amplitude: 0.012,
            bob_frequency: 2.2,
            tilt_amplitude: 0.015,
            tilt_frequency: 0.7,
            blend_rate: 2.0,
            seed: 0x5eed_1d1e,
        }
    }
}

impl IdleParams {
    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the parameters.
    pub fn validate(&self) -> robot_types::Result<()> {
        ensure_non_negative("idle_threshold", self.idle_threshold)?;
        ensure_positive("min_interval", self.min_interval)?;
        ensure_positive("max_interval", self.max_interval)?;
        ensure_non_negative("look_hold", self.look_hold)?;
        ensure_non_negative("max_look_yaw", self.max_look_yaw)?;
        ensure_non_negative("max_look_pitch", self.max_look_pitch)?;
        ensure_positive("look_ease", self.look_ease)?;
        ensure_non_negative("bob_amplitude", self.bob_amplitude)?;
        ensure_non_negative("bob_frequency", self.bob_frequency)?;
        ensure_non_negative("tilt_amplitude", self.tilt_amplitude)?;
        ensure_non_negative("tilt_frequency", self.tilt_frequency)?;
        ensure_positive("blend_rate", self.blend_rate)?;
        if self.min_interval > self.max_interval {
            return Err(RobotError::invalid_config(
                "idle min_interval must not exceed max_interval",
            ));
        }
        Ok(())
    }
}

/// Parameters of the dust particle system.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DustParams {
    /// Hard population cap.
    pub cap: usize,
    /// Speed above which wheels kick up dust.
    pub spawn_speed: f64,
    /// Spawns per second per wheel at full speed.
    pub spawn_rate: f64,
    /// Lifetime upper bound (seconds); each particle lives 60–100% of it.
    pub max_age: f64,
    /// Downward acceleration.
    pub gravity: f64,
    /// Linear drag rate (1/s).
    pub drag: f64,
    /// Half the distance between the wheels.
    pub half_track: f64,
    /// How far behind the centre the contact points sit.
    pub rear_offset: f64,
    /// Largest sideways launch speed.
    pub outward_speed: f64,
    /// Largest upward launch speed.
    pub upward_speed: f64,
    /// Largest backward launch speed.
    pub backward_speed: f64,
    /// Opacity at birth.
    pub base_opacity: f64,
    /// Scale growth per second of age.
    pub growth: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for DustParams {
    fn default() -> Self {
        Self {
            cap: 120,
            spawn_speed: 0.8,
            spawn_rate: 30.0,
            max_age: 1.2,
            gravity: 2.5,
            drag: 1.8,
            half_track: 0.35,
            rear_offset: 0.2,
            outward_speed: 0.4,
            upward_speed: 0.6,
            backward_speed: 0.3,
            base_opacity: 0.45,
            growth: 1.5,
            seed: 0xd057,
        }
    }
}

impl DustParams {
    /// Set the population cap.
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the parameters.
    pub fn validate(&self) -> robot_types::Result<()> {
        ensure_non_negative("spawn_speed", self.spawn_speed)?;
        ensure_non_negative("spawn_rate", self.spawn_rate)?;
        ensure_positive("max_age", self.max_age)?;
        ensure_non_negative("gravity", self.gravity)?;
        ensure_non_negative("drag", self.drag)?;
        ensure_non_negative("half_track", self.half_track)?;
        ensure_non_negative("rear_offset", self.rear_offset)?;
        ensure_non_negative("outward_speed", self.outward_speed)?;
        ensure_non_negative("upward_speed", self.upward_speed)?;
        ensure_non_negative("backward_speed", self.backward_speed)?;
        ensure_non_negative("growth", self.growth)?;
        if !(0.0..=1.0).contains(&self.base_opacity) {
            return Err(RobotError::invalid_config("base_opacity must be in [0, 1]"));
        }
        Ok(())
    }
}
