//! Idle "alive" animation: glances, breathing bob and sway.
//!
//! The animator only acts while the robot stands still with nobody steering
//! the head. Its outputs are offsets layered on top of the integrated pose by
//! the renderer and the POV camera; the pose itself is never modified.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use robot_types::{InputState, KinematicState};
use tracing::trace;

use crate::integrator::exp_approach;
use crate::params::IdleParams;

/// What the robot is doing this frame, as seen by the idle animator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IdleActivity {
    /// Linear velocity.
    pub velocity: f64,
    /// Turn rate.
    pub angular_velocity: f64,
    /// True if a head flag is held.
    pub head_input: bool,
    /// True if a scripted override owns the head.
    pub scripted: bool,
}

impl IdleActivity {
    /// Build from the frame's kinematics and input.
    #[must_use]
    pub fn from_motion(kin: &KinematicState, input: InputState, scripted: bool) -> Self {
        Self {
            velocity: kin.velocity,
            angular_velocity: kin.angular_velocity,
            head_input: input.head_active(),
            scripted,
        }
    }

    /// True if the robot counts as idle under `threshold`.
    #[must_use]
    pub fn is_idle(&self, threshold: f64) -> bool {
        self.velocity.abs() < threshold
            && self.angular_velocity.abs() < threshold
            && !self.head_input
            && !self.scripted
    }
}

/// Offsets produced by one idle update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IdleOutput {
    /// Head yaw added to the integrated head yaw (rad).
    pub head_yaw_offset: f64,
    /// Head pitch (rad).
    pub head_pitch_offset: f64,
    /// Vertical body bob.
    pub bob: f64,
    /// Sideways body sway (rad).
    pub tilt: f64,
    /// Current idle blend in `[0, 1]`.
    pub blend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LookPhase {
    Waiting { remaining: f64 },
    Holding { remaining: f64 },
}

/// Drives random glances and breathing while the robot is idle.
///
/// # Example
///
/// ```
/// use robot_motion::{IdleActivity, IdleAnimator, IdleParams};
///
/// let mut idle = IdleAnimator::new(IdleParams::default());
/// let mut out = idle.update(0.0, 0.0, IdleActivity::default());
/// for frame in 1..=600 {
///     out = idle.update(1.0 / 60.0, f64::from(frame) / 60.0, IdleActivity::default());
/// }
/// // After ten idle seconds the blend is fully in
/// assert!(out.blend > 0.99);
/// ```
#[derive(Debug, Clone)]
pub struct IdleAnimator {
    params: IdleParams,
    rng: StdRng,
    phase: LookPhase,
    target_yaw: f64,
    target_pitch: f64,
    look_yaw: f64,
    look_pitch: f64,
    blend: f64,
    was_active: bool,
}

impl IdleAnimator {
    /// Create an animator seeded from `params.seed`.
    #[must_use]
    pub fn new(params: IdleParams) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let first_wait = sample_interval(&mut rng, &params);
        Self {
            params,
            rng,
            phase: LookPhase::Waiting {
                remaining: first_wait,
            },
            target_yaw: 0.0,
            target_pitch: 0.0,
            look_yaw: 0.0,
            look_pitch: 0.0,
            blend: 0.0,
            was_active: false,
        }
    }

    /// Animator parameters.
    #[must_use]
    pub fn params(&self) -> &IdleParams {
        &self.params
    }

    /// True if the last update ran in idle mode.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.was_active
    }

    /// Advance by `dt` at absolute time `time`.
    pub fn update(&mut self, dt: f64, time: f64, activity: IdleActivity) -> IdleOutput {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let active = activity.is_idle(self.params.idle_threshold);

        if active {
            self.advance_glance(dt);
        } else {
            if self.was_active {
                self.phase = LookPhase::Waiting {
                    remaining: sample_interval(&mut self.rng, &self.params),
                };
            }
            self.target_yaw = 0.0;
            self.target_pitch = 0.0;
        }
        self.was_active = active;

        let p = &self.params;
        self.look_yaw = exp_approach(self.look_yaw, self.target_yaw, p.look_ease, dt);
        self.look_pitch = exp_approach(self.look_pitch, self.target_pitch, p.look_ease, dt);
        self.blend = exp_approach(
            self.blend,
            if active { 1.0 } else { 0.0 },
            p.blend_rate,
            dt,
        );

        IdleOutput {
            head_yaw_offset: self.look_yaw,
            head_pitch_offset: self.look_pitch,
            bob: self.blend * p.bob_amplitude * (time * p.bob_frequency).sin(),
            tilt: self.blend * p.tilt_amplitude * (time * p.tilt_frequency).sin(),
            blend: self.blend,
        }
    }

    fn advance_glance(&mut self, dt: f64) {
        self.phase = match self.phase {
            LookPhase::Waiting { remaining } if remaining - dt <= 0.0 => {
                let p = &self.params;
                self.target_yaw = self.rng.gen_range(-p.max_look_yaw..=p.max_look_yaw);
                self.target_pitch = self.rng.gen_range(-p.max_look_pitch..=p.max_look_pitch);
                trace!(yaw = self.target_yaw, pitch = self.target_pitch, "idle glance");
                LookPhase::Holding {
                    remaining: p.look_hold,
                }
            }
            LookPhase::Waiting { remaining } => LookPhase::Waiting {
                remaining: remaining - dt,
            },
            LookPhase::Holding { remaining } if remaining - dt <= 0.0 => {
                self.target_yaw = 0.0;
                self.target_pitch = 0.0;
                LookPhase::Waiting {
                    remaining: sample_interval(&mut self.rng, &self.params),
                }
            }
            LookPhase::Holding { remaining } => LookPhase::Holding {
                remaining: remaining - dt,
            },
        };
    }
}

fn sample_interval(rng: &mut StdRng, params: &IdleParams) -> f64 {
    rng.gen_range(params.min_interval..=params.max_interval)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    fn run(idle: &mut IdleAnimator, seconds: f64, activity: IdleActivity) -> Vec<IdleOutput> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frames = (seconds / DT).round() as u32;
        (1..=frames)
            .map(|f| idle.update(DT, f64::from(f) * DT, activity))
            .collect()
    }

    fn moving() -> IdleActivity {
        IdleActivity {
            velocity: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn activity_classification() {
        assert!(IdleActivity::default().is_idle(0.05));
        assert!(!moving().is_idle(0.05));
        let head = IdleActivity {
            head_input: true,
            ..Default::default()
        };
        assert!(!head.is_idle(0.05));
        let scripted = IdleActivity {
            scripted: true,
            ..Default::default()
        };
        assert!(!scripted.is_idle(0.05));
    }

    #[test]
    fn stays_quiet_while_moving() {
        let mut idle = IdleAnimator::new(IdleParams::default());
        for out in run(&mut idle, 10.0, moving()) {
            assert_eq!(out.head_yaw_offset, 0.0);
            assert_eq!(out.bob, 0.0);
            assert_eq!(out.blend, 0.0);
        }
        assert!(!idle.is_active());
    }

    #[test]
    fn glances_within_the_wait_window() {
        let params = IdleParams::default();
        let max_yaw = params.max_look_yaw;
        let mut idle = IdleAnimator::new(params);
        let outputs = run(&mut idle, 7.0, IdleActivity::default());

        assert!(outputs.iter().any(|o| o.head_yaw_offset.abs() > 1e-6));
        for o in &outputs {
            assert!(o.head_yaw_offset.abs() <= max_yaw + 1e-12);
        }
    }

    #[test]
    fn look_returns_to_centre_when_motion_resumes() {
        let mut idle = IdleAnimator::new(IdleParams::default());
        run(&mut idle, 7.0, IdleActivity::default());
        let out = run(&mut idle, 5.0, moving());
        let last = out.last().unwrap();
        assert_relative_eq!(last.head_yaw_offset, 0.0, epsilon = 1e-6);
        assert_relative_eq!(last.blend, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn bob_is_bounded_by_blend() {
        let params = IdleParams::default();
        let amp = params.bob_amplitude;
        let mut idle = IdleAnimator::new(params);
        for o in run(&mut idle, 5.0, IdleActivity::default()) {
            assert!(o.bob.abs() <= amp * o.blend + 1e-15);
            assert!((0.0..=1.0).contains(&o.blend));
        }
    }

    #[test]
    fn same_seed_same_glances() {
        let mut a = IdleAnimator::new(IdleParams::default().with_seed(7));
        let mut b = IdleAnimator::new(IdleParams::default().with_seed(7));
        assert_eq!(
            run(&mut a, 12.0, IdleActivity::default()),
            run(&mut b, 12.0, IdleActivity::default())
        );
    }
}
