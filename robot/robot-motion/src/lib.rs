//! Per-frame motion for the warehouse robot.
//!
//! This crate owns everything that moves:
//!
//! - [`MotionIntegrator`] - Velocity ramps, turning, head tracking, tilt, lean
//!   and suspension, one variable-length frame at a time
//! - [`CollisionResolver`] - Push-out against circular obstacles plus the arena clamp
//! - [`ObstacleRegistry`] - The static scene proxies, including the
//!   [`warehouse`](ObstacleRegistry::warehouse) layout
//! - [`IdleAnimator`] - Glances and breathing while the robot stands still
//! - [`DustSystem`] - Capped wheel dust particles
//!
//! # Layer 0
//!
//! No engine, no GPU, no threads. Every type here runs in headless loops,
//! tests and tools.
//!
//! # Determinism
//!
//! Given the same parameters (including RNG seeds), inputs and frame times,
//! every component produces bit-identical results.
//!
//! # Example
//!
//! ```
//! use robot_motion::{
//!     CollisionParams, CollisionResolver, HeadControl, MotionIntegrator, MotionParams,
//!     ObstacleRegistry,
//! };
//! use robot_types::{InputState, KinematicState, RobotPose};
//!
//! let integrator = MotionIntegrator::new(MotionParams::default());
//! let resolver =
//!     CollisionResolver::new(CollisionParams::default(), ObstacleRegistry::warehouse());
//!
//! let mut pose = RobotPose::default();
//! let mut kin = KinematicState::default();
//! let outcome = integrator.step(
//!     InputState::none(),
//!     HeadControl::User,
//!     1.0 / 60.0,
//!     &mut pose,
//!     &mut kin,
//!     &resolver,
//! );
//! assert!(!outcome.collided);
//! assert!(kin.is_at_rest());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::similar_names,             // yaw/pitch, a/b pairs are clearer as-is
)]

mod collision;
mod dust;
mod idle;
mod integrator;
mod obstacle;
mod params;

pub use collision::{CollisionResolver, Resolution};
pub use dust::{DustParticle, DustSystem};
pub use idle::{IdleActivity, IdleAnimator, IdleOutput};
pub use integrator::{
    HeadControl, MotionIntegrator, StepOutcome, decay_to_zero, exp_approach, move_toward,
};
pub use obstacle::{Aabb2, Obstacle, ObstacleId, ObstacleKind, ObstacleRegistry, ObstacleShape};
pub use params::{ArenaBounds, CollisionParams, DustParams, IdleParams, MotionParams};
