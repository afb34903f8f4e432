//! Core types for the warehouse robot simulation.
//!
//! This crate provides the shared vocabulary of the simulation:
//!
//! - [`RobotPose`] / [`KinematicState`] - Where the robot is and how fast it moves
//! - [`InputState`] / [`InputFlag`] - The six boolean control flags
//! - [`ExpressionId`] / [`ExpressionState`] - What the LCD face shows
//! - [`TelemetrySample`] / [`StateLabel`] - Per-frame HUD telemetry
//! - [`Rgb`] / [`Appearance`] - Externally supplied colours
//! - [`RobotError`] - Configuration and collaborator errors
//!
//! # Design Philosophy
//!
//! These types are **pure data**. They carry no physics and no rendering.
//! They are the common language between:
//!
//! - The motion integrator (`robot-motion`)
//! - The LCD and camera pipelines (`robot-display`)
//! - The frame loop and its collaborators (`robot-sim`)
//!
//! # Layer 0
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.
//!
//! # Coordinate System
//!
//! - Y: up
//! - The robot drives in the X/Z plane; planar points are `Point2 (x, z)`
//! - Heading 0 faces +Z; increasing heading swings the nose toward +X, which
//!   is the robot's left, so positive angular velocity turns left
//! - Right-handed
//!
//! # Example
//!
//! ```
//! use robot_types::{InputFlag, InputState, RobotPose, StateLabel, TelemetrySample};
//! use nalgebra::Point2;
//!
//! let pose = RobotPose::at(Point2::new(0.0, -4.0), 0.0);
//! assert_eq!(pose.world_base().z, -4.0);
//!
//! let input = InputState::none().with(InputFlag::Forward, true);
//! assert!(input.forward());
//!
//! let sample = TelemetrySample::from_motion(1.5, 0.0, 3.0, 0.05);
//! assert_eq!(sample.label, StateLabel::Moving);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
)]

mod color;
mod error;
mod expression;
mod input;
mod pose;
mod telemetry;

pub use color::{Appearance, Rgb};
pub use error::{RobotError, ensure_non_negative, ensure_positive};
pub use expression::{ExpressionId, ExpressionState, TransientText};
pub use input::{InputFlag, InputState};
pub use pose::{KinematicState, RobotPose, forward_axis, right_axis};
pub use telemetry::{StateLabel, TelemetrySample};

// Re-export math types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

/// Result type for robot simulation operations.
pub type Result<T> = std::result::Result<T, RobotError>;
