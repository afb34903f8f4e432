//! Robot pose and kinematic state.

use nalgebra::{Point2, Point3, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Planar forward axis for a heading angle.
///
/// Headings are measured from +Z toward +X, so heading 0 faces +Z and the
/// forward axis is `(sin h, cos h)` in `(x, z)`.
#[must_use]
pub fn forward_axis(heading: f64) -> Vector2<f64> {
    Vector2::new(heading.sin(), heading.cos())
}

/// Planar right-hand axis for a heading angle (`forward × up`).
#[must_use]
pub fn right_axis(heading: f64) -> Vector2<f64> {
    Vector2::new(-heading.cos(), heading.sin())
}

/// Full robot pose.
///
/// `position` is planar `(x, z)`; the vertical coordinate is the ground plane
/// plus `suspension_offset`. All angles are radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RobotPose {
    /// Planar position `(x, z)`.
    pub position: Point2<f64>,
    /// Body heading.
    pub heading: f64,
    /// Head yaw relative to the body.
    pub head_yaw: f64,
    /// Accumulated wheel rotation.
    pub wheel_spin: f64,
    /// Fore/aft body pitch from acceleration.
    pub body_tilt: f64,
    /// Sideways body roll from turning.
    pub body_lean: f64,
    /// Vertical suspension displacement.
    pub suspension_offset: f64,
    /// Vertical suspension velocity.
    pub suspension_velocity: f64,
}

impl Default for RobotPose {
    fn default() -> Self {
        Self::at(Point2::origin(), 0.0)
    }
}

impl RobotPose {
    /// A pose at rest at `position` facing `heading`.
    #[must_use]
    pub fn at(position: Point2<f64>, heading: f64) -> Self {
        Self {
            position,
            heading,
            head_yaw: 0.0,
            wheel_spin: 0.0,
            body_tilt: 0.0,
            body_lean: 0.0,
            suspension_offset: 0.0,
            suspension_velocity: 0.0,
        }
    }

    /// Planar forward axis of the body.
    #[must_use]
    pub fn forward(&self) -> Vector2<f64> {
        forward_axis(self.heading)
    }

    /// Planar right axis of the body.
    #[must_use]
    pub fn right(&self) -> Vector2<f64> {
        right_axis(self.heading)
    }

    /// World-space position of the robot base, lifted by the suspension.
    #[must_use]
    pub fn world_base(&self) -> Point3<f64> {
        Point3::new(self.position.x, self.suspension_offset, self.position.y)
    }

    /// Check every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.heading.is_finite()
            && self.head_yaw.is_finite()
            && self.wheel_spin.is_finite()
            && self.body_tilt.is_finite()
            && self.body_lean.is_finite()
            && self.suspension_offset.is_finite()
            && self.suspension_velocity.is_finite()
    }
}

/// Continuous velocities driven toward input targets each frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KinematicState {
    /// Signed linear speed along the forward axis.
    pub velocity: f64,
    /// Heading rate (positive turns left).
    pub angular_velocity: f64,
    /// Head yaw rate.
    pub head_angular_velocity: f64,
}

impl KinematicState {
    /// Check every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.velocity.is_finite()
            && self.angular_velocity.is_finite()
            && self.head_angular_velocity.is_finite()
    }

    /// True if every velocity is exactly zero.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_at_rest(&self) -> bool {
        self.velocity == 0.0 && self.angular_velocity == 0.0 && self.head_angular_velocity == 0.0
    }
}
