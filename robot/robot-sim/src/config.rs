//! Aggregate configuration for a simulation run.

use nalgebra::Point2;
use robot_display::{CaptureParams, RobotDimensions};
use robot_motion::{CollisionParams, DustParams, IdleParams, MotionParams};
use robot_types::{Appearance, ExpressionId, RobotError, ensure_positive};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything [`Simulation::new`](crate::Simulation::new) needs.
///
/// Every field has a default, so a JSON config only has to name what it
/// changes.
///
/// # Example
///
/// ```
/// use robot_sim::SimConfig;
///
/// let config = SimConfig::preview().with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.idle.seed, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Drive, turn, head and suspension tuning.
    pub motion: MotionParams,
    /// Robot radius and arena bounds.
    pub collision: CollisionParams,
    /// Idle glances and breathing.
    pub idle: IdleParams,
    /// Wheel dust.
    pub dust: DustParams,
    /// Camera rigs.
    pub capture: CaptureParams,
    /// Robot proportions for rendering and the POV eye.
    pub dimensions: RobotDimensions,
    /// LCD redraw rate (Hz).
    pub expression_rate_hz: f64,
    /// Camera capture rate (Hz).
    pub capture_rate_hz: f64,
    /// Spawn position `(x, z)`.
    pub spawn_position: Point2<f64>,
    /// Spawn heading (radians).
    pub spawn_heading: f64,
    /// Face shown at start.
    pub initial_expression: ExpressionId,
    /// Colours at start.
    pub appearance: Appearance,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            motion: MotionParams::default(),
            collision: CollisionParams::default(),
            idle: IdleParams::default(),
            dust: DustParams::default(),
            capture: CaptureParams::default(),
            dimensions: RobotDimensions::default(),
            expression_rate_hz: 30.0,
            capture_rate_hz: 20.0,
            spawn_position: Point2::new(0.0, 2.0),
            spawn_heading: 0.0,
            initial_expression: ExpressionId::Neutral,
            appearance: Appearance::default(),
        }
    }
}

impl SimConfig {
    /// Small capture targets, for tools and tests.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            capture: CaptureParams::preview(),
            ..Self::default()
        }
    }

    /// Seed every random source.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.idle = self.idle.with_seed(seed);
        self.dust = self.dust.with_seed(seed.wrapping_add(1));
        self
    }

    /// Set the capture rate.
    #[must_use]
    pub fn with_capture_rate(mut self, hz: f64) -> Self {
        self.capture_rate_hz = hz;
        self
    }

    /// Set the LCD redraw rate.
    #[must_use]
    pub fn with_expression_rate(mut self, hz: f64) -> Self {
        self.expression_rate_hz = hz;
        self
    }

    /// Set the capture parameters.
    #[must_use]
    pub fn with_capture(mut self, capture: CaptureParams) -> Self {
        self.capture = capture;
        self
    }

    /// Set where the robot starts.
    #[must_use]
    pub fn with_spawn(mut self, position: Point2<f64>, heading: f64) -> Self {
        self.spawn_position = position;
        self.spawn_heading = heading;
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> robot_types::Result<()> {
        self.motion.validate()?;
        self.collision.validate()?;
        self.idle.validate()?;
        self.dust.validate()?;
        self.capture.validate()?;

        ensure_positive("expression_rate_hz", self.expression_rate_hz)?;
        ensure_positive("capture_rate_hz", self.capture_rate_hz)?;

        let d = &self.dimensions;
        ensure_positive("dimensions.body_radius", d.body_radius)?;
        ensure_positive("dimensions.head_radius", d.head_radius)?;
        ensure_positive("dimensions.head_height", d.head_height)?;
        if d.body_top <= d.body_bottom {
            return Err(RobotError::invalid_config(format!(
                "dimensions.body_top ({}) must be above body_bottom ({})",
                d.body_top, d.body_bottom
            )));
        }

        if !(self.spawn_position.x.is_finite()
            && self.spawn_position.y.is_finite()
            && self.spawn_heading.is_finite())
        {
            return Err(RobotError::invalid_config("spawn pose must be finite"));
        }
        Ok(())
    }
}
