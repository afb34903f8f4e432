//! Per-frame telemetry reported to observers.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Categorical motion state shown in the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StateLabel {
    /// Neither translating nor turning.
    #[default]
    Idle,
    /// Driving forward.
    Moving,
    /// Driving backward.
    Reversing,
    /// Turning in place.
    Turning,
    /// Driving forward while turning.
    MovingTurning,
    /// Driving backward while turning.
    ReversingTurning,
}

impl StateLabel {
    /// Classify a velocity pair. Magnitudes at or below `threshold` count as stopped.
    #[must_use]
    pub fn classify(velocity: f64, angular_velocity: f64, threshold: f64) -> Self {
        let turning = angular_velocity.abs() > threshold;
        if velocity > threshold {
            if turning { Self::MovingTurning } else { Self::Moving }
        } else if velocity < -threshold {
            if turning { Self::ReversingTurning } else { Self::Reversing }
        } else if turning {
            Self::Turning
        } else {
            Self::Idle
        }
    }

    /// HUD text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Moving => "Moving",
            Self::Reversing => "Reversing",
            Self::Turning => "Turning",
            Self::MovingTurning => "Moving+Turn",
            Self::ReversingTurning => "Reversing+Turn",
        }
    }
}

impl fmt::Display for StateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame of telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TelemetrySample {
    /// `|velocity| / max_speed` as a percentage in `[0, 100]`.
    pub speed_percent: f64,
    /// Motion category.
    pub label: StateLabel,
}

impl TelemetrySample {
    /// Build a sample from raw velocities.
    #[must_use]
    pub fn from_motion(
        velocity: f64,
        angular_velocity: f64,
        max_speed: f64,
        threshold: f64,
    ) -> Self {
        let speed_percent = if max_speed > 0.0 {
            (velocity.abs() / max_speed * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            speed_percent,
            label: StateLabel::classify(velocity, angular_velocity, threshold),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn classify_all_labels() {
        let t = 0.05;
        assert_eq!(StateLabel::classify(0.0, 0.0, t), StateLabel::Idle);
        assert_eq!(StateLabel::classify(1.0, 0.0, t), StateLabel::Moving);
        assert_eq!(StateLabel::classify(-1.0, 0.0, t), StateLabel::Reversing);
        assert_eq!(StateLabel::classify(0.0, 1.0, t), StateLabel::Turning);
        assert_eq!(StateLabel::classify(1.0, -1.0, t), StateLabel::MovingTurning);
        assert_eq!(StateLabel::classify(-1.0, 1.0, t), StateLabel::ReversingTurning);
        assert_eq!(StateLabel::classify(0.04, 0.04, t), StateLabel::Idle);
    }

    #[test]
    fn labels_display_as_hud_text() {
        assert_eq!(StateLabel::MovingTurning.to_string(), "Moving+Turn");
        assert_eq!(StateLabel::ReversingTurning.to_string(), "Reversing+Turn");
    }

    #[test]
    fn speed_percent_is_clamped() {
        let s = TelemetrySample::from_motion(-1.5, 0.0, 3.0, 0.05);
        assert_relative_eq!(s.speed_percent, 50.0);
        let s = TelemetrySample::from_motion(9.0, 0.0, 3.0, 0.05);
        assert_relative_eq!(s.speed_percent, 100.0);
        let s = TelemetrySample::from_motion(1.0, 0.0, 0.0, 0.05);
        assert_relative_eq!(s.speed_percent, 0.0);
    }
}
