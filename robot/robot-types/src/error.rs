//! Error types for robot simulation operations.

use thiserror::Error;

/// Errors that can occur while configuring or driving the robot simulation.
///
/// None of these are raised from the per-frame path: the integrator, the
/// collision resolver and the capture pipeline never fail. Errors come from
/// configuration, from string-typed collaborator input, and from competing
/// scripted overrides.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RobotError {
    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// A colour string could not be parsed.
    #[error("invalid colour: {0:?} (expected #rrggbb)")]
    InvalidColor(String),

    /// An input flag name is not one of the known flags.
    #[error("unknown input flag: {0:?}")]
    UnknownInputFlag(String),

    /// An expression name is not one of the known expressions.
    #[error("unknown expression: {0:?}")]
    UnknownExpression(String),

    /// A scripted override is already running.
    #[error("a scripted override is already active")]
    OverrideActive,

    /// A scripted sequence has no keyframes.
    #[error("scripted sequence has no keyframes")]
    EmptySequence,
}

impl RobotError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this error was caused by a competing override.
    #[must_use]
    pub fn is_override_conflict(&self) -> bool {
        matches!(self, Self::OverrideActive)
    }
}

/// Require a strictly positive, finite parameter.
///
/// Shared by the `validate()` methods of every parameter struct in the
/// workspace.
///
/// # Errors
///
/// Returns [`RobotError::InvalidConfig`] naming `name` if the check fails.
pub fn ensure_positive(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RobotError::invalid_config(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

/// Require a non-negative, finite parameter.
///
/// # Errors
///
/// Returns [`RobotError::InvalidConfig`] naming `name` if the check fails.
pub fn ensure_non_negative(name: &str, value: f64) -> crate::Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RobotError::invalid_config(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RobotError::invalid_config("max_speed must be positive");
        assert!(err.to_string().contains("max_speed"));

        let err = RobotError::InvalidColor("#zzz".to_string());
        assert!(err.to_string().contains("#zzz"));

        let err = RobotError::UnknownInputFlag("jump".to_string());
        assert!(err.to_string().contains("jump"));
    }

    #[test]
    fn test_error_predicates() {
        let err = RobotError::invalid_config("bad");
        assert!(err.is_config_error());
        assert!(!err.is_override_conflict());

        let err = RobotError::OverrideActive;
        assert!(err.is_override_conflict());
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_ensure_helpers() {
        assert!(ensure_positive("rate", 1.0).is_ok());
        assert!(ensure_positive("rate", 0.0).is_err());
        assert!(ensure_positive("rate", f64::NAN).is_err());
        assert!(ensure_non_negative("margin", 0.0).is_ok());
        assert!(ensure_non_negative("margin", -0.1).is_err());
        assert!(ensure_non_negative("margin", f64::INFINITY).is_err());
    }
}
