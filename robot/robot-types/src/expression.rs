//! Facial expression identifiers and display state.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RobotError;

/// One of the twelve LCD face expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExpressionId {
    /// Resting face.
    #[default]
    Neutral,
    /// Smiling, eyes arched.
    Happy,
    /// One eye squinted, thought dots.
    Thinking,
    /// Wide eyes, round mouth.
    Surprised,
    /// Heart eyes.
    Love,
    /// Rotating dot spinner.
    Loading,
    /// Drooping eyes, frown.
    Sad,
    /// Slanted brows, tight mouth.
    Angry,
    /// One eye closed.
    Wink,
    /// Sparkling eyes, open grin.
    Excited,
    /// Half-closed eyes, Zs.
    Sleepy,
    /// Mismatched eyes, wavy mouth.
    Confused,
}

impl ExpressionId {
    /// All expressions in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Neutral,
        Self::Happy,
        Self::Thinking,
        Self::Surprised,
        Self::Love,
        Self::Loading,
        Self::Sad,
        Self::Angry,
        Self::Wink,
        Self::Excited,
        Self::Sleepy,
        Self::Confused,
    ];

    /// Lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Thinking => "thinking",
            Self::Surprised => "surprised",
            Self::Love => "love",
            Self::Loading => "loading",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Wink => "wink",
            Self::Excited => "excited",
            Self::Sleepy => "sleepy",
            Self::Confused => "confused",
        }
    }
}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExpressionId {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|e| e.name() == lower)
            .ok_or_else(|| RobotError::UnknownExpression(s.to_string()))
    }
}

/// Text that temporarily replaces the face.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransientText {
    /// Text to show.
    pub text: String,
    /// Simulation time (seconds) at which the text lapses.
    pub expires_at: f64,
}

/// What the LCD shows: an expression, optionally overridden by text.
///
/// # Example
///
/// ```
/// use robot_types::{ExpressionId, ExpressionState};
///
/// let mut state = ExpressionState::new(ExpressionId::Happy);
/// state.show_text("HELLO", 10.0, 2.0);
///
/// assert_eq!(state.active_text(11.0), Some("HELLO"));
/// assert_eq!(state.active_text(12.0), None);
/// assert_eq!(state.expression(), ExpressionId::Happy);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExpressionState {
    expression: ExpressionId,
    text: Option<TransientText>,
}

impl ExpressionState {
    /// Start with `expression` and no text.
    #[must_use]
    pub const fn new(expression: ExpressionId) -> Self {
        Self {
            expression,
            text: None,
        }
    }

    /// Current expression (shown whenever no text is active).
    #[must_use]
    pub const fn expression(&self) -> ExpressionId {
        self.expression
    }

    /// Replace the expression. Active text keeps priority until it lapses.
    pub fn set_expression(&mut self, expression: ExpressionId) {
        self.expression = expression;
    }

    /// Show `text` from `now` for `duration` seconds.
    pub fn show_text(&mut self, text: impl Into<String>, now: f64, duration: f64) {
        self.text = Some(TransientText {
            text: text.into(),
            expires_at: now + duration.max(0.0),
        });
    }

    /// Drop any text immediately.
    pub fn clear_text(&mut self) {
        self.text = None;
    }

    /// The text to draw at `now`, if it has not lapsed.
    #[must_use]
    pub fn active_text(&self, now: f64) -> Option<&str> {
        self.text
            .as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.text.as_str())
    }

    /// Forget text whose timer has lapsed. Returns true if something expired.
    pub fn expire(&mut self, now: f64) -> bool {
        if self.text.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.text = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn twelve_distinct_names() {
        let mut names: Vec<_> = ExpressionId::ALL.iter().map(|e| e.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Happy".parse::<ExpressionId>().unwrap(), ExpressionId::Happy);
        assert_eq!("SLEEPY".parse::<ExpressionId>().unwrap(), ExpressionId::Sleepy);
        assert!("grumpy".parse::<ExpressionId>().is_err());
    }

    #[test]
    fn text_overrides_until_expiry_then_reverts() {
        let mut state = ExpressionState::new(ExpressionId::Sad);
        state.show_text("BRB", 1.0, 0.5);

        assert_eq!(state.active_text(1.2), Some("BRB"));
        assert!(!state.expire(1.2));

        assert_eq!(state.active_text(1.5), None);
        assert!(state.expire(1.5));
        assert_eq!(state.active_text(1.2), None);
        assert_eq!(state.expression(), ExpressionId::Sad);
    }

    #[test]
    fn newer_text_replaces_older() {
        let mut state = ExpressionState::default();
        state.show_text("ONE", 0.0, 5.0);
        state.show_text("TWO", 1.0, 1.0);
        assert_eq!(state.active_text(1.5), Some("TWO"));
        assert_eq!(state.active_text(2.5), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_uses_lower_case_names() {
        for id in ExpressionId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.name()));
        }
        let state: ExpressionState =
            serde_json::from_str(r#"{"expression":"wink","text":null}"#).unwrap();
        assert_eq!(state.expression(), ExpressionId::Wink);
    }
}
