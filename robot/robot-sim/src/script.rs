//! Scripted overrides of head, face and LCD text.
//!
//! A [`ScriptedSequence`] is a list of [`Keyframe`]s on a local clock that
//! starts when the sequence begins. While it runs, the simulation's
//! [`ControlAuthority`] is `Scripted` and user head input, expression changes
//! and text requests are ignored. Drive input is unaffected.
//!
//! Head yaw is interpolated linearly between the keyframes that set it. The
//! expression and text hold from the keyframe that last set them.

use robot_types::{ExpressionId, RobotError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One point in a sequence. Unset fields leave the channel as it was.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Keyframe {
    /// Seconds since the sequence started.
    pub at: f64,
    /// Head yaw relative to the body (radians).
    pub head_yaw: Option<f64>,
    /// Face to show.
    pub expression: Option<ExpressionId>,
    /// LCD text; an empty string clears it.
    pub text: Option<String>,
}

impl Keyframe {
    /// An empty keyframe at `at` seconds.
    #[must_use]
    pub fn at(at: f64) -> Self {
        Self {
            at,
            ..Self::default()
        }
    }

    /// Set the head yaw.
    #[must_use]
    pub fn head_yaw(mut self, yaw: f64) -> Self {
        self.head_yaw = Some(yaw);
        self
    }

    /// Set the expression.
    #[must_use]
    pub fn expression(mut self, expression: ExpressionId) -> Self {
        self.expression = Some(expression);
        self
    }

    /// Set the LCD text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A validated, time-ordered list of keyframes.
///
/// # Example
///
/// ```
/// use robot_sim::{Keyframe, ScriptedSequence};
/// use robot_types::ExpressionId;
///
/// let look_around = ScriptedSequence::new(vec![
///     Keyframe::at(0.0).head_yaw(0.0).expression(ExpressionId::Thinking),
///     Keyframe::at(1.0).head_yaw(0.8),
///     Keyframe::at(2.0).head_yaw(-0.8).text("hmm"),
///     Keyframe::at(3.0).head_yaw(0.0).text(""),
/// ])
/// .unwrap();
///
/// assert_eq!(look_around.duration(), 3.0);
/// assert!((look_around.head_yaw_at(0.5).unwrap() - 0.4).abs() < 1e-12);
/// assert_eq!(look_around.text_at(2.5), Some("hmm"));
/// assert_eq!(look_around.text_at(3.0), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScriptedSequence {
    keyframes: Vec<Keyframe>,
}

impl ScriptedSequence {
    /// Sort and validate keyframes.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::EmptySequence`] for no keyframes and
    /// [`RobotError::InvalidConfig`] for a negative or non-finite time or yaw.
    pub fn new(mut keyframes: Vec<Keyframe>) -> robot_types::Result<Self> {
        if keyframes.is_empty() {
            return Err(RobotError::EmptySequence);
        }
        for k in &keyframes {
            if !(k.at.is_finite() && k.at >= 0.0) {
                return Err(RobotError::invalid_config(format!(
                    "keyframe time must be non-negative and finite, got {}",
                    k.at
                )));
            }
            if k.head_yaw.is_some_and(|y| !y.is_finite()) {
                return Err(RobotError::invalid_config("keyframe head yaw must be finite"));
            }
        }
        keyframes.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(Self { keyframes })
    }

    /// Keyframes in time order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.at)
    }

    /// Head yaw at local time `t`, or `None` if no keyframe sets one.
    ///
    /// Holds the first value before it and the last value after it.
    #[must_use]
    pub fn head_yaw_at(&self, t: f64) -> Option<f64> {
        let mut before: Option<(f64, f64)> = None;
        for k in &self.keyframes {
            let Some(yaw) = k.head_yaw else { continue };
            if k.at > t {
                return Some(match before {
                    Some((t0, y0)) if k.at > t0 => y0 + (yaw - y0) * (t - t0) / (k.at - t0),
                    Some((_, y0)) => y0,
                    None => yaw,
                });
            }
            before = Some((k.at, yaw));
        }
        before.map(|(_, y)| y)
    }

    /// Expression set by the latest keyframe at or before `t`.
    #[must_use]
    pub fn expression_at(&self, t: f64) -> Option<ExpressionId> {
        self.latest(t, |k| k.expression)
    }

    /// Text set by the latest keyframe at or before `t`; `None` when that text
    /// is empty or nothing has set text yet.
    #[must_use]
    pub fn text_at(&self, t: f64) -> Option<&str> {
        self.latest(t, |k| k.text.as_deref())
            .filter(|text| !text.is_empty())
    }

    fn latest<'s, T>(&'s self, t: f64, field: impl Fn(&'s Keyframe) -> Option<T>) -> Option<T> {
        self.keyframes
            .iter()
            .take_while(|k| k.at <= t)
            .filter_map(field)
            .last()
    }
}

/// What a running script asks for at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptFrame<'a> {
    /// Head yaw, or the yaw saved when the script began if no keyframe sets one.
    pub head_yaw: f64,
    /// Face.
    pub expression: ExpressionId,
    /// LCD text, if any.
    pub text: Option<&'a str>,
}

/// A sequence in progress, with the state it displaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveScript {
    sequence: ScriptedSequence,
    started_at: f64,
    saved_head_yaw: f64,
    saved_expression: ExpressionId,
}

impl ActiveScript {
    /// Start `sequence` at `now`, remembering what to restore.
    #[must_use]
    pub fn begin(
        sequence: ScriptedSequence,
        now: f64,
        saved_head_yaw: f64,
        saved_expression: ExpressionId,
    ) -> Self {
        Self {
            sequence,
            started_at: now,
            saved_head_yaw,
            saved_expression,
        }
    }

    /// The sequence.
    #[must_use]
    pub fn sequence(&self) -> &ScriptedSequence {
        &self.sequence
    }

    /// Start time.
    #[must_use]
    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// Head yaw to restore.
    #[must_use]
    pub fn saved_head_yaw(&self) -> f64 {
        self.saved_head_yaw
    }

    /// Expression to restore.
    #[must_use]
    pub fn saved_expression(&self) -> ExpressionId {
        self.saved_expression
    }

    /// Local time at `now`, never negative.
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.started_at).max(0.0)
    }

    /// True once `now` is past the last keyframe.
    #[must_use]
    pub fn is_finished(&self, now: f64) -> bool {
        self.elapsed(now) > self.sequence.duration()
    }

    /// Sample every channel at `now`.
    #[must_use]
    pub fn sample(&self, now: f64) -> ScriptFrame<'_> {
        let t = self.elapsed(now);
        ScriptFrame {
            head_yaw: self.sequence.head_yaw_at(t).unwrap_or(self.saved_head_yaw),
            expression: self.sequence.expression_at(t).unwrap_or(self.saved_expression),
            text: self.sequence.text_at(t),
        }
    }
}

/// Who owns the head, face and LCD text.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControlAuthority {
    /// User input and collaborator requests.
    #[default]
    UserInput,
    /// A running script.
    Scripted(ActiveScript),
}

impl ControlAuthority {
    /// True while a script runs.
    #[must_use]
    pub fn is_scripted(&self) -> bool {
        matches!(self, Self::Scripted(_))
    }

    /// The running script, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ActiveScript> {
        match self {
            Self::Scripted(script) => Some(script),
            Self::UserInput => None,
        }
    }
}
