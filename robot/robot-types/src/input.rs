//! Control input flags.
//!
//! [`InputState`] is a plain `Copy` value: six independent booleans. The
//! simulation snapshots it once per frame; collaborators write it through a
//! shared handle owned by `robot-sim`.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RobotError;

/// One named control flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum InputFlag {
    /// Drive forward.
    Forward,
    /// Drive backward.
    Backward,
    /// Turn left (counter-clockwise seen from above).
    TurnLeft,
    /// Turn right.
    TurnRight,
    /// Turn the head left.
    HeadLeft,
    /// Turn the head right.
    HeadRight,
}

impl InputFlag {
    /// All flags in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Forward,
        Self::Backward,
        Self::TurnLeft,
        Self::TurnRight,
        Self::HeadLeft,
        Self::HeadRight,
    ];

    /// Wire name used by string-typed collaborators (UI buttons, voice commands).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::TurnLeft => "turnLeft",
            Self::TurnRight => "turnRight",
            Self::HeadLeft => "headLeft",
            Self::HeadRight => "headRight",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for InputFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputFlag {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.name() == s)
            .ok_or_else(|| RobotError::UnknownInputFlag(s.to_string()))
    }
}

/// Snapshot of all control flags.
///
/// # Example
///
/// ```
/// use robot_types::{InputFlag, InputState};
///
/// let input = InputState::default()
///     .with(InputFlag::Forward, true)
///     .with(InputFlag::TurnLeft, true);
///
/// assert!(input.forward());
/// assert!(input.turn_left());
/// assert!(!input.is_idle());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputState {
    bits: u8,
}

impl InputState {
    /// No flags set.
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Read one flag.
    #[must_use]
    pub const fn get(self, flag: InputFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    /// Write one flag.
    pub fn set(&mut self, flag: InputFlag, on: bool) {
        if on {
            self.bits |= flag.bit();
        } else {
            self.bits &= !flag.bit();
        }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, flag: InputFlag, on: bool) -> Self {
        self.set(flag, on);
        self
    }

    /// Forward flag.
    #[must_use]
    pub const fn forward(self) -> bool {
        self.get(InputFlag::Forward)
    }

    /// Backward flag.
    #[must_use]
    pub const fn backward(self) -> bool {
        self.get(InputFlag::Backward)
    }

    /// Turn-left flag.
    #[must_use]
    pub const fn turn_left(self) -> bool {
        self.get(InputFlag::TurnLeft)
    }

    /// Turn-right flag.
    #[must_use]
    pub const fn turn_right(self) -> bool {
        self.get(InputFlag::TurnRight)
    }

    /// Head-left flag.
    #[must_use]
    pub const fn head_left(self) -> bool {
        self.get(InputFlag::HeadLeft)
    }

    /// Head-right flag.
    #[must_use]
    pub const fn head_right(self) -> bool {
        self.get(InputFlag::HeadRight)
    }

    /// True if either head flag is held.
    #[must_use]
    pub const fn head_active(self) -> bool {
        self.head_left() || self.head_right()
    }

    /// True if no flag is held.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        self.bits == 0
    }

    /// Iterate over the flags currently held.
    pub fn active(self) -> impl Iterator<Item = InputFlag> {
        InputFlag::ALL.into_iter().filter(move |f| self.get(*f))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_independent() {
        let mut input = InputState::none();
        input.set(InputFlag::Forward, true);
        input.set(InputFlag::TurnRight, true);
        input.set(InputFlag::HeadLeft, true);

        assert!(input.forward());
        assert!(input.turn_right());
        assert!(input.head_left());
        assert!(!input.backward());
        assert!(!input.turn_left());
        assert!(!input.head_right());

        input.set(InputFlag::Forward, false);
        assert!(!input.forward());
        assert!(input.turn_right());
    }

    #[test]
    fn names_round_trip() {
        for flag in InputFlag::ALL {
            assert_eq!(flag.name().parse::<InputFlag>().unwrap(), flag);
        }
        assert!("jump".parse::<InputFlag>().is_err());
        assert!("Forward".parse::<InputFlag>().is_err());
    }

    #[test]
    fn active_lists_held_flags() {
        let input = InputState::none()
            .with(InputFlag::Backward, true)
            .with(InputFlag::HeadRight, true);
        let held: Vec<_> = input.active().collect();
        assert_eq!(held, vec![InputFlag::Backward, InputFlag::HeadRight]);
        assert!(input.head_active());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_names_match_wire_names() {
        for flag in InputFlag::ALL {
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.name()));
        }
    }
}
