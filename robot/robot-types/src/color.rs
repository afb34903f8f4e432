//! Colour and appearance types.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RobotError;

/// 8-bit RGB colour.
///
/// # Example
///
/// ```
/// use robot_types::Rgb;
///
/// let cyan: Rgb = "#00e5ff".parse().unwrap();
/// assert_eq!(cyan, Rgb::new(0x00, 0xe5, 0xff));
/// assert_eq!(cyan.to_string(), "#00e5ff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a colour from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidColor`] if the string is not six hex digits.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RobotError::InvalidColor(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| RobotError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels as linear `[0, 1]` floats.
    #[must_use]
    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    /// Build a colour from `[0, 1]` floats, clamping out-of-range values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_unit(rgb: [f64; 3]) -> Self {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(q(rgb[0]), q(rgb[1]), q(rgb[2]))
    }

    /// Scale every channel by `factor` (clamped).
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        let [r, g, b] = self.to_unit();
        Self::from_unit([r * factor, g * factor, b * factor])
    }

    /// Linear interpolation toward `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let a = self.to_unit();
        let b = other.to_unit();
        let t = t.clamp(0.0, 1.0);
        Self::from_unit([
            a[0] + (b[0] - a[0]) * t,
            a[1] + (b[1] - a[1]) * t,
            a[2] + (b[2] - a[2]) * t,
        ])
    }
}

impl FromStr for Rgb {
    type Err = RobotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Externally supplied robot colours.
///
/// May change at any time; consumers read it again on each draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Appearance {
    /// LCD face / accent colour.
    pub accent: Rgb,
    /// Body shell colour.
    pub body: Rgb,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            accent: Rgb::new(0x00, 0xe5, 0xff),
            body: Rgb::new(0xe8, 0xe8, 0xee),
        }
    }
}
