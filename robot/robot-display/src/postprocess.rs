//! Per-camera screen effects applied after a capture is copied to its surface.
//!
//! Effects read only the pixels of the current capture, so nothing
//! accumulates between frames.

use robot_types::Rgb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// Colour treatment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tint {
    /// No tint.
    None,
    /// Add `color * amount` (a brightening wash).
    Additive {
        /// Wash colour.
        color: Rgb,
        /// Strength in `[0, 1]`.
        amount: f32,
    },
    /// Multiply by `color`.
    Multiply(Rgb),
}

/// Screen-space effects for one camera.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PostProcess {
    /// Colour treatment.
    pub tint: Tint,
    /// Darken every `scanline_period`-th row; 0 disables scanlines.
    pub scanline_period: u32,
    /// Brightness lost on a scanline row, in `[0, 1]`.
    pub scanline_strength: f32,
    /// Corner darkening of the radial vignette, in `[0, 1]`.
    pub vignette: f32,
}

impl Default for PostProcess {
    fn default() -> Self {
        Self::none()
    }
}

impl PostProcess {
    /// Pass-through.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            tint: Tint::None,
            scanline_period: 0,
            scanline_strength: 0.0,
            vignette: 0.0,
        }
    }

    /// Robot POV look: light wash, sparse scanlines, soft vignette.
    #[must_use]
    pub const fn pov() -> Self {
        Self {
            tint: Tint::Additive {
                color: Rgb::new(0x60, 0x90, 0xa0),
                amount: 0.12,
            },
            scanline_period: 4,
            scanline_strength: 0.18,
            vignette: 0.35,
        }
    }

    /// Security camera look: warm tint, dense scanlines, heavy vignette.
    #[must_use]
    pub const fn security() -> Self {
        Self {
            tint: Tint::Multiply(Rgb::new(0xff, 0xe6, 0xb8)),
            scanline_period: 2,
            scanline_strength: 0.25,
            vignette: 0.6,
        }
    }

    /// Apply the effects in place.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn apply(&self, raster: &mut Raster) {
        let cx = raster.width() as f32 * 0.5;
        let cy = raster.height() as f32 * 0.5;
        let max_r2 = (cx * cx + cy * cy).max(f32::EPSILON);

        let (add, mul) = match self.tint {
            Tint::None => ([0.0; 3], [1.0; 3]),
            Tint::Additive { color, amount } => (
                [
                    f32::from(color.r) * amount,
                    f32::from(color.g) * amount,
                    f32::from(color.b) * amount,
                ],
                [1.0; 3],
            ),
            Tint::Multiply(color) => (
                [0.0; 3],
                [
                    f32::from(color.r) / 255.0,
                    f32::from(color.g) / 255.0,
                    f32::from(color.b) / 255.0,
                ],
            ),
        };
        let period = self.scanline_period;
        let scan = 1.0 - self.scanline_strength.clamp(0.0, 1.0);
        let vignette = self.vignette.clamp(0.0, 1.0);

        raster.for_each_pixel_mut(|x, y, px| {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let mut gain = 1.0 - vignette * ((dx * dx + dy * dy) / max_r2);
            if period > 0 && y % period == 0 {
                gain *= scan;
            }
            for c in 0..3 {
                let value = (f32::from(px[c]) * mul[c] + add[c]) * gain;
                px[c] = value.round().clamp(0.0, 255.0) as u8;
            }
        });
    }
}
