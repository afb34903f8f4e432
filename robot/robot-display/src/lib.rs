//! Pixels for the warehouse robot: the LCD face and the two camera feeds.
//!
//! - [`render_expression`] / [`ExpressionDisplay`] - The animated face drawn
//!   into a 256×160 [`Raster`], with glow and a bitmap-font text override
//! - [`CapturePipeline`] - POV and security camera rigs that render into
//!   off-screen [`RenderTarget`]s and copy the result, flipped and
//!   post-processed, into [`DisplaySurfaces`]
//! - [`SceneRenderer`] - The rendering backend seam, with the
//!   [`RaycastRenderer`] software implementation
//!
//! # Layer 0
//!
//! Everything is CPU-side and deterministic. A GPU backend plugs in by
//! implementing [`SceneRenderer`]; the pipeline only needs a render target it
//! can read back.
//!
//! # Pixel layouts
//!
//! | Buffer | Rows |
//! |---|---|
//! | [`RenderTarget`] | bottom-up (GPU readback) |
//! | [`Raster`] (surfaces, LCD) | top-down |
//!
//! [`copy_flipped`] converts between the two.
//!
//! # Example
//!
//! ```
//! use robot_display::{ExpressionDisplay, LCD_HEIGHT, LCD_WIDTH};
//! use robot_types::{ExpressionId, Rgb};
//!
//! let mut lcd = ExpressionDisplay::default();
//! lcd.draw(ExpressionId::Happy, Rgb::new(0, 229, 255), 0.0, None);
//! assert!(lcd.take_dirty());
//! assert_eq!(lcd.raster().width(), LCD_WIDTH);
//! assert_eq!(lcd.raster().height(), LCD_HEIGHT);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::similar_names,             // dx/dz, sx/sy pairs are clearer as-is
    clippy::many_single_char_names,    // x, y, t, u, v in geometry code
)]

mod capture;
mod expression;
pub mod font;
mod postprocess;
mod raster;
mod raycast;
mod scene;
mod surface;

pub use capture::{
    CameraKind, CameraRig, CaptureOutcome, CaptureParams, CapturePipeline, RenderTarget, SkipReason,
    copy_flipped,
};
pub use expression::{
    BLINK_RATE, BLINK_SQUASH, BLINK_THRESHOLD, ExpressionDisplay, LCD_HEIGHT, LCD_WIDTH,
    LOADING_DOTS, LOADING_SPEED, is_blinking, loading_phase, render_expression,
};
pub use postprocess::{PostProcess, Tint};
pub use raster::{BYTES_PER_PIXEL, Mask, Raster};
pub use raycast::{CameraView, RaycastRenderer, RaycastSettings, Ray, SceneRenderer};
pub use scene::{RobotDimensions, RobotHidden, RobotModel, Scene};
pub use surface::{DisplaySurface, DisplaySurfaces, SurfaceHandle};
