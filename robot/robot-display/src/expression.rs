//! LCD face rendering.
//!
//! [`render_expression`] draws one frame of the robot's face into a
//! [`Raster`]. It is a pure function of its inputs: the same expression,
//! accent colour, time and text always produce the same bytes.
//!
//! # Pipeline
//!
//! 1. Shapes are evaluated as signed distance fields in a 256×160 reference
//!    space and accumulated into an antialiased coverage [`Mask`]
//! 2. The mask is box-blurred twice into a glow layer
//! 3. Background, glow and shapes are composited in the accent colour
//!
//! Override text replaces the face entirely and goes through the same glow.
//!
//! # Blinking
//!
//! Every routine that draws open eyes shares one blink phase,
//! `sin(time * BLINK_RATE) > BLINK_THRESHOLD`, so switching expressions never
//! desynchronises the blink.

use nalgebra::Vector2;
use robot_types::{ExpressionId, Rgb};
use tracing::trace;

use crate::font::TextLayout;
use crate::raster::{Mask, Raster};

/// Reference LCD width.
pub const LCD_WIDTH: u32 = 256;
/// Reference LCD height.
pub const LCD_HEIGHT: u32 = 160;
/// Angular rate of the blink phase (rad/s).
pub const BLINK_RATE: f64 = 1.9;
/// Blink while the phase sine exceeds this.
pub const BLINK_THRESHOLD: f64 = 0.985;
/// Eye height multiplier while blinking.
pub const BLINK_SQUASH: f64 = 0.1;
/// Dots in the loading spinner.
pub const LOADING_DOTS: usize = 8;
/// Spinner steps per second.
pub const LOADING_SPEED: f64 = 10.0;

const TEXT_MARGIN: u32 = 8;
const GLOW_RADIUS: usize = 4;
const GLOW_STRENGTH: f32 = 0.85;
const BACKGROUND: Rgb = Rgb::new(0x05, 0x08, 0x0c);
const BACKGROUND_TINT: f64 = 0.07;

/// True while the shared blink phase has the eyes shut.
#[must_use]
pub fn is_blinking(time: f64) -> bool {
    (time * BLINK_RATE).sin() > BLINK_THRESHOLD
}

/// Index of the lit spinner dot at `time`.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn loading_phase(time: f64) -> usize {
    let step = (time * LOADING_SPEED).floor();
    if step.is_finite() {
        (step.rem_euclid(LOADING_DOTS as f64)) as usize
    } else {
        0
    }
}

/// Draw one frame of the face (or `text`, if given) into `raster`.
///
/// The raster may be any size; shapes scale from the reference size and text
/// is laid out against the actual size.
///
/// # Example
///
/// ```
/// use robot_display::{render_expression, Raster, LCD_HEIGHT, LCD_WIDTH};
/// use robot_types::{ExpressionId, Rgb};
///
/// let mut a = Raster::new(LCD_WIDTH, LCD_HEIGHT);
/// let mut b = Raster::new(LCD_WIDTH, LCD_HEIGHT);
/// render_expression(&mut a, ExpressionId::Happy, Rgb::new(0, 229, 255), 1.25, None);
/// render_expression(&mut b, ExpressionId::Happy, Rgb::new(0, 229, 255), 1.25, None);
/// assert_eq!(a, b);
/// ```
pub fn render_expression(
    raster: &mut Raster,
    expression: ExpressionId,
    accent: Rgb,
    time: f64,
    text: Option<&str>,
) {
    let mut mask = Mask::new(raster.width() as usize, raster.height() as usize);

    let layout =
        text.and_then(|t| TextLayout::fit(t, raster.width(), raster.height(), TEXT_MARGIN));
    if let Some(layout) = layout {
        layout.for_each_lit(|x, y| mask.max_at(x as usize, y as usize, 1.0));
    } else {
        let mut canvas = Canvas::new(&mut mask);
        draw_face(&mut canvas, expression, time);
    }

    let glow = mask.box_blur(GLOW_RADIUS).box_blur(GLOW_RADIUS);
    composite(raster, &mask, &glow, accent);
}

/// Off-screen LCD texture with change tracking.
///
/// Each draw bumps the revision and marks the display dirty; the texture
/// uploader calls [`take_dirty`](Self::take_dirty) to learn whether to
/// re-upload.
#[derive(Debug, Clone)]
pub struct ExpressionDisplay {
    raster: Raster,
    revision: u64,
    dirty: bool,
}

impl Default for ExpressionDisplay {
    fn default() -> Self {
        Self::new(LCD_WIDTH, LCD_HEIGHT)
    }
}

impl ExpressionDisplay {
    /// A blank display of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: Raster::new(width, height),
            revision: 0,
            dirty: false,
        }
    }

    /// Current pixels.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Number of draws so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True if drawn since the last [`take_dirty`](Self::take_dirty).
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Redraw.
    pub fn draw(&mut self, expression: ExpressionId, accent: Rgb, time: f64, text: Option<&str>) {
        render_expression(&mut self.raster, expression, accent, time, text);
        self.revision += 1;
        self.dirty = true;
        trace!(
            expression = expression.name(),
            text = text.is_some(),
            revision = self.revision,
            "lcd redrawn"
        );
    }
}

// =============================================================================
// Compositing
// =============================================================================

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn composite(raster: &mut Raster, mask: &Mask, glow: &Mask, accent: Rgb) {
    let bg = BACKGROUND.lerp(accent, BACKGROUND_TINT);
    let bg = [f32::from(bg.r), f32::from(bg.g), f32::from(bg.b)];
    let core = accent.lerp(Rgb::WHITE, 0.25);
    let core = [f32::from(core.r), f32::from(core.g), f32::from(core.b)];
    let tint = [f32::from(accent.r), f32::from(accent.g), f32::from(accent.b)];

    let width = mask.width();
    for (i, px) in raster.pixels_mut().chunks_exact_mut(4).enumerate() {
        let (x, y) = (i % width, i / width);
        let coverage = mask.get(x, y);
        let halo = (glow.get(x, y) * GLOW_STRENGTH).min(1.0);
        for c in 0..3 {
            let lit = (bg[c] + tint[c] * halo).min(255.0);
            let value = lit + (core[c] - lit) * coverage;
            px[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        px[3] = 255;
    }
}

// =============================================================================
// Signed distance canvas
// =============================================================================

type V2 = Vector2<f64>;

fn v(x: f64, y: f64) -> V2 {
    V2::new(x, y)
}

/// Accumulates antialiased SDF shapes, given in reference coordinates, into a mask.
struct Canvas<'a> {
    mask: &'a mut Mask,
    sx: f64,
    sy: f64,
    px_per_unit: f64,
}

impl<'a> Canvas<'a> {
    #[allow(clippy::cast_precision_loss)]
    fn new(mask: &'a mut Mask) -> Self {
        let sx = mask.width() as f64 / f64::from(LCD_WIDTH);
        let sy = mask.height() as f64 / f64::from(LCD_HEIGHT);
        Self {
            mask,
            sx,
            sy,
            px_per_unit: sx.min(sy),
        }
    }

    /// Rasterise `sdf` over the reference-space box `[min, max]` at `intensity`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn fill(&mut self, min: V2, max: V2, intensity: f64, sdf: impl Fn(V2) -> f64) {
        let w = self.mask.width() as f64;
        let h = self.mask.height() as f64;
        let x0 = (min.x * self.sx - 2.0).floor().clamp(0.0, w) as usize;
        let x1 = (max.x * self.sx + 2.0).ceil().clamp(0.0, w) as usize;
        let y0 = (min.y * self.sy - 2.0).floor().clamp(0.0, h) as usize;
        let y1 = (max.y * self.sy + 2.0).ceil().clamp(0.0, h) as usize;

        for py in y0..y1 {
            for px in x0..x1 {
                let p = v((px as f64 + 0.5) / self.sx, (py as f64 + 0.5) / self.sy);
                let d = sdf(p) * self.px_per_unit;
                let coverage = (0.5 - d).clamp(0.0, 1.0) * intensity;
                if coverage > 0.0 {
                    self.mask.max_at(px, py, coverage as f32);
                }
            }
        }
    }

    fn circle(&mut self, c: V2, r: f64) {
        self.fill(c - v(r, r), c + v(r, r), 1.0, |p| (p - c).norm() - r);
    }

    fn dot(&mut self, c: V2, r: f64, intensity: f64) {
        self.fill(c - v(r, r), c + v(r, r), intensity, |p| (p - c).norm() - r);
    }

    fn ring(&mut self, c: V2, r: f64, thickness: f64) {
        let reach = r + thickness;
        self.fill(c - v(reach, reach), c + v(reach, reach), 1.0, |p| {
            ((p - c).norm() - r).abs() - thickness * 0.5
        });
    }

    fn rounded_rect(&mut self, c: V2, half: V2, radius: f64) {
        let radius = radius.min(half.x).min(half.y);
        self.fill(c - half, c + half, 1.0, |p| sd_rounded_box(p - c, half, radius));
    }

    fn capsule(&mut self, a: V2, b: V2, thickness: f64) {
        let r = thickness * 0.5;
        let min = v(a.x.min(b.x) - r, a.y.min(b.y) - r);
        let max = v(a.x.max(b.x) + r, a.y.max(b.y) + r);
        self.fill(min, max, 1.0, |p| sd_segment(p, a, b) - r);
    }

    fn polyline(&mut self, points: &[V2], thickness: f64) {
        for pair in points.windows(2) {
            self.capsule(pair[0], pair[1], thickness);
        }
    }

    /// Arc of `radius` from angle `start` sweeping to `end` (radians, y down).
    fn arc(&mut self, c: V2, radius: f64, start: f64, end: f64, thickness: f64) {
        let reach = radius + thickness;
        let mid = (start + end) * 0.5;
        let half_span = (end - start).abs() * 0.5;
        let a = c + v(start.cos(), start.sin()) * radius;
        let b = c + v(end.cos(), end.sin()) * radius;
        let r = thickness * 0.5;
        self.fill(c - v(reach, reach), c + v(reach, reach), 1.0, |p| {
            let d = p - c;
            let angle = d.y.atan2(d.x);
            let offset = wrap_angle(angle - mid).abs();
            if offset <= half_span {
                (d.norm() - radius).abs() - r
            } else {
                (p - a).norm().min((p - b).norm()) - r
            }
        });
    }

    /// Lower half of a disc (open grin).
    fn half_disc(&mut self, c: V2, r: f64) {
        self.fill(c - v(r, 0.0), c + v(r, r), 1.0, |p| {
            ((p - c).norm() - r).max(c.y - p.y)
        });
    }

    fn heart(&mut self, c: V2, size: f64) {
        let lobe = size * 0.52;
        let left = c + v(-size * 0.45, -size * 0.2);
        let right = c + v(size * 0.45, -size * 0.2);
        let tip = c + v(0.0, size * 0.15);
        let half = v(size * 0.62, size * 0.62);
        self.fill(c - v(size * 1.1, size * 1.0), c + v(size * 1.1, size * 1.1), 1.0, |p| {
            let lobes = ((p - left).norm() - lobe).min((p - right).norm() - lobe);
            // Square rotated 45° forms the point
            let q = p - tip;
            let rotated = v(q.x + q.y, q.y - q.x) * std::f64::consts::FRAC_1_SQRT_2;
            lobes.min(sd_rounded_box(rotated, half, 0.0))
        });
    }

    fn sparkle(&mut self, c: V2, size: f64) {
        let thin = size * 0.22;
        self.fill(c - v(size, size), c + v(size, size), 1.0, |p| {
            let q = p - c;
            let vertical = sd_diamond(q, v(thin, size));
            let horizontal = sd_diamond(q, v(size, thin));
            vertical.min(horizontal)
        });
    }
}

fn sd_rounded_box(p: V2, half: V2, radius: f64) -> f64 {
    let q = v(p.x.abs() - half.x + radius, p.y.abs() - half.y + radius);
    let outside = v(q.x.max(0.0), q.y.max(0.0)).norm();
    outside + q.x.max(q.y).min(0.0) - radius
}

fn sd_segment(p: V2, a: V2, b: V2) -> f64 {
    let pa = p - a;
    let ba = b - a;
    let len2 = ba.norm_squared();
    let t = if len2 > 0.0 { (pa.dot(&ba) / len2).clamp(0.0, 1.0) } else { 0.0 };
    (pa - ba * t).norm()
}

/// Approximate distance to a rhombus with half-diagonals `half`.
fn sd_diamond(p: V2, half: V2) -> f64 {
    let q = v(p.x.abs() / half.x, p.y.abs() / half.y);
    (q.x + q.y - 1.0) * half.x.min(half.y) * std::f64::consts::FRAC_1_SQRT_2
}

fn wrap_angle(a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (a + PI).rem_euclid(TAU) - PI
}

// =============================================================================
// Faces
// =============================================================================

const LEFT_EYE: (f64, f64) = (76.0, 64.0);
const RIGHT_EYE: (f64, f64) = (180.0, 64.0);
const EYE_HALF: (f64, f64) = (22.0, 28.0);
const EYE_RADIUS: f64 = 12.0;
const MOUTH_Y: f64 = 122.0;
const STROKE: f64 = 7.0;

fn left() -> V2 {
    v(LEFT_EYE.0, LEFT_EYE.1)
}

fn right() -> V2 {
    v(RIGHT_EYE.0, RIGHT_EYE.1)
}

/// Open eye with the shared blink applied to its height.
fn eye(canvas: &mut Canvas<'_>, c: V2, height_scale: f64, time: f64) {
    let blink = if is_blinking(time) { BLINK_SQUASH } else { 1.0 };
    let half = v(EYE_HALF.0, (EYE_HALF.1 * height_scale * blink).max(1.5));
    canvas.rounded_rect(c, half, EYE_RADIUS);
}

fn round_eye(canvas: &mut Canvas<'_>, c: V2, r: f64, time: f64) {
    if is_blinking(time) {
        canvas.rounded_rect(c, v(r, (r * BLINK_SQUASH).max(1.5)), r * BLINK_SQUASH);
    } else {
        canvas.circle(c, r);
    }
}

fn closed_eye(canvas: &mut Canvas<'_>, c: V2) {
    canvas.capsule(c + v(-EYE_HALF.0, 4.0), c + v(EYE_HALF.0, 4.0), STROKE);
}

fn smile(canvas: &mut Canvas<'_>, width: f64) {
    use std::f64::consts::PI;
    canvas.arc(v(128.0, MOUTH_Y - width * 0.8), width, PI * 0.2, PI * 0.8, STROKE);
}

#[allow(clippy::cast_precision_loss)]
fn draw_face(canvas: &mut Canvas<'_>, expression: ExpressionId, time: f64) {
    use std::f64::consts::PI;
    match expression {
        ExpressionId::Neutral => {
            eye(canvas, left(), 1.0, time);
            eye(canvas, right(), 1.0, time);
            canvas.capsule(v(108.0, MOUTH_Y), v(148.0, MOUTH_Y), STROKE);
        }
        ExpressionId::Happy => {
            // Closed, arched "^ ^" eyes
            canvas.arc(left() + v(0.0, 12.0), 24.0, PI * 1.15, PI * 1.85, STROKE + 2.0);
            canvas.arc(right() + v(0.0, 12.0), 24.0, PI * 1.15, PI * 1.85, STROKE + 2.0);
            smile(canvas, 30.0);
        }
        ExpressionId::Thinking => {
            let glance = v(10.0, -8.0);
            eye(canvas, left() + glance, 1.0, time);
            eye(canvas, right() + glance, 0.45, time);
            canvas.capsule(v(112.0, MOUTH_Y), v(140.0, MOUTH_Y - 4.0), STROKE);
            canvas.circle(v(176.0, 128.0), 3.5);
            canvas.circle(v(192.0, 118.0), 5.0);
            canvas.circle(v(212.0, 104.0), 7.0);
        }
        ExpressionId::Surprised => {
            round_eye(canvas, left(), 26.0, time);
            round_eye(canvas, right(), 26.0, time);
            canvas.ring(v(128.0, MOUTH_Y + 4.0), 11.0, 6.0);
        }
        ExpressionId::Love => {
            canvas.heart(left(), 26.0);
            canvas.heart(right(), 26.0);
            smile(canvas, 26.0);
        }
        ExpressionId::Loading => {
            let lit = loading_phase(time);
            for i in 0..LOADING_DOTS {
                let angle = i as f64 / LOADING_DOTS as f64 * 2.0 * PI - PI * 0.5;
                let c = v(128.0, 80.0) + v(angle.cos(), angle.sin()) * 40.0;
                // Dots trailing the lit one fade out
                let behind = (lit + LOADING_DOTS - i) % LOADING_DOTS;
                let intensity = 1.0 - behind as f64 / LOADING_DOTS as f64 * 0.8;
                let r = if behind == 0 { 9.0 } else { 6.0 };
                canvas.dot(c, r, intensity);
            }
        }
        ExpressionId::Sad => {
            let droop = v(0.0, 10.0);
            eye(canvas, left() + droop, 0.7, time);
            eye(canvas, right() + droop, 0.7, time);
            canvas.capsule(v(52.0, 30.0), v(96.0, 20.0), 5.0);
            canvas.capsule(v(160.0, 20.0), v(204.0, 30.0), 5.0);
            canvas.arc(v(128.0, MOUTH_Y + 22.0), 24.0, PI * 1.2, PI * 1.8, STROKE);
        }
        ExpressionId::Angry => {
            eye(canvas, left() + v(0.0, 6.0), 0.75, time);
            eye(canvas, right() + v(0.0, 6.0), 0.75, time);
            canvas.capsule(v(50.0, 22.0), v(100.0, 36.0), 8.0);
            canvas.capsule(v(156.0, 36.0), v(206.0, 22.0), 8.0);
            canvas.capsule(v(114.0, MOUTH_Y + 2.0), v(142.0, MOUTH_Y + 2.0), STROKE + 1.0);
        }
        ExpressionId::Wink => {
            eye(canvas, left(), 1.0, time);
            closed_eye(canvas, right());
            smile(canvas, 28.0);
        }
        ExpressionId::Excited => {
            canvas.sparkle(left(), 30.0);
            canvas.sparkle(right(), 30.0);
            canvas.half_disc(v(128.0, MOUTH_Y - 10.0), 20.0);
        }
        ExpressionId::Sleepy => {
            let lid = v(0.0, 14.0);
            eye(canvas, left() + lid, 0.22, time);
            eye(canvas, right() + lid, 0.22, time);
            canvas.circle(v(128.0, MOUTH_Y), 6.0);
            draw_z(canvas, v(204.0, 28.0), 16.0);
            draw_z(canvas, v(228.0, 12.0), 10.0);
        }
        ExpressionId::Confused => {
            eye(canvas, left(), 1.0, time);
            round_eye(canvas, right() + v(0.0, 6.0), 13.0, time);
            let wave: Vec<V2> = (0..=12)
                .map(|i| {
                    let t = f64::from(i) / 12.0;
                    v(100.0 + 56.0 * t, MOUTH_Y + 5.0 * (t * 3.0 * PI).sin())
                })
                .collect();
            canvas.polyline(&wave, STROKE - 1.0);
        }
    }
}

fn draw_z(canvas: &mut Canvas<'_>, top_left: V2, size: f64) {
    let tl = top_left;
    let tr = tl + v(size, 0.0);
    let bl = tl + v(0.0, size);
    let br = tl + v(size, size);
    canvas.polyline(&[tl, tr, bl, br], (size * 0.22).max(2.5));
}
