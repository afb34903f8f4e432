//! CPU pixel buffers.
//!
//! [`Raster`] is an RGBA8 image with rows stored top-down, the layout every
//! 2D display surface and the LCD texture use. [`Mask`] is a single-channel
//! `f32` coverage buffer used to build shapes and their glow before they are
//! composited into a raster.

use robot_types::Rgb;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// RGBA8 image, rows top-down.
///
/// # Example
///
/// ```
/// use robot_display::Raster;
/// use robot_types::Rgb;
///
/// let mut raster = Raster::new(4, 2);
/// raster.fill(Rgb::new(10, 20, 30));
/// raster.put(3, 1, [255, 0, 0, 255]);
///
/// assert_eq!(raster.get(0, 0), Some([10, 20, 30, 255]));
/// assert_eq!(raster.get(3, 1), Some([255, 0, 0, 255]));
/// assert_eq!(raster.get(4, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// A transparent-black raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; byte_len(width, height)],
        }
    }

    /// A raster filled with an opaque colour.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut raster = Self::new(width, height);
        raster.fill(color);
        raster
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw RGBA bytes.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consume into raw RGBA bytes.
    #[must_use]
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
    }

    /// Read one pixel; `None` outside the raster.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + BYTES_PER_PIXEL]);
        Some(px)
    }

    /// Write one pixel; ignored outside the raster.
    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&rgba);
        }
    }

    /// One row of RGBA bytes.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let start = self.offset(0, y)?;
        Some(&self.pixels[start..start + self.width as usize * BYTES_PER_PIXEL])
    }

    /// Fill with an opaque colour.
    pub fn fill(&mut self, color: Rgb) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }

    /// Reallocate to a new size, clearing the contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(byte_len(width, height), 0);
    }

    /// Apply `f` to every pixel with its coordinates.
    pub fn for_each_pixel_mut(&mut self, mut f: impl FnMut(u32, u32, &mut [u8])) {
        let width = self.width.max(1) as usize;
        for (i, px) in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            f((i % width) as u32, (i / width) as u32, px);
        }
    }
}

fn byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

/// Single-channel coverage buffer in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Mask {
    /// Zeroed mask.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw values, row-major.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at `(x, y)`; zero outside.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.data[y * self.width + x]
        } else {
            0.0
        }
    }

    /// Raise the value at `(x, y)` to at least `value`.
    pub fn max_at(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            let cell = &mut self.data[y * self.width + x];
            *cell = cell.max(value.clamp(0.0, 1.0));
        }
    }

    /// Sum of all values.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Separable box blur with a `(2 * radius + 1)²` kernel.
    ///
    /// Cells outside the mask count as zero, so coverage near the border
    /// fades rather than smearing.
    #[must_use]
    pub fn box_blur(&self, radius: usize) -> Self {
        if radius == 0 {
            return self.clone();
        }
        let horizontal = blur_pass(&self.data, self.width, self.height, radius, true);
        let data = blur_pass(&horizontal, self.width, self.height, radius, false);
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn blur_pass(
    src: &[f32],
    width: usize,
    height: usize,
    radius: usize,
    horizontal: bool,
) -> Vec<f32> {
    let mut out = vec![0.0; src.len()];
    let norm = 1.0 / (2 * radius + 1) as f32;
    let (lines, len) = if horizontal { (height, width) } else { (width, height) };
    if len == 0 {
        return out;
    }
    let index = |line: usize, i: usize| {
        if horizontal {
            line * width + i
        } else {
            i * width + line
        }
    };

    for line in 0..lines {
        // Running window sum over [i - radius, i + radius]
        let mut sum: f32 = (0..=radius.min(len.saturating_sub(1)))
            .map(|i| src[index(line, i)])
            .sum();
        for i in 0..len {
            out[index(line, i)] = sum * norm;
            if let Some(enter) = i.checked_add(radius + 1).filter(|&e| e < len) {
                sum += src[index(line, enter)];
            }
            if let Some(leave) = i.checked_sub(radius) {
                sum -= src[index(line, leave)];
            }
        }
    }
    out
}
