//! Built-in 5×7 bitmap font and text layout for the LCD.
//!
//! Glyphs cover upper-case ASCII letters, digits and common punctuation.
//! Text is upper-cased before lookup; anything without a glyph renders as `?`.
//!
//! Layout word-wraps to the available columns and picks the largest integer
//! scale (3, 2, then 1) at which the wrapped block fits. At scale 1 the block
//! is truncated to the lines that fit.

/// Glyph width in font pixels.
pub const GLYPH_WIDTH: u32 = 5;
/// Glyph height in font pixels.
pub const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance per character, including spacing.
pub const ADVANCE: u32 = 6;
/// Vertical advance per line, including spacing.
pub const LINE_ADVANCE: u32 = 9;
/// Scales tried by [`TextLayout::fit`], largest first.
pub const SCALES: [u32; 3] = [3, 2, 1];

/// One glyph: rows top-down, bit 4 is the leftmost column.
pub type Glyph = [u8; 7];

const UNKNOWN: Glyph = [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04];

/// Look up the glyph for `c` (after upper-casing). Unknown characters map to `?`.
#[must_use]
pub fn glyph(c: char) -> Glyph {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0; 7],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '\'' => [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '"' => [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        ';' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '&' => [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
        _ => UNKNOWN,
    }
}

/// True if font pixel `(col, row)` of `glyph` is lit.
#[must_use]
pub fn is_lit(glyph: &Glyph, col: u32, row: u32) -> bool {
    col < GLYPH_WIDTH
        && row < GLYPH_HEIGHT
        && glyph[row as usize] & (1 << (GLYPH_WIDTH - 1 - col)) != 0
}

/// Word-wrap `text` into lines of at most `columns` characters.
///
/// Whitespace runs collapse to one space; explicit newlines are kept. Words
/// longer than a line are split.
#[must_use]
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let used = line.chars().count();
                let needed = if used == 0 { word.len() } else { used + 1 + word.len() };
                if needed <= columns {
                    if used > 0 {
                        line.push(' ');
                    }
                    line.extend(word.iter());
                    break;
                }
                if used > 0 {
                    lines.push(std::mem::take(&mut line));
                    continue;
                }
                // Word alone is too long: hard split
                let rest = word.split_off(columns);
                lines.push(word.into_iter().collect());
                word = rest;
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Wrapped text with its chosen scale and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    /// Upper-cased, wrapped lines.
    pub lines: Vec<String>,
    /// Integer pixel scale of each font pixel.
    pub scale: u32,
    /// Left edge of each line, in raster pixels.
    pub line_x: Vec<u32>,
    /// Top edge of the block, in raster pixels.
    pub top: u32,
}

impl TextLayout {
    /// Fit `text` into a `width × height` area with `margin` on every side.
    ///
    /// Returns `None` for text that is empty after trimming.
    #[must_use]
    pub fn fit(text: &str, width: u32, height: u32, margin: u32) -> Option<Self> {
        let upper = text.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }
        let inner_w = width.saturating_sub(2 * margin);
        let inner_h = height.saturating_sub(2 * margin);

        let mut chosen = None;
        for scale in SCALES {
            let columns = (inner_w / (ADVANCE * scale)).max(1) as usize;
            let lines = wrap(&upper, columns);
            let line_gap = (LINE_ADVANCE - GLYPH_HEIGHT) * scale;
            let rows = ((inner_h + line_gap) / (LINE_ADVANCE * scale)).max(1) as usize;
            let fits = lines.len() <= rows;
            chosen = Some((scale, lines, rows));
            if fits {
                break;
            }
        }
        let (scale, mut lines, rows) = chosen?;
        lines.truncate(rows);

        let line_x = lines
            .iter()
            .map(|line| {
                let cols = u32::try_from(line.chars().count()).unwrap_or(u32::MAX);
                let w = block_width(cols, scale);
                width.saturating_sub(w) / 2
            })
            .collect();
        let block_h = block_height(u32::try_from(lines.len()).unwrap_or(u32::MAX), scale);
        let top = height.saturating_sub(block_h) / 2;

        Some(Self {
            lines,
            scale,
            line_x,
            top,
        })
    }

    /// Visit every lit raster pixel of the layout.
    pub fn for_each_lit(&self, mut f: impl FnMut(u32, u32)) {
        let s = self.scale;
        for (line_index, (line, &x0)) in self.lines.iter().zip(&self.line_x).enumerate() {
            let y0 = self.top + u32::try_from(line_index).unwrap_or(0) * LINE_ADVANCE * s;
            for (col_index, c) in line.chars().enumerate() {
                let g = glyph(c);
                let gx = x0 + u32::try_from(col_index).unwrap_or(0) * ADVANCE * s;
                for row in 0..GLYPH_HEIGHT {
                    for col in 0..GLYPH_WIDTH {
                        if !is_lit(&g, col, row) {
                            continue;
                        }
                        for dy in 0..s {
                            for dx in 0..s {
                                f(gx + col * s + dx, y0 + row * s + dy);
                            }
                        }
                    }
                }
            }
        }
    }
}

fn block_width(columns: u32, scale: u32) -> u32 {
    if columns == 0 {
        0
    } else {
        (columns * ADVANCE - (ADVANCE - GLYPH_WIDTH)) * scale
    }
}

fn block_height(lines: u32, scale: u32) -> u32 {
    if lines == 0 {
        0
    } else {
        (lines * LINE_ADVANCE - (LINE_ADVANCE - GLYPH_HEIGHT)) * scale
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_maps_to_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('~'), glyph('?'));
        assert_eq!(glyph(' '), [0; 7]);
    }

    #[test]
    fn lit_bits_are_left_aligned() {
        let l = glyph('L');
        assert!(is_lit(&l, 0, 0));
        assert!(!is_lit(&l, 4, 0));
        assert!(is_lit(&l, 4, 6));
        assert!(!is_lit(&l, 5, 6));
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(wrap("HELLO BIG WORLD", 9), vec!["HELLO BIG", "WORLD"]);
        assert_eq!(wrap("  A   B  ", 9), vec!["A B"]);
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("ABCDEFGHIJ", 4), vec!["ABCD", "EFGH", "IJ"]);
        assert_eq!(wrap("XY ABCDEFGH", 4), vec!["XY", "ABCD", "EFGH"]);
    }

    #[test]
    fn wrap_keeps_newlines() {
        assert_eq!(wrap("ONE\nTWO", 20), vec!["ONE", "TWO"]);
    }

    #[test]
    fn short_text_gets_largest_scale() {
        let layout = TextLayout::fit("hi", 256, 160, 8).unwrap();
        assert_eq!(layout.scale, 3);
        assert_eq!(layout.lines, vec!["HI"]);
        // Centred: 2 glyphs at scale 3 are 33 px wide
        assert_eq!(layout.line_x[0], (256 - 33) / 2);
    }

    #[test]
    fn longer_text_steps_down() {
        let medium = "the quick brown fox jumps over the lazy dog again and again";
        assert_eq!(TextLayout::fit(medium, 256, 160, 8).unwrap().scale, 2);

        let long = medium.repeat(4);
        let layout = TextLayout::fit(&long, 256, 160, 8).unwrap();
        assert_eq!(layout.scale, 1);
        // Truncated to what fits at scale 1
        assert!(layout.lines.len() <= 16);
    }

    #[test]
    fn empty_text_has_no_layout() {
        assert!(TextLayout::fit("   ", 256, 160, 8).is_none());
    }

    #[test]
    fn lit_pixels_stay_inside() {
        let layout = TextLayout::fit("Warehouse 42!", 256, 160, 8).unwrap();
        let mut count = 0;
        layout.for_each_lit(|x, y| {
            assert!(x < 256 && y < 160);
            count += 1;
        });
        assert!(count > 0);
    }
}
