//! TrueType text rendering onto the framebuffer
//!
//! The font is an owned resource: load it once at startup and pass the
//! renderer to whatever draws text.

use fontdue::{Font, FontSettings};

use crate::canvas::Framebuffer;
use crate::color::Color;
use crate::error::{Error, Result};

/// Font renderer for TrueType fonts
pub struct FontRenderer {
    font: Font,
    size: f32,
}

impl FontRenderer {
    /// Parse a TrueType/OpenType font
    pub fn new(font_data: &[u8], size: f32) -> Result<Self> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self { font, size })
    }

    /// Line height for current font size
    pub fn line_height(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map_or(self.size, |m| m.new_line_size)
    }

    fn ascent(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.size)
            .map_or(self.size, |m| m.ascent)
    }

    /// Draw one glyph with its cell's top-left at `(x, y)`.
    /// Returns the advance width.
    pub fn draw_char(&self, fb: &mut Framebuffer, x: i32, y: i32, c: char, fg: Color) -> f32 {
        let (metrics, bitmap) = self.font.rasterize(c, self.size);

        let baseline = y + self.ascent().round() as i32;
        let glyph_x = x + metrics.xmin;
        let glyph_y = baseline - metrics.height as i32 - metrics.ymin;

        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let alpha = bitmap[row * metrics.width + col];
                fb.blend_pixel(glyph_x + col as i32, glyph_y + row as i32, fg, alpha);
            }
        }

        metrics.advance_width
    }

    /// Draw a string; `\n` starts a new line at the starting `x`.
    /// Returns the widest line drawn.
    pub fn draw_string(&self, fb: &mut Framebuffer, x: i32, y: i32, s: &str, fg: Color) -> f32 {
        let line_height = self.line_height();
        let mut widest: f32 = 0.0;

        for (i, line) in s.lines().enumerate() {
            let line_y = y + (i as f32 * line_height).round() as i32;
            let mut cursor_x = x as f32;
            for c in line.chars() {
                cursor_x += self.draw_char(fb, cursor_x as i32, line_y, c, fg);
            }
            widest = widest.max(cursor_x - x as f32);
        }

        widest
    }

    /// Measure string width without drawing
    pub fn measure_string(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| self.font.metrics(c, self.size).advance_width)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    const MONO: &[u8] = include_bytes!("../tests/data/DejaVuSansMono.ttf");

    fn renderer() -> FontRenderer {
        FontRenderer::new(MONO, 20.0).unwrap()
    }

    /// Bounding box of every non-black pixel, as (min_x, min_y, max_x, max_y)
    fn inked(fb: &Framebuffer) -> Option<(u16, u16, u16, u16)> {
        let mut bounds: Option<(u16, u16, u16, u16)> = None;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.pixel_at(x, y) != Color::BLACK {
                    let b = bounds.get_or_insert((x, y, x, y));
                    b.0 = b.0.min(x);
                    b.1 = b.1.min(y);
                    b.2 = b.2.max(x);
                    b.3 = b.3.max(y);
                }
            }
        }
        bounds
    }

    #[test]
    fn test_rejects_garbage_font() {
        let result = FontRenderer::new(b"definitely not a font", 16.0);
        assert!(matches!(result, Err(Error::Font(_))));
    }

    #[test]
    fn test_draw_string_stays_inside_measured_box() {
        let font = renderer();
        let mut fb = Framebuffer::new(200, 60);
        let (x, y) = (10, 10);

        let width = font.draw_string(&mut fb, x, y, "Hello", Color::WHITE);
        assert!((width - font.measure_string("Hello")).abs() < 0.01);

        let (min_x, min_y, max_x, max_y) = inked(&fb).unwrap();
        assert!(i32::from(min_x) >= x);
        assert!(i32::from(max_x) <= x + width.ceil() as i32);
        assert!(i32::from(min_y) >= y);
        assert!(i32::from(max_y) < y + font.line_height().ceil() as i32);
    }

    #[test]
    fn test_second_line_advances_by_line_height() {
        let font = renderer();
        let step = font.line_height().round() as i32;

        let mut separate = Framebuffer::new(80, 80);
        font.draw_string(&mut separate, 4, 4, "Ag", Color::WHITE);
        font.draw_string(&mut separate, 4, 4 + step, "Ag", Color::WHITE);

        let mut joined = Framebuffer::new(80, 80);
        font.draw_string(&mut joined, 4, 4, "Ag\nAg", Color::WHITE);

        assert_eq!(separate.as_slice(), joined.as_slice());
        assert!(inked(&joined).is_some());
    }

    #[test]
    fn test_draw_string_returns_widest_line() {
        let font = renderer();
        let mut fb = Framebuffer::new(200, 80);
        let width = font.draw_string(&mut fb, 0, 0, "ab\nabcd\nabc", Color::WHITE);
        assert!((width - font.measure_string("abcd")).abs() < 0.01);
    }

    #[test]
    fn test_monospace_advance() {
        let font = renderer();
        let mut fb = Framebuffer::new(40, 40);
        let advance = font.draw_char(&mut fb, 0, 0, 'M', Color::WHITE);
        assert!(advance > 0.0);
        assert!((font.measure_string("iiii") - 4.0 * advance).abs() < 0.01);
    }

    #[test]
    fn test_glyphs_clip_at_edges() {
        let font = renderer();
        let mut fb = Framebuffer::new(16, 16);
        // partly off-screen on every side
        font.draw_string(&mut fb, -6, -8, "W", Color::WHITE);
        font.draw_string(&mut fb, 10, 6, "W", Color::WHITE);
        assert!(inked(&fb).is_some());
    }
}
