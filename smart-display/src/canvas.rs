//! Canvas trait and the in-memory framebuffer
//!
//! The engine only reads pixels through [`Canvas`]; drawing primitives live on
//! [`Framebuffer`] and are used by the application and the font renderer.

use crate::color::Color;

/// Read-only pixel source consumed by the damage tracker
pub trait Canvas {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// Pixel at `(x, y)`. Callers stay inside `width() × height()`.
    fn pixel_at(&self, x: u16, y: u16) -> Color;
}

/// Row-major framebuffer with full-precision colors
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a framebuffer initialized to black
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, Color::BLACK)
    }

    pub fn filled(width: u16, height: u16, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get pixel at coordinates
    pub fn get_pixel(&self, x: u16, y: u16) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Set pixel at coordinates (bounds-checked)
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = color;
            true
        } else {
            false
        }
    }

    /// Blend `color` over the existing pixel with 8-bit coverage
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, alpha: u8) {
        let (Ok(ux), Ok(uy)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        let Some(bg) = self.get_pixel(ux, uy) else {
            return;
        };
        let blended = match alpha {
            0 => return,
            255 => color,
            a => blend(color, bg, a),
        };
        self.set_pixel(ux, uy, blended);
    }

    /// Fill the whole framebuffer
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Fill a rectangle, clipped to the framebuffer
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);

        for row in y..y_end {
            let start = self.index(x.min(x_end), row);
            let end = self.index(x_end, row);
            self.pixels[start..end].fill(color);
        }
    }

    /// Raw pixels, row-major
    pub fn as_slice(&self) -> &[Color] {
        &self.pixels
    }
}

impl Canvas for Framebuffer {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn pixel_at(&self, x: u16, y: u16) -> Color {
        self.pixels[self.index(x, y)]
    }
}

fn blend(fg: Color, bg: Color, alpha: u8) -> Color {
    let a = alpha as u32;
    let inv_a = 255 - a;
    let mix = |f: u16, b: u16| ((f as u32 * a + b as u32 * inv_a) / 255) as u16;

    Color::from_rgba16(mix(fg.r, bg.r), mix(fg.g, bg.g), mix(fg.b, bg.b), u16::MAX)
}
