//! Full-precision colors and RGB565 pixel encoding
//!
//! Canvas colors keep 16 bits per channel so that damage detection compares
//! the renderer's native values. Only the wire encoding quantizes to RGB565.

use byteorder::{ByteOrder, LittleEndian};

/// Bytes per encoded pixel on the wire
pub const BYTES_PER_PIXEL: usize = 2;

/// RGBA color with 16 bits per channel
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create an opaque color from 8-bit components
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create a color from 8-bit components, expanding each to 16 bits
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: expand(r),
            g: expand(g),
            b: expand(b),
            a: expand(a),
        }
    }

    /// Create a color from raw 16-bit channels
    pub const fn from_rgba16(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to the device's RGB565 value. Alpha is ignored.
    #[inline]
    pub const fn to_rgb565(&self) -> u16 {
        let r5 = (self.r >> 11) & 0x1F;
        let g6 = (self.g >> 10) & 0x3F;
        let b5 = (self.b >> 11) & 0x1F;
        (r5 << 11) | (g6 << 5) | b5
    }

    /// Create an opaque color from an RGB565 value
    pub const fn from_rgb565(rgb565: u16) -> Self {
        let [r, g, b] = rgb565_to_rgb8(rgb565);
        Self::rgb(r, g, b)
    }
}

const fn expand(c: u8) -> u16 {
    (c as u16) * 0x101
}

/// Encode a color as little-endian RGB565
pub fn encode(color: Color) -> [u8; BYTES_PER_PIXEL] {
    let mut out = [0u8; BYTES_PER_PIXEL];
    LittleEndian::write_u16(&mut out, color.to_rgb565());
    out
}

/// Append the encoded color to a payload buffer
#[inline]
pub fn encode_into(buf: &mut Vec<u8>, color: Color) {
    buf.extend_from_slice(&encode(color));
}

/// Expand an RGB565 value to 8-bit components with bit replication
pub const fn rgb565_to_rgb8(rgb565: u16) -> [u8; 3] {
    let r = ((rgb565 >> 11) & 0x1F) as u8;
    let g = ((rgb565 >> 5) & 0x3F) as u8;
    let b = (rgb565 & 0x1F) as u8;
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}
