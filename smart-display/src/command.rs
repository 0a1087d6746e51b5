//! Device command frames
//!
//! Standard frame (6 bytes), four 10-bit coordinates packed MSB-first:
//! ```text
//! byte0 = x[9:2]
//! byte1 = x[1:0] << 6 | y[9:4]
//! byte2 = y[3:0] << 4 | ex[9:6]
//! byte3 = ex[5:0] << 2 | ey[9:8]
//! byte4 = ey[7:0]
//! byte5 = opcode
//! ```
//!
//! Orientation frame (16 bytes): zero coordinates, `SET_ORIENTATION`, the
//! orientation biased by 100, width and height as big-endian u16, then
//! five bytes of padding.

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Length of a standard command frame
pub const FRAME_LEN: usize = 6;

/// Length of the orientation frame
pub const ORIENTATION_FRAME_LEN: usize = 16;

/// Largest value a packed coordinate can carry
pub const MAX_COORDINATE: u16 = 0x3FF;

/// Device enumerates orientations starting at this value
const ORIENTATION_BIAS: u8 = 100;

/// Device opcodes
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Opcode {
    /// Resets the display
    Reset = 101,
    /// Clears the display to white
    Clear = 102,
    /// Turns the screen black
    ToBlack = 103,
    ScreenOff = 108,
    ScreenOn = 109,
    SetBrightness = 110,
    SetOrientation = 121,
    /// Mirrors rendering on the screen
    SetMirror = 122,
    DisplayPixels = 195,
    /// Raw RGB565 payload for the addressed rectangle follows
    DisplayBitmap = 197,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            101 => Some(Self::Reset),
            102 => Some(Self::Clear),
            103 => Some(Self::ToBlack),
            108 => Some(Self::ScreenOff),
            109 => Some(Self::ScreenOn),
            110 => Some(Self::SetBrightness),
            121 => Some(Self::SetOrientation),
            122 => Some(Self::SetMirror),
            195 => Some(Self::DisplayPixels),
            197 => Some(Self::DisplayBitmap),
            _ => None,
        }
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op as u8
    }
}

/// Screen orientation
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum Orientation {
    Portrait = 0,
    ReversePortrait = 1,
    #[default]
    Landscape = 2,
    ReverseLandscape = 3,
}

impl Orientation {
    /// Value carried in byte 6 of the orientation frame
    pub const fn device_value(self) -> u8 {
        self as u8 + ORIENTATION_BIAS
    }

    pub fn from_device_value(value: u8) -> Option<Self> {
        match value.checked_sub(ORIENTATION_BIAS)? {
            0 => Some(Self::Portrait),
            1 => Some(Self::ReversePortrait),
            2 => Some(Self::Landscape),
            3 => Some(Self::ReverseLandscape),
            _ => None,
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "reverse-portrait" => Ok(Self::ReversePortrait),
            "landscape" => Ok(Self::Landscape),
            "reverse-landscape" => Ok(Self::ReverseLandscape),
            other => Err(format!("unknown orientation: {}", other)),
        }
    }
}

/// Pack an opcode and rectangle into a standard frame.
///
/// Coordinates wider than 10 bits lose their high bits; callers keep them
/// inside the display.
pub fn pack(opcode: u8, x: u16, y: u16, ex: u16, ey: u16) -> [u8; FRAME_LEN] {
    [
        (x >> 2) as u8,
        (((x & 3) << 6) | ((y >> 4) & 0x3F)) as u8,
        (((y & 15) << 4) | ((ex >> 6) & 0x0F)) as u8,
        (((ex & 63) << 2) | ((ey >> 8) & 0x03)) as u8,
        (ey & 255) as u8,
        opcode,
    ]
}

/// Recover the opcode and coordinates from a standard frame
pub fn unpack(frame: &[u8; FRAME_LEN]) -> (u8, Rect) {
    let [b0, b1, b2, b3, b4, opcode] = frame.map(u16::from);
    let x = (b0 << 2) | (b1 >> 6);
    let y = ((b1 & 0x3F) << 4) | (b2 >> 4);
    let ex = ((b2 & 0x0F) << 6) | (b3 >> 2);
    let ey = ((b3 & 0x03) << 8) | b4;
    (opcode as u8, Rect::new(x, y, ex, ey))
}

/// Build the 16-byte orientation frame for a display of the given size
pub fn pack_orientation(
    orientation: Orientation,
    width: u16,
    height: u16,
) -> [u8; ORIENTATION_FRAME_LEN] {
    let mut frame = [0u8; ORIENTATION_FRAME_LEN];
    frame[..FRAME_LEN].copy_from_slice(&pack(Opcode::SetOrientation.into(), 0, 0, 0, 0));
    frame[6] = orientation.device_value();
    BigEndian::write_u16(&mut frame[7..9], width);
    BigEndian::write_u16(&mut frame[9..11], height);
    frame
}

/// Map a 0-100 brightness level onto the device's inverted 255-0 scale
pub fn brightness_value(level: u8) -> u16 {
    let level = u16::from(level.min(100));
    (100 - level) * 255 / 100
}

/// A standard command: opcode plus the addressed rectangle
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Command {
    pub opcode: u8,
    pub rect: Rect,
}

impl Command {
    pub fn new(opcode: Opcode, rect: Rect) -> Self {
        Self {
            opcode: opcode.into(),
            rect,
        }
    }

    /// Command with no spatial target
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Rect::new(0, 0, 0, 0))
    }

    pub fn reset() -> Self {
        Self::bare(Opcode::Reset)
    }

    pub fn clear() -> Self {
        Self::bare(Opcode::Clear)
    }

    pub fn brightness(level: u8) -> Self {
        Self::new(
            Opcode::SetBrightness,
            Rect::new(brightness_value(level), 0, 0, 0),
        )
    }

    /// Header announcing an RGB565 payload for `rect`
    pub fn bitmap(rect: Rect) -> Self {
        Self::new(Opcode::DisplayBitmap, rect)
    }

    pub fn encode(&self) -> [u8; FRAME_LEN] {
        pack(
            self.opcode,
            self.rect.x,
            self.rect.y,
            self.rect.ex,
            self.rect.ey,
        )
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.encode().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pack_known_layout() {
        // x = 0b11_0000_0001, y = 0b10_0000_0011, ex = 0b01_1100_0111, ey = 0b11_0101_0101
        let frame = pack(197, 0x301, 0x203, 0x1C7, 0x355);
        assert_eq!(frame[0], 0xC0);
        assert_eq!(frame[1], 0x40 | 0x20);
        assert_eq!(frame[2], 0x30 | 0x07);
        assert_eq!(frame[3], 0x1C | 0x03);
        assert_eq!(frame[4], 0x55);
        assert_eq!(frame[5], 197);
    }

    #[test]
    fn test_pack_full_display_rect() {
        let frame = pack(Opcode::DisplayBitmap.into(), 0, 0, 479, 319);
        assert_eq!(frame, [0x00, 0x00, 0x07, 0x7D, 0x3F, 197]);
        assert_eq!(unpack(&frame), (197, Rect::new(0, 0, 479, 319)));
    }

    #[test]
    fn test_pack_truncates_high_bits() {
        assert_eq!(pack(1, 1024 + 5, 0, 0, 0), pack(1, 5, 0, 0, 0));
        assert_eq!(pack(1, 0, 0, 0, 0xFFFF), pack(1, 0, 0, 0, MAX_COORDINATE));
    }

    #[test]
    fn test_orientation_frame() {
        let frame = pack_orientation(Orientation::Landscape, 480, 320);
        assert_eq!(frame.len(), 16);
        assert_eq!(&frame[..5], &[0, 0, 0, 0, 0]);
        assert_eq!(frame[5], 121);
        assert_eq!(frame[6], 102);
        assert_eq!(&frame[7..9], &[0x01, 0xE0]);
        assert_eq!(&frame[9..11], &[0x01, 0x40]);
        assert_eq!(&frame[11..], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_orientation_device_values() {
        assert_eq!(Orientation::Portrait.device_value(), 100);
        assert_eq!(Orientation::ReversePortrait.device_value(), 101);
        assert_eq!(Orientation::ReverseLandscape.device_value(), 103);
        assert_eq!(Orientation::from_device_value(102), Some(Orientation::Landscape));
        assert_eq!(Orientation::from_device_value(99), None);
        assert_eq!(Orientation::from_device_value(104), None);
    }

    #[test]
    fn test_orientation_from_str() {
        assert_eq!("Landscape".parse::<Orientation>(), Ok(Orientation::Landscape));
        assert_eq!("reverse-portrait".parse::<Orientation>(), Ok(Orientation::ReversePortrait));
        assert!("sideways".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_brightness_is_inverted() {
        assert_eq!(brightness_value(0), 255);
        assert_eq!(brightness_value(100), 0);
        assert_eq!(brightness_value(50), 127);
        assert_eq!(brightness_value(250), 0);

        let frame = Command::brightness(0).encode();
        assert_eq!(unpack(&frame), (110, Rect::new(255, 0, 0, 0)));
    }

    #[test]
    fn test_opcode_from_byte() {
        assert_eq!(Opcode::from_byte(197), Some(Opcode::DisplayBitmap));
        assert_eq!(Opcode::from_byte(101), Some(Opcode::Reset));
        assert_eq!(Opcode::from_byte(0), None);
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(Command::reset().encode(), [0, 0, 0, 0, 0, 101]);
        assert_eq!(Command::clear().encode(), [0, 0, 0, 0, 0, 102]);
    }

    proptest! {
        #[test]
        fn prop_pack_roundtrip(
            opcode: u8,
            x in 0u16..1024,
            y in 0u16..1024,
            ex in 0u16..1024,
            ey in 0u16..1024,
        ) {
            let frame = pack(opcode, x, y, ex, ey);
            prop_assert_eq!(unpack(&frame), (opcode, Rect::new(x, y, ex, ey)));
        }
    }
}
