//! Capture link: an in-process stand-in for the display
//!
//! Interprets the command stream exactly as the device would and paints the
//! result into an RGB565 screen buffer, which can be written out as a PNG.
//! Used in place of the serial port when debugging renders.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use log::{debug, warn};

use crate::color::{rgb565_to_rgb8, BYTES_PER_PIXEL};
use crate::command::{self, Opcode, Orientation, FRAME_LEN, ORIENTATION_FRAME_LEN};
use crate::geometry::Rect;

const WHITE565: u16 = 0xFFFF;
const BLACK565: u16 = 0x0000;

/// Decoder position in the byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for a command frame
    Command,
    /// Consuming the payload of a `DISPLAY_BITMAP` frame
    Payload { rect: Rect, received: usize },
}

/// Device emulator that accepts the wire protocol through [`Write`]
pub struct CaptureLink {
    width: u16,
    height: u16,
    screen: Vec<u16>,
    pending: Vec<u8>,
    state: State,
    orientation: Option<Orientation>,
    brightness: Option<u16>,
    screen_on: bool,
    resets: usize,
    bitmaps: usize,
    unknown: usize,
    output: Option<PathBuf>,
}

impl CaptureLink {
    /// Create an emulated screen, initially black
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            screen: vec![BLACK565; width as usize * height as usize],
            pending: Vec::new(),
            state: State::Command,
            orientation: None,
            brightness: None,
            screen_on: true,
            resets: 0,
            bitmaps: 0,
            unknown: 0,
            output: None,
        }
    }

    /// Write the screen to `path` as PNG on every flush
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// RGB565 value at `(x, y)`
    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.screen[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    /// Raw brightness value last received (device scale, 255 = dark)
    pub fn brightness(&self) -> Option<u16> {
        self.brightness
    }

    pub fn is_screen_on(&self) -> bool {
        self.screen_on
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Completed `DISPLAY_BITMAP` regions
    pub fn bitmaps(&self) -> usize {
        self.bitmaps
    }

    /// Frames with an opcode the emulator does not know
    pub fn unknown_frames(&self) -> usize {
        self.unknown
    }

    /// Render the screen to an RGB image
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let value = self.screen[y as usize * self.width as usize + x as usize];
            Rgb(rgb565_to_rgb8(value))
        })
    }

    /// Save the screen as a PNG
    pub fn save_png(&self, path: &Path) -> crate::Result<()> {
        self.to_image().save(path)?;
        debug!("captured screen written to {}", path.display());
        Ok(())
    }

    fn feed(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            match self.state {
                State::Command => {
                    let take = self.frame_len().saturating_sub(self.pending.len()).min(data.len());
                    self.pending.extend_from_slice(&data[..take]);
                    data = &data[take..];
                    if self.pending.len() == self.frame_len() {
                        self.execute();
                        self.pending.clear();
                    }
                }
                State::Payload { rect, received } => {
                    let total = rect.area() * BYTES_PER_PIXEL;
                    let take = (total - received).min(data.len());
                    self.paint(rect, received, &data[..take]);
                    data = &data[take..];
                    let received = received + take;
                    self.state = if received == total {
                        self.bitmaps += 1;
                        State::Command
                    } else {
                        State::Payload { rect, received }
                    };
                }
            }
        }
    }

    /// Bytes needed for the frame currently being assembled
    fn frame_len(&self) -> usize {
        if self.pending.len() >= FRAME_LEN
            && self.pending[FRAME_LEN - 1] == u8::from(Opcode::SetOrientation)
        {
            ORIENTATION_FRAME_LEN
        } else {
            FRAME_LEN
        }
    }

    fn execute(&mut self) {
        let mut header = [0u8; FRAME_LEN];
        header.copy_from_slice(&self.pending[..FRAME_LEN]);
        let (opcode, rect) = command::unpack(&header);

        match Opcode::from_byte(opcode) {
            Some(Opcode::DisplayBitmap) => {
                if rect.area() > 0 {
                    self.state = State::Payload { rect, received: 0 };
                }
            }
            Some(Opcode::SetOrientation) => {
                self.orientation = Orientation::from_device_value(self.pending[6]);
            }
            Some(Opcode::SetBrightness) => self.brightness = Some(rect.x),
            Some(Opcode::Clear) => self.screen.fill(WHITE565),
            Some(Opcode::ToBlack) => self.screen.fill(BLACK565),
            Some(Opcode::ScreenOff) => self.screen_on = false,
            Some(Opcode::ScreenOn) => self.screen_on = true,
            Some(Opcode::Reset) => self.resets += 1,
            Some(Opcode::SetMirror) | Some(Opcode::DisplayPixels) => {}
            None => {
                self.unknown += 1;
                warn!("capture link ignoring unknown opcode {}", opcode);
            }
        }
    }

    /// Paint payload bytes starting at byte `offset` of the region
    fn paint(&mut self, rect: Rect, offset: usize, bytes: &[u8]) {
        let region_width = rect.width();
        for (i, &byte) in bytes.iter().enumerate() {
            let pos = offset + i;
            let pixel = pos / BYTES_PER_PIXEL;
            let x = rect.x as usize + pixel % region_width;
            let y = rect.y as usize + pixel / region_width;
            if x >= self.width as usize || y >= self.height as usize {
                continue;
            }
            let slot = &mut self.screen[y * self.width as usize + x];
            *slot = if pos % BYTES_PER_PIXEL == 0 {
                (*slot & 0xFF00) | u16::from(byte)
            } else {
                (*slot & 0x00FF) | (u16::from(byte) << 8)
            };
        }
    }
}

impl Write for CaptureLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.feed(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(path) = self.output.clone() {
            self.save_png(&path)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        }
        Ok(())
    }
}
