//! Display controller
//!
//! Turns canvas updates and one-shot commands into frames on the transport.

use log::debug;

use crate::canvas::Canvas;
use crate::command::{self, Command, Opcode, Orientation};
use crate::damage::DamageTracker;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::transport::{LinkStats, Transport};

/// Full-frame payloads are split into segments of this many bytes
/// (four rows of a 480-pixel-wide display)
pub const DEFAULT_SEGMENT_SIZE: usize = 480 * 8;

/// How an update selects what to send
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UpdateMode {
    /// Only tiles that changed since the last transmission
    Diff,
    /// The whole frame, ignoring the snapshot
    Full,
}

/// What an update put on the wire
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct UpdateReport {
    /// Regions sent (dirty tiles, or 1 for a full frame)
    pub regions: usize,
    /// Bytes submitted, headers included
    pub bytes: usize,
}

pub struct DisplayController {
    tracker: DamageTracker,
    transport: Transport,
    segment_size: usize,
}

impl DisplayController {
    pub fn new(geometry: Geometry, transport: Transport) -> Self {
        Self {
            tracker: DamageTracker::new(geometry),
            transport,
            segment_size: DEFAULT_SEGMENT_SIZE,
        }
    }

    /// Set the full-frame segment size. Zero keeps the current value.
    pub fn with_segment_size(mut self, segment_size: usize) -> Self {
        if segment_size > 0 {
            self.segment_size = segment_size;
        }
        self
    }

    pub fn geometry(&self) -> Geometry {
        self.tracker.geometry()
    }

    pub fn tracker(&self) -> &DamageTracker {
        &self.tracker
    }

    /// Push the canvas to the display
    pub fn update<C: Canvas + ?Sized>(
        &mut self,
        canvas: &C,
        mode: UpdateMode,
    ) -> Result<UpdateReport> {
        let report = match mode {
            UpdateMode::Diff => self.update_diff(canvas)?,
            UpdateMode::Full => self.update_full(canvas)?,
        };
        debug!(
            "{:?} update: {} regions, {} bytes",
            mode, report.regions, report.bytes
        );
        Ok(report)
    }

    fn update_diff<C: Canvas + ?Sized>(&mut self, canvas: &C) -> Result<UpdateReport> {
        let geometry = self.tracker.geometry();
        let mut report = UpdateReport::default();

        for tile in self.tracker.scan(canvas)? {
            let (payload, commit) = self.tracker.extract(canvas, tile)?;
            report.regions += 1;
            report.bytes += command::FRAME_LEN + payload.len();

            self.send(Command::bitmap(geometry.tile_rect(tile)))?;
            self.transport.submit(payload)?;
            // Handed off; the link gives no acknowledgment to wait for
            self.tracker.commit(commit);
        }

        Ok(report)
    }

    fn update_full<C: Canvas + ?Sized>(&mut self, canvas: &C) -> Result<UpdateReport> {
        let payload = self.tracker.full_frame(canvas)?;
        self.send(Command::bitmap(self.tracker.geometry().bounds()))?;
        for segment in payload.chunks(self.segment_size) {
            self.transport.submit(segment.to_vec())?;
        }

        Ok(UpdateReport {
            regions: 1,
            bytes: command::FRAME_LEN + payload.len(),
        })
    }

    fn send(&self, command: Command) -> Result<()> {
        self.transport.submit(command.to_vec())
    }

    pub fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        let geometry = self.tracker.geometry();
        let frame = command::pack_orientation(orientation, geometry.width(), geometry.height());
        self.transport.submit(frame.to_vec())
    }

    /// Set brightness on a 0-100 scale
    pub fn set_brightness(&self, level: u8) -> Result<()> {
        self.send(Command::brightness(level))
    }

    pub fn reset(&self) -> Result<()> {
        self.send(Command::reset())
    }

    /// Clear the screen to white
    pub fn clear(&self) -> Result<()> {
        self.send(Command::clear())
    }

    pub fn to_black(&self) -> Result<()> {
        self.send(Command::bare(Opcode::ToBlack))
    }

    pub fn screen_on(&self) -> Result<()> {
        self.send(Command::bare(Opcode::ScreenOn))
    }

    pub fn screen_off(&self) -> Result<()> {
        self.send(Command::bare(Opcode::ScreenOff))
    }

    /// Flush the link after everything sent so far
    pub fn flush(&self) -> Result<()> {
        self.transport.flush()
    }

    /// Drain the transport and reset the device
    pub fn shutdown(self) -> Result<LinkStats> {
        self.transport.shutdown()
    }
}
