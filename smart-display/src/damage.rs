//! Tile-based damage tracking
//!
//! The tracker keeps a snapshot of what the device last received. A scan
//! compares the live canvas against it tile by tile; extraction serializes a
//! dirty tile and hands back a [`TileCommit`] that the caller applies once the
//! tile's bytes are on their way.
//!
//! The device never acknowledges anything, so the controller commits right
//! after submitting.

use log::trace;

use crate::canvas::Canvas;
use crate::color::{self, Color, BYTES_PER_PIXEL};
use crate::error::{Error, Result};
use crate::geometry::{Geometry, Tile};

/// Colors sampled from one tile, pending commit into the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCommit {
    tile: Tile,
    pixels: Vec<Color>,
}

impl TileCommit {
    pub fn tile(&self) -> Tile {
        self.tile
    }
}

/// Snapshot-based dirty tile detector
pub struct DamageTracker {
    geometry: Geometry,
    snapshot: Vec<Color>,
}

impl DamageTracker {
    /// Create a tracker whose snapshot starts out black
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            snapshot: vec![Color::BLACK; geometry.pixel_count()],
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Last committed color at `(x, y)`
    pub fn snapshot_pixel(&self, x: u16, y: u16) -> Option<Color> {
        if x < self.geometry.width() && y < self.geometry.height() {
            Some(self.snapshot[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.geometry.width() as usize + x as usize
    }

    fn check_canvas<C: Canvas + ?Sized>(&self, canvas: &C) -> Result<()> {
        if canvas.width() != self.geometry.width() || canvas.height() != self.geometry.height() {
            return Err(Error::CanvasMismatch {
                width: self.geometry.width(),
                height: self.geometry.height(),
                found_width: canvas.width(),
                found_height: canvas.height(),
            });
        }
        Ok(())
    }

    /// Dirty tiles in transmission order (columns outer, rows inner)
    pub fn scan<C: Canvas + ?Sized>(&self, canvas: &C) -> Result<Vec<Tile>> {
        self.check_canvas(canvas)?;
        let dirty: Vec<Tile> = self
            .geometry
            .tiles()
            .filter(|&tile| self.is_dirty(canvas, tile))
            .collect();
        trace!("scan found {} dirty tiles", dirty.len());
        Ok(dirty)
    }

    /// Whether any pixel in `tile` differs from the snapshot
    pub fn is_dirty<C: Canvas + ?Sized>(&self, canvas: &C, tile: Tile) -> bool {
        let rect = self.geometry.tile_rect(tile);
        (rect.y..=rect.ey).any(|y| {
            (rect.x..=rect.ex).any(|x| canvas.pixel_at(x, y) != self.snapshot[self.index(x, y)])
        })
    }

    /// Serialize a tile as RGB565 (rows outer, columns inner) and sample its
    /// colors for a later [`commit`](Self::commit)
    pub fn extract<C: Canvas + ?Sized>(
        &self,
        canvas: &C,
        tile: Tile,
    ) -> Result<(Vec<u8>, TileCommit)> {
        self.check_canvas(canvas)?;
        let rect = self.geometry.tile_rect(tile);
        let mut payload = Vec::with_capacity(rect.area() * BYTES_PER_PIXEL);
        let mut pixels = Vec::with_capacity(rect.area());

        for y in rect.y..=rect.ey {
            for x in rect.x..=rect.ex {
                let color = canvas.pixel_at(x, y);
                color::encode_into(&mut payload, color);
                pixels.push(color);
            }
        }

        Ok((payload, TileCommit { tile, pixels }))
    }

    /// Record a tile's sampled colors as delivered
    pub fn commit(&mut self, commit: TileCommit) {
        let rect = self.geometry.tile_rect(commit.tile);
        let width = rect.width();
        let stride = self.geometry.width() as usize;

        for (row, colors) in commit.pixels.chunks_exact(width).enumerate() {
            let start = (rect.y as usize + row) * stride + rect.x as usize;
            self.snapshot[start..start + width].copy_from_slice(colors);
        }
    }

    /// Extract and immediately commit, assuming delivery
    pub fn extract_and_commit<C: Canvas + ?Sized>(
        &mut self,
        canvas: &C,
        tile: Tile,
    ) -> Result<Vec<u8>> {
        let (payload, commit) = self.extract(canvas, tile)?;
        self.commit(commit);
        Ok(payload)
    }

    /// Serialize the whole canvas row-major without touching the snapshot
    pub fn full_frame<C: Canvas + ?Sized>(&self, canvas: &C) -> Result<Vec<u8>> {
        self.check_canvas(canvas)?;
        let mut payload = Vec::with_capacity(self.geometry.pixel_count() * BYTES_PER_PIXEL);
        for y in 0..self.geometry.height() {
            for x in 0..self.geometry.width() {
                color::encode_into(&mut payload, canvas.pixel_at(x, y));
            }
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Framebuffer;

    fn tracker(width: u16, height: u16, tile: u16) -> DamageTracker {
        DamageTracker::new(Geometry::new(width, height, tile).unwrap())
    }

    #[test]
    fn test_clean_canvas_has_no_damage() {
        let t = tracker(32, 32, 8);
        let fb = Framebuffer::new(32, 32);
        assert!(t.scan(&fb).unwrap().is_empty());
    }

    #[test]
    fn test_single_tile_damage() {
        let t = tracker(32, 32, 8);
        for &(x, y) in &[(0u16, 0u16), (7, 7), (8, 0), (31, 31), (12, 25)] {
            let mut fb = Framebuffer::new(32, 32);
            fb.set_pixel(x, y, Color::WHITE);
            assert_eq!(t.scan(&fb).unwrap(), vec![Tile::new(x / 8, y / 8)]);
        }
    }

    #[test]
    fn test_scan_order_is_column_major() {
        let t = tracker(32, 32, 16);
        let mut fb = Framebuffer::new(32, 32);
        fb.set_pixel(20, 20, Color::RED);
        fb.set_pixel(3, 3, Color::RED);
        assert_eq!(t.scan(&fb).unwrap(), vec![Tile::new(0, 0), Tile::new(1, 1)]);

        // (1,0) comes after (0,1)
        let mut fb = Framebuffer::new(32, 32);
        fb.set_pixel(20, 0, Color::RED);
        fb.set_pixel(0, 20, Color::RED);
        assert_eq!(t.scan(&fb).unwrap(), vec![Tile::new(0, 1), Tile::new(1, 0)]);
    }

    #[test]
    fn test_full_precision_comparison() {
        let t = tracker(16, 16, 8);
        let mut fb = Framebuffer::new(16, 16);
        // Quantizes to black on the wire but is not literally black
        fb.set_pixel(1, 1, Color::from_rgba16(0x0001, 0, 0, 0xFFFF));
        assert_eq!(t.scan(&fb).unwrap(), vec![Tile::new(0, 0)]);
    }

    #[test]
    fn test_extract_layout() {
        let t = tracker(16, 16, 8);
        let mut fb = Framebuffer::new(16, 16);
        fb.set_pixel(10, 10, Color::WHITE);

        let (payload, commit) = t.extract(&fb, Tile::new(1, 1)).unwrap();
        assert_eq!(payload.len(), 128);
        assert_eq!(commit.tile(), Tile::new(1, 1));

        // local (2,2) sits at index (2 * 8 + 2) * 2
        let offset = (2 * 8 + 2) * 2;
        assert_eq!(&payload[offset..offset + 2], &[0xFF, 0xFF]);
        assert_eq!(payload.iter().filter(|&&b| b != 0).count(), 2);
    }

    #[test]
    fn test_extract_does_not_commit() {
        let t = tracker(16, 16, 8);
        let mut fb = Framebuffer::new(16, 16);
        fb.set_pixel(0, 0, Color::WHITE);
        let _ = t.extract(&fb, Tile::new(0, 0)).unwrap();
        assert_eq!(t.scan(&fb).unwrap(), vec![Tile::new(0, 0)]);
    }

    #[test]
    fn test_commit_converges() {
        let mut t = tracker(32, 32, 8);
        let mut fb = Framebuffer::new(32, 32);
        fb.fill_rect(4, 4, 20, 3, Color::BLUE);

        let dirty = t.scan(&fb).unwrap();
        assert_eq!(dirty.len(), 3);
        for tile in dirty {
            t.extract_and_commit(&fb, tile).unwrap();
        }

        assert!(t.scan(&fb).unwrap().is_empty());
        assert_eq!(t.snapshot_pixel(10, 5), Some(Color::BLUE));
        assert_eq!(t.snapshot_pixel(10, 8), Some(Color::BLACK));
        assert_eq!(t.snapshot_pixel(32, 0), None);
    }

    #[test]
    fn test_commit_touches_only_its_tile() {
        let mut t = tracker(16, 16, 8);
        let fb = Framebuffer::filled(16, 16, Color::GREEN);
        let (_, commit) = t.extract(&fb, Tile::new(1, 0)).unwrap();
        t.commit(commit);

        assert_eq!(
            t.scan(&fb).unwrap(),
            vec![Tile::new(0, 0), Tile::new(0, 1), Tile::new(1, 1)]
        );
    }

    #[test]
    fn test_full_frame_ignores_snapshot() {
        let t = tracker(16, 8, 8);
        let mut fb = Framebuffer::new(16, 8);
        fb.set_pixel(15, 7, Color::RED);

        let payload = t.full_frame(&fb).unwrap();
        assert_eq!(payload.len(), 16 * 8 * 2);
        assert_eq!(&payload[payload.len() - 2..], &[0x00, 0xF8]);
        assert_eq!(t.scan(&fb).unwrap(), vec![Tile::new(1, 0)]);
    }

    #[test]
    fn test_canvas_mismatch() {
        let t = tracker(16, 16, 8);
        let fb = Framebuffer::new(32, 16);
        assert!(matches!(
            t.scan(&fb),
            Err(Error::CanvasMismatch { found_width: 32, .. })
        ));
        assert!(t.full_frame(&fb).is_err());
    }
}
