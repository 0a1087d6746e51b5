//! Display geometry and tile addressing

use crate::command::MAX_COORDINATE;
use crate::error::{Error, Result};

/// Inclusive rectangle `(x, y)`–`(ex, ey)` as carried by command frames
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub ex: u16,
    pub ey: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, ex: u16, ey: u16) -> Self {
        Self { x, y, ex, ey }
    }

    pub const fn width(&self) -> usize {
        (self.ex as usize + 1).saturating_sub(self.x as usize)
    }

    pub const fn height(&self) -> usize {
        (self.ey as usize + 1).saturating_sub(self.y as usize)
    }

    pub const fn area(&self) -> usize {
        self.width() * self.height()
    }
}

/// Tile coordinates, in units of the tile size
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Tile {
    pub tx: u16,
    pub ty: u16,
}

impl Tile {
    pub const fn new(tx: u16, ty: u16) -> Self {
        Self { tx, ty }
    }
}

/// Fixed display geometry: pixel size plus tile size.
///
/// Width and height are exact multiples of the tile size and fit in the
/// 10-bit coordinate space, so every tile is full-sized and addressable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Geometry {
    width: u16,
    height: u16,
    tile_size: u16,
}

impl Geometry {
    pub fn new(width: u16, height: u16, tile_size: u16) -> Result<Self> {
        if tile_size == 0 {
            return Err(Error::InvalidGeometry("tile size must be non-zero".into()));
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry(format!(
                "display size {}x{} is empty",
                width, height
            )));
        }
        let limit = MAX_COORDINATE + 1;
        if width > limit || height > limit {
            return Err(Error::InvalidGeometry(format!(
                "display size {}x{} exceeds {} pixels per side",
                width, height, limit
            )));
        }
        if width % tile_size != 0 || height % tile_size != 0 {
            return Err(Error::InvalidGeometry(format!(
                "display size {}x{} is not a multiple of tile size {}",
                width, height, tile_size
            )));
        }
        Ok(Self {
            width,
            height,
            tile_size,
        })
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn tile_size(&self) -> u16 {
        self.tile_size
    }

    /// Tiles per row and per column
    pub const fn tile_grid(&self) -> (u16, u16) {
        (self.width / self.tile_size, self.height / self.tile_size)
    }

    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whole display as an inclusive rectangle
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width - 1, self.height - 1)
    }

    /// Pixel bounds of a tile
    pub const fn tile_rect(&self, tile: Tile) -> Rect {
        let x = tile.tx * self.tile_size;
        let y = tile.ty * self.tile_size;
        Rect::new(x, y, x + self.tile_size - 1, y + self.tile_size - 1)
    }

    /// Tiles in transmission order: columns outer, rows inner
    pub fn tiles(&self) -> impl Iterator<Item = Tile> {
        let (cols, rows) = self.tile_grid();
        (0..cols).flat_map(move |tx| (0..rows).map(move |ty| Tile::new(tx, ty)))
    }
}
