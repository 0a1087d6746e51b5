//! Display configuration file
//!
//! Optional TOML file; every field has a default and command-line flags
//! override whatever the file sets.
//!
//! ```toml
//! port = "/dev/ttyACM0"
//! baud_rate = 1152000
//! width = 480
//! height = 320
//! tile_size = 16
//! orientation = "landscape"
//! brightness = 60
//! font = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smart_display::{Geometry, Orientation};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default device for USB-attached smart displays
pub const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Baud rate the display firmware ships with
pub const DEFAULT_BAUD: u32 = 1_152_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Serial port path
    pub port: String,
    pub baud_rate: u32,
    /// Display width in pixels
    pub width: u16,
    /// Display height in pixels
    pub height: u16,
    /// Side of a damage tile in pixels
    pub tile_size: u16,
    /// Bytes per write when sending a full frame
    pub segment_size: usize,
    /// Refresh interval in milliseconds
    pub interval_ms: u64,
    pub orientation: Orientation,
    /// Brightness 0-100; left untouched when unset
    pub brightness: Option<u8>,
    /// TrueType font for text; without one only graphics are drawn
    pub font: Option<PathBuf>,
    pub font_size: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD,
            width: 480,
            height: 320,
            tile_size: 16,
            segment_size: 480 * 8,
            interval_ms: 1000,
            orientation: Orientation::Landscape,
            brightness: None,
            font: None,
            font_size: 16.0,
        }
    }
}

impl DisplayConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if let Some(level) = config.brightness {
            anyhow::ensure!(level <= 100, "brightness must be 0-100, got {}", level);
        }
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Validated display geometry
    pub fn geometry(&self) -> Result<Geometry> {
        Geometry::new(self.width, self.height, self.tile_size)
            .context("Display geometry rejected")
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
