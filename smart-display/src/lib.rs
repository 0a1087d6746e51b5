//! Smart Display Update Engine
//!
//! Drives a 480×320 (or similar) RGB565 display attached over a one-way
//! serial link. A local framebuffer is rendered on the host; each update
//! sends only the tiles whose pixels changed since the last transmission.
//!
//! # Architecture
//!
//! ```text
//! Application (drawing, text)
//!     │
//!     ▼
//! ┌──────────────┐    ┌──────────────┐
//! │ Framebuffer  │◄───│ DamageTracker│  snapshot of last-sent pixels
//! └──────────────┘    └──────┬───────┘
//!                            ▼
//!                   ┌──────────────────┐
//!                   │ DisplayController│  frames + RGB565 payloads
//!                   └────────┬─────────┘
//!                            ▼  capacity-1 channel
//!                   ┌──────────────────┐
//!                   │ Transport writer │  single thread owns the link
//!                   └────────┬─────────┘
//!                            ▼
//!                  serial port / CaptureLink
//! ```
//!
//! # Wire format
//!
//! Every command is a 6-byte frame carrying four 10-bit coordinates and an
//! opcode. Pixel data follows a `DISPLAY_BITMAP` frame as little-endian RGB565.
//! The device never answers, so the tracker commits its snapshot as soon as a
//! tile has been handed to the transport.

pub mod canvas;
pub mod capture;
pub mod color;
pub mod command;
pub mod controller;
pub mod damage;
pub mod error;
pub mod geometry;
pub mod text;
pub mod transport;

// Re-export main types
pub use canvas::{Canvas, Framebuffer};
pub use capture::CaptureLink;
pub use color::Color;
pub use command::{Command, Opcode, Orientation};
pub use controller::{DisplayController, UpdateMode, UpdateReport};
pub use damage::{DamageTracker, TileCommit};
pub use error::{Error, Result};
pub use geometry::{Geometry, Rect, Tile};
pub use text::FontRenderer;
pub use transport::{LinkStats, Transport};
