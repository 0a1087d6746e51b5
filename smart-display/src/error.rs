//! Error types for the display engine

use thiserror::Error;

/// Errors raised by the display engine.
///
/// Link write failures never show up here; the writer thread logs and drops
/// them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid display geometry: {0}")]
    InvalidGeometry(String),

    #[error("canvas is {found_width}x{found_height}, tracker expects {width}x{height}")]
    CanvasMismatch {
        width: u16,
        height: u16,
        found_width: u16,
        found_height: u16,
    },

    #[error("transport is closed")]
    TransportClosed,

    #[error("link writer thread panicked")]
    WriterPanicked,

    #[error("failed to spawn link writer: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to load font: {0}")]
    Font(String),

    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
