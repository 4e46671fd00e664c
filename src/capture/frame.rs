//! Still-frame data snapshotted from the live stream

use std::time::Instant;

/// An immutable still-image snapshot taken from the live video stream.
///
/// Created only by an explicit capture action while a session is active;
/// conceptually invalidated whenever a new session starts.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data, row-major
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// When the snapshot was taken
    pub timestamp: Instant,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
