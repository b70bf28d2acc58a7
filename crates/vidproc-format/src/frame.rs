//! Frame descriptors

use crate::format::PixelFormat;

/// Shape of a captured frame payload
///
/// Produced by the capture source and consumed by the converter. A
/// descriptor never changes once attached to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VideoFrameDescriptor {
    /// Pixel encoding of the payload
    pub pixel_format: PixelFormat,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Payload size in bytes
    pub buffer_size: usize,
}

impl VideoFrameDescriptor {
    /// Create a descriptor
    #[must_use]
    pub const fn new(pixel_format: PixelFormat, width: u32, height: u32, buffer_size: usize) -> Self {
        Self {
            pixel_format,
            width,
            height,
            buffer_size,
        }
    }

    /// Pixel count
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Same descriptor with a different format and size
    #[must_use]
    pub const fn with_format(&self, pixel_format: PixelFormat, buffer_size: usize) -> Self {
        Self {
            pixel_format,
            width: self.width,
            height: self.height,
            buffer_size,
        }
    }
}
