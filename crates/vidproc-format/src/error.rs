//! Error types for frame conversion

use thiserror::Error;

use crate::format::PixelFormat;

/// Errors raised while configuring or running a frame formatter
///
/// All buffer checks happen before any destination byte is written, so a
/// failed conversion leaves the destination untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No formatter exists for this source/target pair
    #[error("Unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Source format
        from: PixelFormat,
        /// Requested target format
        to: PixelFormat,
    },

    /// Dimensions the layout cannot represent
    #[error("Invalid frame dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Frame width
        width: u32,
        /// Frame height
        height: u32,
        /// Which constraint failed
        reason: &'static str,
    },

    /// Source buffer is shorter than its computed layout
    #[error("Source buffer too small: need {expected} bytes, got {actual}")]
    SourceTooSmall {
        /// Bytes required
        expected: usize,
        /// Bytes provided
        actual: usize,
    },

    /// Destination buffer is shorter than the output frame size
    #[error("Destination buffer too small: need {expected} bytes, got {actual}")]
    DestinationTooSmall {
        /// Bytes required
        expected: usize,
        /// Bytes provided
        actual: usize,
    },

    /// `format_frame` called before `configure`
    #[error("Formatter has not been configured with a video state")]
    NotConfigured,
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

impl ConversionError {
    pub(crate) fn invalid_dimensions(width: u32, height: u32, reason: &'static str) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason,
        }
    }

    /// Whether the error comes from the frame layout rather than buffer sizing
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedConversion { .. } | Self::InvalidDimensions { .. }
        )
    }
}
