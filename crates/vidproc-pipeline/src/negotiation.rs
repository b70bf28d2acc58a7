//! Renderer format negotiation
//!
//! Snapshot of what a renderer is built against, rebuilt on every renderer
//! (re)start.

use vidproc_format::{PixelFormat, VideoConversion};

use crate::colorimetry::{derive_colorimetry, Colorimetry, ColorimetryError, ColorimetryOverrides};
use crate::config::{RendererSettings, StartStopTimeMethod};
use crate::types::{ColorSpace, Eotf, HdrMetadata, VideoState};

/// Parameters passed to a renderer build attempt
#[derive(Debug, Clone, PartialEq)]
pub struct RendererParams {
    /// Forced colorimetry values
    pub colorimetry_overrides: ColorimetryOverrides,

    /// Whether the renderer queues frames
    pub frame_queue_enabled: bool,

    /// Maximum renderer queue depth
    pub frame_queue_max_size: usize,

    /// Frame timestamping method
    pub start_stop_time_method: StartStopTimeMethod,

    /// Conversion applied before delivery
    pub video_conversion: VideoConversion,
}

impl RendererParams {
    /// Full parameter set for the preferred backend
    #[must_use]
    pub fn from_settings(settings: &RendererSettings) -> Self {
        Self {
            colorimetry_overrides: settings.colorimetry_overrides,
            frame_queue_enabled: settings.frame_queue_enabled,
            frame_queue_max_size: settings.frame_queue_max_size,
            start_stop_time_method: settings.start_stop_time_method,
            video_conversion: settings.video_conversion,
        }
    }

    /// Parameter set for fallback backends: no colorimetry overrides
    #[must_use]
    pub fn reduced(&self) -> Self {
        Self {
            colorimetry_overrides: ColorimetryOverrides::default(),
            ..self.clone()
        }
    }
}

/// Format snapshot a renderer was built against
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedMediaFormat {
    /// Captured pixel format
    pub source_format: PixelFormat,

    /// Pixel format the renderer receives, after conversion
    pub pixel_format: PixelFormat,

    /// Conversion between the two
    pub conversion: VideoConversion,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Frame rate in Hz
    pub refresh_rate_hz: f64,

    /// Signalled color space
    pub color_space: ColorSpace,

    /// Signalled transfer function
    pub eotf: Eotf,

    /// Colorimetry the renderer is told
    pub colorimetry: Colorimetry,

    /// HDR metadata at build time
    pub hdr: Option<HdrMetadata>,
}

impl NegotiatedMediaFormat {
    /// Negotiate a format for `video` under `params`
    pub fn negotiate(video: &VideoState, params: &RendererParams) -> Result<Self, ColorimetryError> {
        let colorimetry = derive_colorimetry(video, &params.colorimetry_overrides)?;
        let source_format = video.descriptor.pixel_format;

        Ok(Self {
            source_format,
            pixel_format: params.video_conversion.output_format(source_format),
            conversion: params.video_conversion,
            width: video.descriptor.width,
            height: video.descriptor.height,
            refresh_rate_hz: video.display_mode.refresh_rate_hz,
            color_space: video.color_space,
            eotf: video.eotf,
            colorimetry,
            hdr: video.hdr,
        })
    }

    /// Whether a live `video` change can be applied without a rebuild
    ///
    /// HDR metadata changes are compatible; they are pushed separately.
    #[must_use]
    pub fn is_compatible_with(&self, video: &VideoState) -> bool {
        video.valid
            && video.descriptor.pixel_format == self.source_format
            && video.descriptor.width == self.width
            && video.descriptor.height == self.height
            && (video.display_mode.refresh_rate_hz - self.refresh_rate_hz).abs() < f64::EPSILON
            && video.color_space == self.color_space
            && video.eotf == self.eotf
    }

    /// Duration of one frame in milliseconds
    #[must_use]
    pub fn frame_duration_ms(&self) -> f64 {
        if self.refresh_rate_hz > 0.0 {
            1000.0 / self.refresh_rate_hz
        } else {
            0.0
        }
    }
}
