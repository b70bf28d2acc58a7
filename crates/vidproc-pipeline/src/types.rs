//! Pipeline data model
//!
//! States, identifiers and the payloads capture devices report.

use std::fmt;

use vidproc_format::VideoFrameDescriptor;

/// Capture device lifecycle state
///
/// Only `Ready → Starting` and `Capturing → Stopping` are written by the
/// coordinator itself, immediately before the corresponding command. Every
/// other transition comes from a device callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureDeviceState {
    /// Attached, not yet reported
    #[default]
    Unknown,
    /// Idle, accepts start and input changes
    Ready,
    /// Start issued
    Starting,
    /// Delivering frames
    Capturing,
    /// Stop issued
    Stopping,
}

/// Renderer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererState {
    /// No renderer
    #[default]
    Unknown,
    /// Build and start issued
    Starting,
    /// Built, waiting for the first frame
    Ready,
    /// Presenting frames
    Rendering,
    /// Stop issued
    Stopping,
    /// Stopped, awaiting removal
    Stopped,
    /// Every build attempt failed; waits for an explicit retry
    Failed,
}

impl fmt::Display for CaptureDeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for RendererState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Capture device identifier, assigned by discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device-{}", self.0)
    }
}

/// Capture input connector identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureInputId(pub i64);

impl fmt::Display for CaptureInputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input-{}", self.0)
    }
}

/// Input connector offered by a capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureInput {
    /// Identifier passed to `select_input`
    pub id: CaptureInputId,

    /// Connector name, e.g. "HDMI" or "SDI"
    pub name: String,
}

impl CaptureInput {
    /// Create an input
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: CaptureInputId(id),
            name: name.into(),
        }
    }
}

/// Captured frame with owned payload
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Payload shape
    pub descriptor: VideoFrameDescriptor,

    /// Capture timestamp in timing clock ticks
    pub timestamp: i64,

    /// Payload bytes
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Borrow as a view
    #[must_use]
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            descriptor: self.descriptor,
            timestamp: self.timestamp,
            data: &self.data,
        }
    }
}

/// Borrowed frame handed to a renderer
///
/// After conversion the payload points into the converter's reused buffer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Payload shape
    pub descriptor: VideoFrameDescriptor,

    /// Capture timestamp in timing clock ticks
    pub timestamp: i64,

    /// Payload bytes
    pub data: &'a [u8],
}

/// Signal timing of the captured stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMode {
    /// Active width in pixels
    pub width: u32,

    /// Active height in lines
    pub height: u32,

    /// Frame rate in Hz
    pub refresh_rate_hz: f64,
}

impl DisplayMode {
    /// Create a display mode
    #[must_use]
    pub const fn new(width: u32, height: u32, refresh_rate_hz: f64) -> Self {
        Self {
            width,
            height,
            refresh_rate_hz,
        }
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

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{:.2}", self.width, self.height, self.refresh_rate_hz)
    }
}

/// Color space signalled by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// Not signalled
    #[default]
    Unknown,
    /// Rec.601, 525 lines
    Rec601_525,
    /// Rec.601, 625 lines
    Rec601_625,
    /// Rec.709
    Rec709,
    /// BT.2020
    Bt2020,
}

/// Electro-optical transfer function signalled by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Eotf {
    /// Not signalled
    #[default]
    Unknown,
    /// Standard dynamic range gamma
    Sdr,
    /// SMPTE ST 2084 perceptual quantizer
    Pq,
    /// Hybrid log-gamma
    Hlg,
}

/// CIE 1931 xy chromaticity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CieXy {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
}

impl CieXy {
    /// Create a chromaticity
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// HDR static metadata
///
/// Compared by value; a renderer only receives it when it differs from what
/// it last received.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HdrMetadata {
    /// Mastering display red primary
    pub display_primary_red: CieXy,
    /// Mastering display green primary
    pub display_primary_green: CieXy,
    /// Mastering display blue primary
    pub display_primary_blue: CieXy,
    /// Mastering display white point
    pub white_point: CieXy,
    /// Minimum mastering luminance in cd/m²
    pub mastering_min_luminance: f64,
    /// Maximum mastering luminance in cd/m²
    pub mastering_max_luminance: f64,
    /// Maximum content light level in cd/m²
    pub max_cll: f64,
    /// Maximum frame-average light level in cd/m²
    pub max_fall: f64,
}

/// Video format reported by the capture device
#[derive(Debug, Clone, PartialEq)]
pub struct VideoState {
    /// Frame payload shape
    pub descriptor: VideoFrameDescriptor,

    /// Signal timing
    pub display_mode: DisplayMode,

    /// Signalled color space
    pub color_space: ColorSpace,

    /// Signalled transfer function
    pub eotf: Eotf,

    /// HDR static metadata, if present
    pub hdr: Option<HdrMetadata>,

    /// Whether a usable signal is present
    pub valid: bool,
}

impl VideoState {
    /// A state that reports no usable signal
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            descriptor: VideoFrameDescriptor::default(),
            display_mode: DisplayMode::new(0, 0, 0.0),
            color_space: ColorSpace::Unknown,
            eotf: Eotf::Unknown,
            hdr: None,
            valid: false,
        }
    }
}

/// Input lock status reported by the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputLockStatus {
    /// Not reported
    #[default]
    Unknown,
    /// Locked to an incoming signal
    Locked,
    /// No signal lock
    Unlocked,
}

/// Signal encoding detected on the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEncoding {
    /// YCbCr 4:2:2
    Yuv422,
    /// RGB 4:4:4
    Rgb444,
}

/// Card-level status, mostly diagnostic
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardState {
    /// Input lock
    pub input_lock: InputLockStatus,

    /// Detected display mode
    pub display_mode: Option<DisplayMode>,

    /// Detected encoding
    pub encoding: Option<InputEncoding>,

    /// Detected bit depth per component
    pub bit_depth: Option<u8>,

    /// Free-form diagnostics
    pub diagnostics: Vec<String>,
}
