//! Events drained by the coordination context
//!
//! Everything that can change desired or actual state arrives here, in
//! order, over a single unbounded queue.

use vidproc_format::ConversionError;

use crate::actor::CaptureDevice;
use crate::config::RendererSettings;
use crate::types::{CaptureDeviceState, CaptureInputId, CardState, DeviceId, RendererState, VideoState};

/// Intent from the host
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Switch to a device, or detach with `None`
    SelectDevice(Option<DeviceId>),
    /// Switch input on the attached device
    SelectInput(CaptureInputId),
    /// Rebuild the renderer; clears a `Failed` state
    RestartRenderer,
    /// Lightweight renderer reset
    ResetRenderer,
    /// Set full-screen intent; rebuilds the renderer
    SetFullScreen(bool),
    /// Flip full-screen intent; rebuilds the renderer
    ToggleFullScreen,
    /// Set the capture timing offset and reset the renderer
    SetTimingOffsetMs(i32),
    /// Change the renderer queue limit live
    SetFrameQueueMaxSize(usize),
    /// Replace renderer settings; rebuilds the renderer
    UpdateRendererSettings(RendererSettings),
    /// Tear everything down and stop
    Terminate,
}

/// Event for the coordinator
#[derive(Debug)]
pub enum PipelineEvent {
    /// Discovery found a device; ownership moves into the pipeline
    DeviceFound(Box<dyn CaptureDevice>),

    /// Discovery lost a device
    DeviceLost(DeviceId),

    /// Device lifecycle callback
    DeviceStateChanged {
        /// Reporting device
        device: DeviceId,
        /// New state
        state: CaptureDeviceState,
    },

    /// Card status callback
    CardStateChanged {
        /// Reporting device
        device: DeviceId,
        /// New card status
        state: CardState,
    },

    /// Video format callback
    VideoStateChanged {
        /// Reporting device
        device: DeviceId,
        /// New video state
        state: VideoState,
        /// Whether the live renderer accepted it; `true` when none was live
        renderer_accepted: bool,
    },

    /// A frame could not be converted for the renderer
    ConversionFailed {
        /// Reporting device
        device: DeviceId,
        /// Converter error
        error: ConversionError,
    },

    /// Renderer lifecycle callback
    RendererStateChanged {
        /// Renderer instance the event belongs to
        generation: u64,
        /// New state
        state: RendererState,
    },

    /// Renderer detail text
    RendererDetail {
        /// Renderer instance the event belongs to
        generation: u64,
        /// Detail text
        detail: String,
    },

    /// Host intent
    Command(UserCommand),

    /// Scheduled tick
    Tick,
}

impl From<UserCommand> for PipelineEvent {
    fn from(command: UserCommand) -> Self {
        PipelineEvent::Command(command)
    }
}
