//! External collaborators
//!
//! Traits for the capture device, the renderer, the renderer factory and the
//! host observer. The coordinator only ever talks to these seams.

use std::fmt;
use std::sync::Arc;

use crate::config::RendererBackend;
use crate::delivery::{CaptureEventSink, RendererEventSink};
use crate::error::RendererError;
use crate::negotiation::{NegotiatedMediaFormat, RendererParams};
use crate::types::{
    CaptureDeviceState, CaptureInput, CaptureInputId, CardState, DeviceId, FrameView, HdrMetadata,
    RendererState, VideoState,
};

/// Reference clock exposed by a capture device
///
/// Renderers slave presentation to it, which is why a renderer must be torn
/// down before the device that owns its clock.
pub trait TimingClock: Send + Sync {
    /// Short human-readable description
    fn description(&self) -> String;

    /// Current time in ticks
    fn now_ticks(&self) -> i64;

    /// Tick rate
    fn ticks_per_second(&self) -> i64;
}

/// A capture source
///
/// Commands may complete synchronously; state changes are reported through
/// the [`CaptureEventSink`] installed with [`set_event_sink`](Self::set_event_sink),
/// from any thread.
pub trait CaptureDevice: Send {
    /// Discovery-assigned identifier
    fn id(&self) -> DeviceId;

    /// Display name
    fn name(&self) -> String;

    /// Install or remove the callback sink
    fn set_event_sink(&mut self, sink: Option<CaptureEventSink>);

    /// Start capturing on the current input
    fn start_capture(&mut self);

    /// Stop capturing
    fn stop_capture(&mut self);

    /// Switch input connector; only valid while `Ready`
    fn select_input(&mut self, input: CaptureInputId);

    /// Shift frame timestamps by `offset_ms`
    fn set_timing_offset_ms(&mut self, offset_ms: i32);

    /// Currently selected input, if any
    fn current_input_id(&self) -> Option<CaptureInputId>;

    /// Input connectors this device offers
    fn supported_inputs(&self) -> Vec<CaptureInput>;

    /// Reference clock, available while capturing
    fn timing_clock(&self) -> Option<Arc<dyn TimingClock>>;

    /// Frames captured since start
    fn captured_frame_count(&self) -> u64 {
        0
    }

    /// Frames the hardware missed since start
    fn missed_frame_count(&self) -> u64 {
        0
    }

    /// Hardware capture latency in milliseconds
    fn hardware_latency_ms(&self) -> Option<f64> {
        None
    }
}

impl fmt::Debug for dyn CaptureDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureDevice")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// A renderer instance
///
/// Shared between the coordinator and the capture thread, so every method
/// takes `&self`. State changes are reported through the
/// [`RendererEventSink`] passed at build time.
pub trait RenderSink: Send + Sync {
    /// Start presenting; the renderer reports `Ready` then `Rendering`
    fn start(&self) -> Result<(), RendererError>;

    /// Stop presenting; the renderer reports `Stopped`
    fn stop(&self) -> Result<(), RendererError>;

    /// Lightweight resynchronization, not a rebuild
    fn reset(&self) -> Result<(), RendererError>;

    /// Offer a live video state; `false` means a rebuild is needed
    fn on_video_state(&self, state: &VideoState) -> bool;

    /// Replace HDR static metadata
    fn set_hdr_metadata(&self, hdr: &HdrMetadata) -> Result<(), RendererError>;

    /// Present one frame
    fn on_video_frame(&self, frame: &FrameView<'_>);

    /// Change the queue depth limit
    fn set_frame_queue_max_size(&self, max_size: usize);

    /// Frames waiting in the queue
    fn frame_queue_size(&self) -> usize;

    /// Latency from capture to renderer entry in milliseconds
    fn entry_latency_ms(&self) -> f64;

    /// Latency from capture to presentation in milliseconds; negative is late
    fn exit_latency_ms(&self) -> f64;

    /// Frames dropped by the renderer
    fn dropped_frame_count(&self) -> u64;
}

/// Everything a renderer build attempt needs
#[derive(Clone)]
pub struct RendererBuildRequest {
    /// Backend to build
    pub backend: RendererBackend,

    /// Format to build against
    pub format: NegotiatedMediaFormat,

    /// Build parameters
    pub params: RendererParams,

    /// Device clock to slave to
    pub timing_clock: Arc<dyn TimingClock>,

    /// Present on a full-screen surface
    pub full_screen: bool,

    /// Where the renderer reports state and details
    pub events: RendererEventSink,
}

impl fmt::Debug for RendererBuildRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererBuildRequest")
            .field("backend", &self.backend)
            .field("format", &self.format)
            .field("params", &self.params)
            .field("full_screen", &self.full_screen)
            .finish_non_exhaustive()
    }
}

/// Builds renderers for backend identifiers
pub trait RendererFactory: Send {
    /// Construct a renderer; it is started separately
    fn build(&mut self, request: &RendererBuildRequest) -> Result<Arc<dyn RenderSink>, RendererError>;
}

/// Host notifications
///
/// Only the first two are required; the rest default to no-ops.
pub trait PipelineObserver: Send {
    /// Unrecoverable inconsistency; the pipeline is stopping
    fn on_fatal_error(&mut self, message: &str);

    /// Either lifecycle state changed
    fn on_lifecycle_state_changed(&mut self, capture: CaptureDeviceState, renderer: RendererState);

    /// Every renderer build attempt failed
    fn on_renderer_failed(&mut self, _message: &str) {}

    /// Renderer detail text
    fn on_renderer_detail(&mut self, _detail: &str) {}

    /// Card status from the attached device
    fn on_card_state(&mut self, _state: &CardState) {}

    /// Inputs of a newly attached device, with the selected one
    fn on_inputs_changed(&mut self, _inputs: &[CaptureInput], _selected: Option<CaptureInputId>) {}

    /// Full-screen surface intent changed
    fn on_full_screen_changed(&mut self, _full_screen: bool) {}

    /// Discovered device set changed
    fn on_devices_changed(&mut self, _devices: &[(DeviceId, String)]) {}

    /// Teardown complete
    fn on_terminated(&mut self) {}
}

/// Observer that only logs
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl PipelineObserver for LoggingObserver {
    fn on_fatal_error(&mut self, message: &str) {
        tracing::error!("Pipeline fatal error: {}", message);
    }

    fn on_lifecycle_state_changed(&mut self, capture: CaptureDeviceState, renderer: RendererState) {
        tracing::debug!("Lifecycle: capture={} renderer={}", capture, renderer);
    }
}
