//! Capture-side delivery path
//!
//! [`CaptureEventSink`] is the only pipeline code that runs on capture
//! threads. Frames go straight to the renderer when the
//! [`FrameDeliveryGate`] is open; everything else is queued for the
//! coordinator in arrival order.
//!
//! The delivery target is installed by the coordinator before it starts a
//! renderer and removed after the renderer reports `Stopped`. In both cases
//! the gate is closed, so the gate alone decides whether a frame is
//! forwarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vidproc_format::FrameConverter;

use crate::actor::RenderSink;
use crate::events::PipelineEvent;
use crate::gate::FrameDeliveryGate;
use crate::negotiation::NegotiatedMediaFormat;
use crate::types::{CaptureDeviceState, CardState, DeviceId, FrameView, HdrMetadata, RendererState, VideoFrame, VideoState};

/// Renderer plus the converter feeding it
pub(crate) struct DeliveryTarget {
    renderer: Arc<dyn RenderSink>,
    converter: FrameConverter,
    format: NegotiatedMediaFormat,
    last_hdr: Option<HdrMetadata>,
    conversion_failed: bool,
}

impl DeliveryTarget {
    pub(crate) fn new(
        renderer: Arc<dyn RenderSink>,
        converter: FrameConverter,
        format: NegotiatedMediaFormat,
    ) -> Self {
        let last_hdr = format.hdr;
        Self {
            renderer,
            converter,
            format,
            last_hdr,
            conversion_failed: false,
        }
    }

    /// Offer a live video state; `false` asks for a rebuild
    fn offer_video_state(&mut self, state: &VideoState) -> bool {
        if !self.format.is_compatible_with(state) {
            debug!(
                "Video state {}x{} {:?} incompatible with negotiated format",
                state.descriptor.width, state.descriptor.height, state.descriptor.pixel_format
            );
            return false;
        }

        if !self.renderer.on_video_state(state) {
            return false;
        }

        // HDR metadata only goes out when it changed
        if let Some(hdr) = state.hdr.filter(|h| Some(*h) != self.last_hdr) {
            if let Err(e) = self.renderer.set_hdr_metadata(&hdr) {
                warn!("Renderer rejected HDR metadata: {}", e);
                return false;
            }
            self.last_hdr = Some(hdr);
        }

        true
    }
}

/// Capture-side counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Frames handed to the renderer
    pub frames_delivered: u64,

    /// Frames dropped because the gate was closed
    pub frames_dropped: u64,

    /// Frames the converter rejected
    pub conversion_failures: u64,
}

#[derive(Debug, Default)]
struct DeliveryCounters {
    delivered: AtomicU64,
    dropped: AtomicU64,
    conversion_failures: AtomicU64,
}

/// State shared between the coordinator and capture threads
#[derive(Default)]
pub(crate) struct DeliveryShared {
    gate: FrameDeliveryGate,
    target: Mutex<Option<DeliveryTarget>>,
    counters: DeliveryCounters,
}

impl DeliveryShared {
    pub(crate) fn gate(&self) -> &FrameDeliveryGate {
        &self.gate
    }

    pub(crate) fn install(&self, target: DeliveryTarget) {
        *self.target.lock() = Some(target);
    }

    pub(crate) fn clear(&self) {
        self.target.lock().take();
    }

    pub(crate) fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            frames_delivered: self.counters.delivered.load(Ordering::Relaxed),
            frames_dropped: self.counters.dropped.load(Ordering::Relaxed),
            conversion_failures: self.counters.conversion_failures.load(Ordering::Relaxed),
        }
    }
}

/// Callback sink handed to a capture device on attach
///
/// Cheap to clone; every method is safe to call from any thread and never
/// blocks on the coordinator.
#[derive(Clone)]
pub struct CaptureEventSink {
    device: DeviceId,
    events: mpsc::UnboundedSender<PipelineEvent>,
    shared: Arc<DeliveryShared>,
}

impl CaptureEventSink {
    pub(crate) fn new(
        device: DeviceId,
        events: mpsc::UnboundedSender<PipelineEvent>,
        shared: Arc<DeliveryShared>,
    ) -> Self {
        Self {
            device,
            events,
            shared,
        }
    }

    /// Device this sink belongs to
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.device
    }

    /// Report a lifecycle state change
    pub fn device_state_changed(&self, state: CaptureDeviceState) {
        self.post(PipelineEvent::DeviceStateChanged {
            device: self.device,
            state,
        });
    }

    /// Report card status
    pub fn card_state_changed(&self, state: CardState) {
        self.post(PipelineEvent::CardStateChanged {
            device: self.device,
            state,
        });
    }

    /// Report a video format change
    ///
    /// A live renderer sees the state first; the coordinator always gets it.
    pub fn video_state_changed(&self, state: VideoState) {
        // No live renderer means nothing can reject the state
        let mut renderer_accepted = true;

        if self.shared.gate.is_open() {
            if let Some(target) = self.shared.target.lock().as_mut() {
                renderer_accepted = target.offer_video_state(&state);
            }
        }

        self.post(PipelineEvent::VideoStateChanged {
            device: self.device,
            state,
            renderer_accepted,
        });
    }

    /// Deliver a captured frame
    pub fn video_frame(&self, frame: &VideoFrame) {
        if !self.shared.gate.is_open() {
            self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut slot = self.shared.target.lock();
        let Some(target) = slot.as_mut() else {
            self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let descriptor = target.converter.output_descriptor();
        match target.converter.convert(&frame.data) {
            Ok(data) => {
                let view = FrameView {
                    descriptor,
                    timestamp: frame.timestamp,
                    data,
                };
                target.renderer.on_video_frame(&view);
                self.shared.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(error) => {
                self.shared
                    .counters
                    .conversion_failures
                    .fetch_add(1, Ordering::Relaxed);

                // One report per renderer instance is enough to force a restart
                if !target.conversion_failed {
                    target.conversion_failed = true;
                    warn!("Frame conversion failed on {}: {}", self.device, error);
                    self.post(PipelineEvent::ConversionFailed {
                        device: self.device,
                        error,
                    });
                }
            }
        }
    }

    fn post(&self, event: PipelineEvent) {
        if self.events.send(event).is_err() {
            debug!("Pipeline gone, dropping event from {}", self.device);
        }
    }
}

/// Callback sink handed to a renderer at build time
#[derive(Debug, Clone)]
pub struct RendererEventSink {
    generation: u64,
    events: mpsc::UnboundedSender<PipelineEvent>,
}

impl RendererEventSink {
    pub(crate) fn new(generation: u64, events: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { generation, events }
    }

    /// Report a lifecycle state change
    pub fn state_changed(&self, state: RendererState) {
        self.post(PipelineEvent::RendererStateChanged {
            generation: self.generation,
            state,
        });
    }

    /// Report detail text
    pub fn detail(&self, detail: impl Into<String>) {
        self.post(PipelineEvent::RendererDetail {
            generation: self.generation,
            detail: detail.into(),
        });
    }

    fn post(&self, event: PipelineEvent) {
        if self.events.send(event).is_err() {
            debug!("Pipeline gone, dropping renderer event");
        }
    }
}
