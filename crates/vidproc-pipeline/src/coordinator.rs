//! Lifecycle coordinator
//!
//! Owns the attached capture device and the renderer, and sequences their
//! lifecycles. Every event is applied to local state and followed by a
//! reconciliation pass driven by [`rules::next_action`](crate::rules::next_action).
//!
//! A pass issues at most one actor command. The command's callback comes
//! back through the event queue and triggers the next pass, so the
//! coordinator is never re-entered while it holds its own state.
//!
//! # Device switch
//!
//! ```text
//!   SelectDevice(A) while B renders
//!        │
//!        ▼
//!   close gate, stop renderer ──► Stopped ──► stop capture on B
//!                                                   │
//!                                                 Ready
//!                                                   ▼
//!                         release B, attach A, select input, start capture
//!                                                   │
//!                                              Capturing
//!                                                   ▼
//!                                     build renderer (fallback chain)
//! ```

use std::collections::BTreeMap;
use std::iter;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use vidproc_format::FrameConverter;

use crate::actor::{CaptureDevice, PipelineObserver, RenderSink, RendererBuildRequest, RendererFactory, TimingClock};
use crate::config::{PipelineConfig, RendererBackend, RendererSettings};
use crate::delivery::{CaptureEventSink, DeliveryShared, DeliveryStats, DeliveryTarget, RendererEventSink};
use crate::error::{PipelineError, RendererError, RendererErrorKind, Result};
use crate::events::{PipelineEvent, UserCommand};
use crate::gate::FrameDeliveryGate;
use crate::negotiation::{NegotiatedMediaFormat, RendererParams};
use crate::rules::{self, Action, Snapshot};
use crate::tuner::{classify_exit_latency, classify_hardware_latency, LatencyAutoTuner, RendererTelemetry};
use crate::types::{CaptureDeviceState, CaptureInput, CaptureInputId, CardState, DeviceId, RendererState, VideoState};

/// Sequences capture device and renderer lifecycles
pub struct LifecycleCoordinator {
    config: PipelineConfig,
    factory: Box<dyn RendererFactory>,
    observer: Box<dyn PipelineObserver>,
    events: mpsc::UnboundedSender<PipelineEvent>,
    delivery: Arc<DeliveryShared>,
    tuner: LatencyAutoTuner,

    // Capture side
    available: BTreeMap<DeviceId, Box<dyn CaptureDevice>>,
    device: Option<Box<dyn CaptureDevice>>,
    device_lost: bool,
    device_state: CaptureDeviceState,
    desired_device: Option<DeviceId>,
    desired_input: Option<CaptureInputId>,
    current_input: Option<CaptureInputId>,
    inputs: Vec<CaptureInput>,
    video_state: Option<VideoState>,
    timing_offset_ms: i32,

    // Render side
    renderer: Option<Arc<dyn RenderSink>>,
    renderer_state: RendererState,
    renderer_generation: u64,
    renderer_format: Option<NegotiatedMediaFormat>,
    renderer_backend: Option<RendererBackend>,
    want_restart: bool,
    full_screen: bool,
    full_screen_surface: bool,

    want_terminate: bool,
    terminated: bool,
    reported: (CaptureDeviceState, RendererState),
}

impl LifecycleCoordinator {
    /// Create a coordinator
    ///
    /// `events` is the sender side of the queue the caller drains into
    /// [`handle_event`](Self::handle_event). Device and renderer callback
    /// sinks are built from it.
    pub fn new(
        config: PipelineConfig,
        factory: Box<dyn RendererFactory>,
        observer: Box<dyn PipelineObserver>,
        events: mpsc::UnboundedSender<PipelineEvent>,
    ) -> Self {
        let tuner = LatencyAutoTuner::new(&config);
        let timing_offset_ms = config.initial_timing_offset_ms;
        let full_screen = config.start_full_screen;

        Self {
            config,
            factory,
            observer,
            events,
            delivery: Arc::new(DeliveryShared::default()),
            tuner,
            available: BTreeMap::new(),
            device: None,
            device_lost: false,
            device_state: CaptureDeviceState::Unknown,
            desired_device: None,
            desired_input: None,
            current_input: None,
            inputs: Vec::new(),
            video_state: None,
            timing_offset_ms,
            renderer: None,
            renderer_state: RendererState::Unknown,
            renderer_generation: 0,
            renderer_format: None,
            renderer_backend: None,
            want_restart: false,
            full_screen,
            full_screen_surface: false,
            want_terminate: false,
            terminated: false,
            reported: (CaptureDeviceState::Unknown, RendererState::Unknown),
        }
    }

    /// Apply one event and reconcile
    ///
    /// An `Err` is always an invariant violation. The observer has been told
    /// and the coordinator ignores every later event.
    pub fn handle_event(&mut self, event: PipelineEvent) -> Result<()> {
        if self.terminated {
            debug!("Coordinator terminated, ignoring {:?}", event);
            return Ok(());
        }

        match self.dispatch(event).and_then(|()| self.reconcile()) {
            Ok(()) => {
                self.report_lifecycle();
                Ok(())
            }
            Err(err) => {
                error!("Pipeline stopping: {}", err);
                self.terminated = true;
                self.observer.on_fatal_error(&err.to_string());
                Err(err)
            }
        }
    }

    // ===== STATE ACCESSORS =====

    /// Attached device state
    pub fn capture_state(&self) -> CaptureDeviceState {
        self.device_state
    }

    /// Renderer state
    pub fn renderer_state(&self) -> RendererState {
        self.renderer_state
    }

    /// Attached device
    pub fn attached_device(&self) -> Option<DeviceId> {
        self.device.as_ref().map(|d| d.id())
    }

    /// Device the pipeline is converging to
    pub fn desired_device(&self) -> Option<DeviceId> {
        self.desired_device
    }

    /// Input the pipeline is converging to
    pub fn desired_input(&self) -> Option<CaptureInputId> {
        self.desired_input
    }

    /// Input last selected on the device
    pub fn current_input(&self) -> Option<CaptureInputId> {
        self.current_input
    }

    /// Discovered devices that are not attached
    pub fn available_devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.available.keys().copied()
    }

    /// Format the live renderer was built against
    pub fn negotiated_format(&self) -> Option<&NegotiatedMediaFormat> {
        self.renderer_format.as_ref()
    }

    /// Backend of the live renderer
    pub fn renderer_backend(&self) -> Option<&RendererBackend> {
        self.renderer_backend.as_ref()
    }

    /// Capture timing offset in ms
    pub fn timing_offset_ms(&self) -> i32 {
        self.timing_offset_ms
    }

    /// Full-screen intent
    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Renderer settings currently in effect
    pub fn renderer_settings(&self) -> &RendererSettings {
        &self.config.renderer
    }

    /// Handle to the frame delivery gate
    pub fn delivery_gate(&self) -> FrameDeliveryGate {
        self.delivery.gate().clone()
    }

    /// Capture-side delivery counters
    pub fn delivery_stats(&self) -> DeliveryStats {
        self.delivery.stats()
    }

    /// Whether teardown completed or a fatal error occurred
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    // ===== EVENT HANDLING =====

    fn dispatch(&mut self, event: PipelineEvent) -> Result<()> {
        match event {
            PipelineEvent::DeviceFound(device) => self.on_device_found(device),
            PipelineEvent::DeviceLost(id) => return self.on_device_lost(id),
            PipelineEvent::DeviceStateChanged { device, state } => {
                if self.accepts_device_event(device) {
                    debug!("Capture device {} state: {}", device, state);
                    self.device_state = state;
                }
            }
            PipelineEvent::CardStateChanged { device, state } => {
                if self.accepts_device_event(device) {
                    self.on_card_state(&state);
                }
            }
            PipelineEvent::VideoStateChanged {
                device,
                state,
                renderer_accepted,
            } => {
                if self.accepts_device_event(device) {
                    self.on_video_state(state, renderer_accepted);
                }
            }
            PipelineEvent::ConversionFailed { device, error } => {
                if self.accepts_device_event(device) {
                    warn!("Restarting renderer after conversion failure: {}", error);
                    self.want_restart = true;
                }
            }
            PipelineEvent::RendererStateChanged { generation, state } => {
                if self.accepts_renderer_event(generation) {
                    self.on_renderer_state(state);
                }
            }
            PipelineEvent::RendererDetail { generation, detail } => {
                if self.accepts_renderer_event(generation) {
                    self.observer.on_renderer_detail(&detail);
                }
            }
            PipelineEvent::Command(command) => self.on_command(command),
            PipelineEvent::Tick => self.on_tick(),
        }

        Ok(())
    }

    fn accepts_device_event(&self, device: DeviceId) -> bool {
        let attached = self.attached_device() == Some(device);
        if !attached {
            warn!("Dropping stale event from {}", device);
        }
        attached
    }

    fn accepts_renderer_event(&self, generation: u64) -> bool {
        let current = self.renderer.is_some() && generation == self.renderer_generation;
        if !current {
            warn!("Dropping stale event from renderer #{}", generation);
        }
        current
    }

    fn on_device_found(&mut self, device: Box<dyn CaptureDevice>) {
        let id = device.id();
        let attached = self.attached_device() == Some(id);
        if self.available.contains_key(&id) || (attached && !self.device_lost) {
            warn!("Capture device {} reported twice, keeping the first", id);
            return;
        }
        if attached {
            // Re-plugged before the lost instance was released
            info!("Capture device {} is back, waiting for the old instance to go", id);
        }

        info!("Capture device found: {} ({})", device.name(), id);
        self.available.insert(id, device);

        if self.desired_device.is_none()
            && self.device.is_none()
            && self.config.auto_select_first_device
            && !self.want_terminate
        {
            info!("Selecting {} automatically", id);
            self.desired_device = Some(id);
        }

        self.report_devices();
    }

    fn on_device_lost(&mut self, id: DeviceId) -> Result<()> {
        let attached = self.attached_device() == Some(id);
        if attached && !self.device_lost {
            info!("Attached capture device {} lost", id);
            self.device_lost = true;
            if self.desired_device == Some(id) {
                self.desired_device = None;
            }
        } else if self.available.remove(&id).is_some() {
            info!("Capture device {} lost", id);
            if self.desired_device == Some(id) {
                self.desired_device = None;
            }
        } else if attached {
            debug!("Capture device {} already lost", id);
            return Ok(());
        } else {
            return Err(PipelineError::invariant(format!("lost unknown capture device {}", id)));
        }

        self.report_devices();
        Ok(())
    }

    fn on_card_state(&mut self, state: &CardState) {
        debug!(
            "Card state: lock={:?} mode={:?} encoding={:?} depth={:?}",
            state.input_lock, state.display_mode, state.encoding, state.bit_depth
        );
        self.observer.on_card_state(state);
    }

    fn on_video_state(&mut self, state: VideoState, renderer_accepted: bool) {
        debug!(
            "Video state: {} {} {:?}/{:?} valid={}",
            state.descriptor.pixel_format, state.display_mode, state.color_space, state.eotf, state.valid
        );

        let incompatible = self
            .renderer_format
            .as_ref()
            .is_some_and(|format| !format.is_compatible_with(&state));

        if !renderer_accepted || incompatible {
            info!("Video state not accepted by the renderer, requesting restart");
            self.want_restart = true;
        }

        // New signal, new chance for a failed renderer
        if self.renderer_state == RendererState::Failed {
            self.renderer_state = RendererState::Unknown;
        }

        self.video_state = Some(state);
    }

    fn on_renderer_state(&mut self, state: RendererState) {
        debug!("Renderer state: {}", state);
        self.renderer_state = state;

        match state {
            RendererState::Rendering => {
                info!("Renderer rendering");
                self.delivery.gate().open();
            }
            RendererState::Stopped => {
                info!("Renderer stopped");
                self.remove_renderer();
            }
            _ => self.delivery.gate().close(),
        }
    }

    fn on_command(&mut self, command: UserCommand) {
        debug!("Command: {:?}", command);

        match command {
            UserCommand::SelectDevice(id) => {
                if self.want_terminate {
                    warn!("Ignoring device selection during teardown");
                } else if let Some(id) = id.filter(|id| !self.knows_device(*id)) {
                    warn!("Ignoring selection of unknown device {}", id);
                } else if let Some(id) = id.filter(|id| self.device_lost && self.attached_device() == Some(*id)) {
                    warn!("Ignoring selection of {} until its lost instance is released", id);
                } else {
                    self.desired_device = id;
                }
            }
            UserCommand::SelectInput(input) => {
                if self.inputs.iter().any(|i| i.id == input) {
                    self.desired_input = Some(input);
                } else {
                    warn!("Ignoring selection of unsupported input {}", input);
                }
            }
            UserCommand::RestartRenderer => {
                if self.renderer_state == RendererState::Failed {
                    self.renderer_state = RendererState::Unknown;
                }
                self.want_restart = true;
            }
            UserCommand::ResetRenderer => self.reset_renderer(),
            UserCommand::SetFullScreen(full_screen) => self.set_full_screen(full_screen),
            UserCommand::ToggleFullScreen => self.set_full_screen(!self.full_screen),
            UserCommand::SetTimingOffsetMs(offset_ms) => self.set_timing_offset(offset_ms),
            UserCommand::SetFrameQueueMaxSize(max_size) => {
                self.config.renderer.frame_queue_max_size = max_size;
                if let Some(renderer) = &self.renderer {
                    renderer.set_frame_queue_max_size(max_size);
                }
            }
            UserCommand::UpdateRendererSettings(settings) => {
                info!("Renderer settings updated, preferred backend {}", settings.preferred_backend);
                self.config.renderer = settings;
                if self.renderer_state == RendererState::Failed {
                    self.renderer_state = RendererState::Unknown;
                }
                self.want_restart = true;
            }
            UserCommand::Terminate => {
                info!("Pipeline termination requested");
                self.desired_device = None;
                self.want_terminate = true;
            }
        }
    }

    fn on_tick(&mut self) {
        let telemetry = match (&self.renderer, self.renderer_state) {
            (Some(renderer), RendererState::Rendering) => Some(RendererTelemetry {
                queue_size: renderer.frame_queue_size(),
                exit_latency_ms: renderer.exit_latency_ms(),
                frame_duration_ms: self
                    .renderer_format
                    .as_ref()
                    .map_or(0.0, NegotiatedMediaFormat::frame_duration_ms),
            }),
            _ => None,
        };

        if let Some(t) = &telemetry {
            debug!(
                "Renderer exit latency {:.1} ms ({}), queue {}",
                t.exit_latency_ms,
                classify_exit_latency(t.exit_latency_ms, t.frame_duration_ms, &self.config.latency_bands),
                t.queue_size
            );
        }

        if self.device_state == CaptureDeviceState::Capturing {
            if let Some(latency) = self.device.as_ref().and_then(|d| d.hardware_latency_ms()) {
                debug!(
                    "Capture hardware latency {:.1} ms ({})",
                    latency,
                    classify_hardware_latency(latency, &self.config.latency_bands)
                );
            }
        }

        let decision = self.tuner.on_tick(telemetry);
        if let Some(delta) = decision.offset_delta_ms {
            info!("Latency tuner shifting timing offset by {} ms", delta);
            self.set_timing_offset(self.timing_offset_ms.saturating_add(delta));
        } else if decision.reset_renderer {
            info!("Latency tuner resetting backlogged renderer");
            self.reset_renderer();
        }
    }

    // ===== RECONCILIATION =====

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            desired_device: self.desired_device,
            attached_device: self.attached_device(),
            device_state: self.device_state,
            desired_input: self.desired_input,
            current_input: self.current_input,
            renderer_exists: self.renderer.is_some(),
            renderer_state: self.renderer_state,
            want_restart: self.want_restart,
            want_terminate: self.want_terminate,
            full_screen: self.full_screen,
            full_screen_surface: self.full_screen_surface,
            video_valid: self.video_state.as_ref().is_some_and(|v| v.valid),
        }
    }

    fn reconcile(&mut self) -> Result<()> {
        loop {
            let action = rules::next_action(&self.snapshot());
            debug!("Reconcile: {:?}", action);

            match action {
                Action::StopRenderer => self.stop_renderer(),
                Action::RestartRenderer => {
                    info!("Restarting renderer");
                    self.want_restart = false;
                    self.stop_renderer();
                }
                Action::StopCapture => self.stop_capture(),
                Action::ReleaseDevice => self.release_device(),
                Action::AttachDevice(id) => self.attach_device(id)?,
                Action::StartCapture(input) => self.start_capture(input),
                Action::ClearFullScreenSurface => {
                    info!("Releasing full-screen surface");
                    self.full_screen_surface = false;
                }
                Action::BuildRenderer => self.start_renderer()?,
                Action::CompleteTermination => self.complete_termination(),
                Action::Wait(reason) => debug!("Waiting: {}", reason),
                Action::Idle | Action::Steady => {}
            }

            if !action.continues_pass() {
                return Ok(());
            }
        }
    }

    fn attach_device(&mut self, id: DeviceId) -> Result<()> {
        let Some(mut device) = self.available.remove(&id) else {
            return Err(PipelineError::invariant(format!(
                "desired capture device {} is not available",
                id
            )));
        };

        info!("Attaching capture device {} ({})", device.name(), id);
        self.device_state = CaptureDeviceState::Unknown;
        self.device_lost = false;
        self.video_state = None;

        let sink = CaptureEventSink::new(id, self.events.clone(), Arc::clone(&self.delivery));
        device.set_event_sink(Some(sink));
        device.set_timing_offset_ms(self.timing_offset_ms);

        self.inputs = device.supported_inputs();
        self.current_input = None;
        self.desired_input = self.pick_input(device.current_input_id());
        self.observer.on_inputs_changed(&self.inputs, self.desired_input);

        self.device = Some(device);
        Ok(())
    }

    /// Device's own input first, then the preferred connector name, then the first input
    fn pick_input(&self, reported: Option<CaptureInputId>) -> Option<CaptureInputId> {
        reported
            .filter(|id| self.inputs.iter().any(|i| i.id == *id))
            .or_else(|| {
                self.inputs
                    .iter()
                    .find(|i| i.name == self.config.preferred_input_name)
                    .map(|i| i.id)
            })
            .or_else(|| self.inputs.first().map(|i| i.id))
    }

    fn release_device(&mut self) {
        let Some(mut device) = self.device.take() else {
            return;
        };

        let id = device.id();
        device.set_event_sink(None);

        self.device_state = CaptureDeviceState::Unknown;
        self.desired_input = None;
        self.current_input = None;
        self.inputs.clear();
        self.video_state = None;

        if self.device_lost {
            info!("Released lost capture device {}", id);
            self.device_lost = false;

            // A re-plugged instance waited in the available set
            if self.available.contains_key(&id)
                && self.desired_device.is_none()
                && self.config.auto_select_first_device
                && !self.want_terminate
            {
                info!("Selecting re-plugged {} automatically", id);
                self.desired_device = Some(id);
            }
        } else {
            info!("Released capture device {}", id);
            self.available.insert(id, device);
        }
    }

    fn start_capture(&mut self, input: CaptureInputId) {
        let Some(device) = self.device.as_mut() else {
            return;
        };

        info!("Starting capture on {} input {}", device.id(), input);
        device.select_input(input);
        self.current_input = Some(input);
        self.device_state = CaptureDeviceState::Starting;
        device.start_capture();
    }

    fn stop_capture(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };

        info!("Stopping capture on {}", device.id());
        self.device_state = CaptureDeviceState::Stopping;
        device.stop_capture();
        self.video_state = None;
    }

    fn stop_renderer(&mut self) {
        let Some(renderer) = self.renderer.clone() else {
            return;
        };

        // Gate first, so no frame reaches a stopping renderer
        self.delivery.gate().close();
        self.renderer_state = RendererState::Stopping;
        info!("Stopping renderer");

        if let Err(e) = renderer.stop() {
            warn!("Renderer stop failed, dropping it: {}", e);
            self.remove_renderer();
        }
    }

    fn remove_renderer(&mut self) {
        self.delivery.gate().close();
        self.delivery.clear();
        self.renderer = None;
        self.renderer_format = None;
        self.renderer_backend = None;
        self.renderer_state = RendererState::Unknown;
    }

    fn reset_renderer(&self) {
        if let Some(renderer) = &self.renderer {
            if let Err(e) = renderer.reset() {
                warn!("Renderer reset failed: {}", e);
            }
        }
    }

    fn set_full_screen(&mut self, full_screen: bool) {
        if self.full_screen == full_screen {
            return;
        }

        info!("Full screen {}", if full_screen { "on" } else { "off" });
        self.full_screen = full_screen;
        self.want_restart = true;
        self.observer.on_full_screen_changed(full_screen);
    }

    fn set_timing_offset(&mut self, offset_ms: i32) {
        info!("Timing offset {} ms", offset_ms);
        self.timing_offset_ms = offset_ms;
        if let Some(device) = self.device.as_mut() {
            device.set_timing_offset_ms(offset_ms);
        }
        self.reset_renderer();
    }

    /// Build and start a renderer, walking the fallback chain
    fn start_renderer(&mut self) -> Result<()> {
        let Some(device) = self.device.as_ref() else {
            return Ok(());
        };
        let Some(clock) = device.timing_clock() else {
            return Err(PipelineError::invariant(format!(
                "capturing device {} has no timing clock",
                device.id()
            )));
        };
        let Some(video) = self.video_state.clone().filter(|v| v.valid) else {
            return Ok(());
        };

        debug!("Timing clock: {}", clock.description());
        self.want_restart = false;
        self.renderer_state = RendererState::Starting;

        let settings = self.config.renderer.clone();
        let full = RendererParams::from_settings(&settings);
        let reduced = full.reduced();
        let attempts = iter::once((&settings.preferred_backend, &full))
            .chain(settings.fallback_backends.iter().map(|b| (b, &reduced)));

        let mut failures = Vec::new();
        for (backend, params) in attempts {
            match self.try_renderer(backend, params, &video, &clock) {
                Ok(()) => {
                    info!("Renderer {} started for {}", backend, video.display_mode);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Renderer {} failed: {}", backend, e);
                    failures.push(format!("{}: {}", backend, e));
                }
            }
        }

        let message = format!("No renderer could be started ({})", failures.join("; "));
        warn!("{}", message);
        self.renderer_state = RendererState::Failed;
        if self.full_screen {
            self.full_screen = false;
            self.observer.on_full_screen_changed(false);
        }
        self.observer.on_renderer_failed(&message);
        Ok(())
    }

    fn try_renderer(
        &mut self,
        backend: &RendererBackend,
        params: &RendererParams,
        video: &VideoState,
        clock: &Arc<dyn TimingClock>,
    ) -> std::result::Result<(), RendererError> {
        let format = NegotiatedMediaFormat::negotiate(video, params).map_err(PipelineError::from)?;
        let converter =
            FrameConverter::new(&video.descriptor, params.video_conversion).map_err(PipelineError::from)?;

        self.renderer_generation += 1;
        let request = RendererBuildRequest {
            backend: backend.clone(),
            format: format.clone(),
            params: params.clone(),
            timing_clock: Arc::clone(clock),
            full_screen: self.full_screen,
            events: RendererEventSink::new(self.renderer_generation, self.events.clone()),
        };

        info!("Building renderer {} ({} -> {})", backend, format.source_format, format.pixel_format);
        let renderer = self.factory.build(&request)?;

        if !renderer.on_video_state(video) {
            return Err(RendererError::new(
                RendererErrorKind::MediaType,
                "video state rejected at build",
            ));
        }
        if let Some(hdr) = &video.hdr {
            renderer.set_hdr_metadata(hdr)?;
        }

        // Gate is closed, so the capture thread cannot see a half-started target
        self.delivery
            .install(DeliveryTarget::new(Arc::clone(&renderer), converter, format.clone()));

        if let Err(e) = renderer.start() {
            self.delivery.clear();
            return Err(e);
        }

        self.renderer = Some(renderer);
        self.renderer_format = Some(format);
        self.renderer_backend = Some(backend.clone());
        self.full_screen_surface = self.full_screen;
        Ok(())
    }

    fn complete_termination(&mut self) {
        info!("Pipeline terminated");
        self.terminated = true;
        self.observer.on_terminated();
    }

    // ===== OBSERVER REPORTING =====

    fn knows_device(&self, id: DeviceId) -> bool {
        self.available.contains_key(&id) || (self.attached_device() == Some(id) && !self.device_lost)
    }

    fn report_devices(&mut self) {
        let mut devices: Vec<(DeviceId, String)> = self
            .available
            .iter()
            .map(|(id, device)| (*id, device.name()))
            .collect();
        if let Some(device) = self.device.as_ref().filter(|_| !self.device_lost) {
            devices.push((device.id(), device.name()));
        }
        devices.sort_by_key(|(id, _)| *id);
        self.observer.on_devices_changed(&devices);
    }

    fn report_lifecycle(&mut self) {
        let current = (self.device_state, self.renderer_state);
        if current != self.reported {
            self.reported = current;
            self.observer.on_lifecycle_state_changed(current.0, current.1);
        }
    }
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("attached_device", &self.attached_device())
            .field("desired_device", &self.desired_device)
            .field("device_state", &self.device_state)
            .field("renderer_state", &self.renderer_state)
            .field("renderer_backend", &self.renderer_backend)
            .field("timing_offset_ms", &self.timing_offset_ms)
            .field("terminated", &self.terminated)
            .finish_non_exhaustive()
    }
}
