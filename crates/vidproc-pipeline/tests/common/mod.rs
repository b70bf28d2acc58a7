//! Scripted capture device, renderer and observer mocks
//!
//! Mocks answer commands synchronously through the pipeline's callback
//! sinks, so a test drives the coordinator by draining the event queue.
//! Every actor command is appended to one shared log, which makes ordering
//! assertions possible across actors.

#![allow(dead_code, unreachable_pub)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use vidproc_format::converter::v210_row_stride;
use vidproc_format::{PixelFormat, VideoFrameDescriptor};
use vidproc_pipeline::{
    CaptureDevice, CaptureDeviceState, CaptureEventSink, CaptureInput, CaptureInputId, CardState, ColorSpace,
    DeviceId, DisplayMode, Eotf, FrameView, HdrMetadata, LifecycleCoordinator, PipelineConfig, PipelineEvent,
    PipelineObserver, RenderSink, RendererBackend, RendererBuildRequest, RendererError, RendererErrorKind,
    RendererEventSink, RendererParams, RendererState, Result, TimingClock, UserCommand, VideoFrame, VideoState,
};

/// Shared command log
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Route pipeline logs through the test harness output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Position of the first entry equal to `entry`
pub fn position(log: &Log, entry: &str) -> Option<usize> {
    log.lock().iter().position(|e| e == entry)
}

pub fn has_illegal(log: &Log) -> bool {
    log.lock().iter().any(|e| e.starts_with("ILLEGAL"))
}

pub fn video_1080p60() -> VideoState {
    VideoState {
        descriptor: VideoFrameDescriptor::new(PixelFormat::V210, 1920, 1080, v210_row_stride(1920) * 1080),
        display_mode: DisplayMode::new(1920, 1080, 60.0),
        color_space: ColorSpace::Rec709,
        eotf: Eotf::Sdr,
        hdr: None,
        valid: true,
    }
}

pub fn uhd_pq() -> VideoState {
    VideoState {
        descriptor: VideoFrameDescriptor::new(PixelFormat::V210, 3840, 2160, v210_row_stride(3840) * 2160),
        display_mode: DisplayMode::new(3840, 2160, 50.0),
        color_space: ColorSpace::Bt2020,
        eotf: Eotf::Pq,
        hdr: Some(HdrMetadata {
            max_cll: 1000.0,
            max_fall: 400.0,
            ..Default::default()
        }),
        valid: true,
    }
}

// =============================================================================
// CAPTURE DEVICE
// =============================================================================

struct MockClock;

impl TimingClock for MockClock {
    fn description(&self) -> String {
        "mock clock".to_string()
    }

    fn now_ticks(&self) -> i64 {
        0
    }

    fn ticks_per_second(&self) -> i64 {
        10_000_000
    }
}

struct DeviceInner {
    state: CaptureDeviceState,
    sink: Option<CaptureEventSink>,
    video: VideoState,
    current_input: Option<CaptureInputId>,
    timing_offset_ms: i32,
    has_clock: bool,
}

/// Test-side view of a device owned by the pipeline
#[derive(Clone)]
pub struct DeviceProbe {
    id: DeviceId,
    inner: Arc<Mutex<DeviceInner>>,
}

impl DeviceProbe {
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn state(&self) -> CaptureDeviceState {
        self.inner.lock().state
    }

    pub fn timing_offset_ms(&self) -> i32 {
        self.inner.lock().timing_offset_ms
    }

    pub fn current_input(&self) -> Option<CaptureInputId> {
        self.inner.lock().current_input
    }

    pub fn has_sink(&self) -> bool {
        self.inner.lock().sink.is_some()
    }

    /// Change the signal and report it if a sink is installed
    pub fn set_video(&self, video: VideoState) {
        let sink = {
            let mut inner = self.inner.lock();
            inner.video = video.clone();
            inner.sink.clone()
        };
        if let Some(sink) = sink {
            sink.video_state_changed(video);
        }
    }

    /// Push one frame through the installed sink
    pub fn push_frame(&self) {
        let (sink, descriptor) = {
            let inner = self.inner.lock();
            (inner.sink.clone(), inner.video.descriptor)
        };
        if let Some(sink) = sink {
            sink.video_frame(&VideoFrame {
                descriptor,
                timestamp: 0,
                data: vec![0u8; descriptor.buffer_size],
            });
        }
    }

    /// Push a frame whose payload is shorter than its descriptor claims
    pub fn push_truncated_frame(&self) {
        let (sink, descriptor) = {
            let inner = self.inner.lock();
            (inner.sink.clone(), inner.video.descriptor)
        };
        if let Some(sink) = sink {
            sink.video_frame(&VideoFrame {
                descriptor,
                timestamp: 0,
                data: vec![0u8; descriptor.buffer_size / 2],
            });
        }
    }

    pub fn report_card_state(&self, state: CardState) {
        let sink = self.inner.lock().sink.clone();
        if let Some(sink) = sink {
            sink.card_state_changed(state);
        }
    }
}

pub struct MockDevice {
    id: DeviceId,
    name: String,
    inputs: Vec<CaptureInput>,
    inner: Arc<Mutex<DeviceInner>>,
    log: Log,
}

impl MockDevice {
    pub fn new(id: u64, log: &Log) -> (Self, DeviceProbe) {
        Self::with_inputs(id, vec![CaptureInput::new(0, "SDI"), CaptureInput::new(1, "HDMI")], log)
    }

    pub fn with_inputs(id: u64, inputs: Vec<CaptureInput>, log: &Log) -> (Self, DeviceProbe) {
        let id = DeviceId(id);
        let inner = Arc::new(Mutex::new(DeviceInner {
            state: CaptureDeviceState::Unknown,
            sink: None,
            video: video_1080p60(),
            current_input: None,
            timing_offset_ms: 0,
            has_clock: true,
        }));
        let device = Self {
            id,
            name: format!("Mock {}", id.0),
            inputs,
            inner: Arc::clone(&inner),
            log: Arc::clone(log),
        };
        (device, DeviceProbe { id, inner })
    }

    /// Report no timing clock while capturing
    pub fn without_clock(self) -> Self {
        self.inner.lock().has_clock = false;
        self
    }

    fn record(&self, command: &str) {
        self.log.lock().push(format!("{}:{}", self.id.0, command));
    }

    fn illegal(&self, command: &str, state: CaptureDeviceState) {
        self.log
            .lock()
            .push(format!("ILLEGAL {}:{} in {}", self.id.0, command, state));
    }
}

impl CaptureDevice for MockDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn set_event_sink(&mut self, sink: Option<CaptureEventSink>) {
        self.record(if sink.is_some() { "attach" } else { "detach" });
        let mut inner = self.inner.lock();
        inner.sink = sink.clone();
        if let Some(sink) = sink {
            inner.state = CaptureDeviceState::Ready;
            drop(inner);
            sink.device_state_changed(CaptureDeviceState::Ready);
        }
    }

    fn start_capture(&mut self) {
        self.record("start_capture");
        let (sink, video) = {
            let mut inner = self.inner.lock();
            if inner.state != CaptureDeviceState::Ready {
                let state = inner.state;
                drop(inner);
                self.illegal("start_capture", state);
                return;
            }
            inner.state = CaptureDeviceState::Capturing;
            (inner.sink.clone(), inner.video.clone())
        };
        if let Some(sink) = sink {
            sink.device_state_changed(CaptureDeviceState::Capturing);
            sink.video_state_changed(video);
        }
    }

    fn stop_capture(&mut self) {
        self.record("stop_capture");
        let sink = {
            let mut inner = self.inner.lock();
            if inner.state != CaptureDeviceState::Capturing {
                let state = inner.state;
                drop(inner);
                self.illegal("stop_capture", state);
                return;
            }
            inner.state = CaptureDeviceState::Ready;
            inner.sink.clone()
        };
        if let Some(sink) = sink {
            sink.device_state_changed(CaptureDeviceState::Ready);
        }
    }

    fn select_input(&mut self, input: CaptureInputId) {
        self.record(&format!("select_input {}", input.0));
        let mut inner = self.inner.lock();
        if inner.state != CaptureDeviceState::Ready {
            let state = inner.state;
            drop(inner);
            self.illegal("select_input", state);
            return;
        }
        inner.current_input = Some(input);
    }

    fn set_timing_offset_ms(&mut self, offset_ms: i32) {
        self.inner.lock().timing_offset_ms = offset_ms;
    }

    fn current_input_id(&self) -> Option<CaptureInputId> {
        self.inner.lock().current_input
    }

    fn supported_inputs(&self) -> Vec<CaptureInput> {
        self.inputs.clone()
    }

    fn timing_clock(&self) -> Option<Arc<dyn TimingClock>> {
        let inner = self.inner.lock();
        if inner.has_clock && inner.state == CaptureDeviceState::Capturing {
            Some(Arc::new(MockClock))
        } else {
            None
        }
    }

    fn hardware_latency_ms(&self) -> Option<f64> {
        Some(4.0)
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Test-side view of a built renderer
pub struct MockRenderer {
    pub backend: RendererBackend,
    pub params: RendererParams,
    pub pixel_format: PixelFormat,
    state: Mutex<RendererState>,
    events: RendererEventSink,
    log: Log,
    pub frames: AtomicUsize,
    pub resets: AtomicUsize,
    pub hdr_pushes: AtomicUsize,
    pub queue_size: AtomicUsize,
    pub exit_latency_ms: Mutex<f64>,
    pub queue_limit: AtomicUsize,
}

impl MockRenderer {
    pub fn state(&self) -> RendererState {
        *self.state.lock()
    }

    fn record(&self, command: &str) {
        self.log
            .lock()
            .push(format!("renderer {}:{}", self.backend, command));
    }
}

impl RenderSink for MockRenderer {
    fn start(&self) -> std::result::Result<(), RendererError> {
        self.record("start");
        *self.state.lock() = RendererState::Rendering;
        self.events.state_changed(RendererState::Ready);
        self.events.state_changed(RendererState::Rendering);
        self.events.detail(format!("{} presenting {}", self.backend, self.pixel_format));
        Ok(())
    }

    fn stop(&self) -> std::result::Result<(), RendererError> {
        self.record("stop");
        *self.state.lock() = RendererState::Stopped;
        self.events.state_changed(RendererState::Stopped);
        Ok(())
    }

    fn reset(&self) -> std::result::Result<(), RendererError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_video_state(&self, _state: &VideoState) -> bool {
        true
    }

    fn set_hdr_metadata(&self, _hdr: &HdrMetadata) -> std::result::Result<(), RendererError> {
        self.hdr_pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_video_frame(&self, frame: &FrameView<'_>) {
        if *self.state.lock() != RendererState::Rendering {
            self.log
                .lock()
                .push(format!("ILLEGAL renderer {}:frame while not rendering", self.backend));
        }
        assert_eq!(frame.descriptor.pixel_format, self.pixel_format);
        self.frames.fetch_add(1, Ordering::SeqCst);
    }

    fn set_frame_queue_max_size(&self, max_size: usize) {
        self.queue_limit.store(max_size, Ordering::SeqCst);
    }

    fn frame_queue_size(&self) -> usize {
        self.queue_size.load(Ordering::SeqCst)
    }

    fn entry_latency_ms(&self) -> f64 {
        0.0
    }

    fn exit_latency_ms(&self) -> f64 {
        *self.exit_latency_ms.lock()
    }

    fn dropped_frame_count(&self) -> u64 {
        0
    }
}

/// Factory whose listed backends fail to build
pub struct MockFactory {
    failing: Vec<String>,
    built: Arc<Mutex<Vec<Arc<MockRenderer>>>>,
    requests: Arc<Mutex<Vec<RendererBuildRequest>>>,
    log: Log,
}

/// Test-side view of the factory
#[derive(Clone)]
pub struct FactoryProbe {
    built: Arc<Mutex<Vec<Arc<MockRenderer>>>>,
    requests: Arc<Mutex<Vec<RendererBuildRequest>>>,
}

impl FactoryProbe {
    /// Most recently built renderer
    pub fn last(&self) -> Option<Arc<MockRenderer>> {
        self.built.lock().last().cloned()
    }

    pub fn built_count(&self) -> usize {
        self.built.lock().len()
    }

    /// Backends of every build attempt, successful or not
    pub fn attempted_backends(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .map(|r| r.backend.as_str().to_string())
            .collect()
    }

    pub fn requests(&self) -> Vec<RendererBuildRequest> {
        self.requests.lock().clone()
    }
}

impl MockFactory {
    pub fn new(failing: &[&str], log: &Log) -> (Self, FactoryProbe) {
        let built = Arc::new(Mutex::new(Vec::new()));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let factory = Self {
            failing: failing.iter().map(|s| (*s).to_string()).collect(),
            built: Arc::clone(&built),
            requests: Arc::clone(&requests),
            log: Arc::clone(log),
        };
        (factory, FactoryProbe { built, requests })
    }
}

impl vidproc_pipeline::RendererFactory for MockFactory {
    fn build(
        &mut self,
        request: &RendererBuildRequest,
    ) -> std::result::Result<Arc<dyn RenderSink>, RendererError> {
        self.requests.lock().push(request.clone());
        let backend = request.backend.as_str().to_string();
        self.log.lock().push(format!("renderer {}:build", backend));

        if self.failing.contains(&backend) {
            return Err(RendererError::new(RendererErrorKind::Unsupported, format!("{backend} unavailable")));
        }

        let renderer = Arc::new(MockRenderer {
            backend: request.backend.clone(),
            params: request.params.clone(),
            pixel_format: request.format.pixel_format,
            state: Mutex::new(RendererState::Ready),
            events: request.events.clone(),
            log: Arc::clone(&self.log),
            frames: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            hdr_pushes: AtomicUsize::new(0),
            queue_size: AtomicUsize::new(0),
            exit_latency_ms: Mutex::new(-5.0),
            queue_limit: AtomicUsize::new(request.params.frame_queue_max_size),
        });
        self.built.lock().push(Arc::clone(&renderer));
        Ok(renderer)
    }
}

// =============================================================================
// OBSERVER
// =============================================================================

#[derive(Debug, Default)]
pub struct ObserverRecord {
    pub fatal: Vec<String>,
    pub renderer_failures: Vec<String>,
    pub details: Vec<String>,
    pub lifecycle: Vec<(CaptureDeviceState, RendererState)>,
    pub inputs: Vec<(Vec<CaptureInput>, Option<CaptureInputId>)>,
    pub full_screen: Vec<bool>,
    pub devices: Vec<Vec<DeviceId>>,
    pub card_states: usize,
    pub terminated: bool,
}

pub struct RecordingObserver {
    record: Arc<Mutex<ObserverRecord>>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Arc<Mutex<ObserverRecord>>) {
        let record = Arc::new(Mutex::new(ObserverRecord::default()));
        (
            Self {
                record: Arc::clone(&record),
            },
            record,
        )
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_fatal_error(&mut self, message: &str) {
        self.record.lock().fatal.push(message.to_string());
    }

    fn on_lifecycle_state_changed(&mut self, capture: CaptureDeviceState, renderer: RendererState) {
        self.record.lock().lifecycle.push((capture, renderer));
    }

    fn on_renderer_failed(&mut self, message: &str) {
        self.record.lock().renderer_failures.push(message.to_string());
    }

    fn on_renderer_detail(&mut self, detail: &str) {
        self.record.lock().details.push(detail.to_string());
    }

    fn on_card_state(&mut self, _state: &CardState) {
        self.record.lock().card_states += 1;
    }

    fn on_inputs_changed(&mut self, inputs: &[CaptureInput], selected: Option<CaptureInputId>) {
        self.record.lock().inputs.push((inputs.to_vec(), selected));
    }

    fn on_full_screen_changed(&mut self, full_screen: bool) {
        self.record.lock().full_screen.push(full_screen);
    }

    fn on_devices_changed(&mut self, devices: &[(DeviceId, String)]) {
        self.record
            .lock()
            .devices
            .push(devices.iter().map(|(id, _)| *id).collect());
    }

    fn on_terminated(&mut self) {
        self.record.lock().terminated = true;
    }
}

// =============================================================================
// HARNESS
// =============================================================================

/// Coordinator plus its queue, drained synchronously
pub struct Harness {
    pub coordinator: LifecycleCoordinator,
    pub log: Log,
    pub factory: FactoryProbe,
    pub observer: Arc<Mutex<ObserverRecord>>,
    events: mpsc::UnboundedReceiver<PipelineEvent>,
}

impl Harness {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_failing(config, &[])
    }

    pub fn with_failing(config: PipelineConfig, failing: &[&str]) -> Self {
        init_tracing();
        let log = new_log();
        let (factory, factory_probe) = MockFactory::new(failing, &log);
        let (observer, record) = RecordingObserver::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = LifecycleCoordinator::new(config, Box::new(factory), Box::new(observer), tx);

        Self {
            coordinator,
            log,
            factory: factory_probe,
            observer: record,
            events: rx,
        }
    }

    /// Hand a default two-input device to the pipeline
    pub fn add_device(&mut self, id: u64) -> DeviceProbe {
        let (device, probe) = MockDevice::new(id, &self.log);
        self.add(Box::new(device)).expect("device found");
        probe
    }

    pub fn add(&mut self, device: Box<dyn CaptureDevice>) -> Result<()> {
        self.send(PipelineEvent::DeviceFound(device))
    }

    pub fn command(&mut self, command: UserCommand) -> Result<()> {
        self.send(PipelineEvent::Command(command))
    }

    pub fn tick(&mut self) -> Result<()> {
        self.send(PipelineEvent::Tick)
    }

    /// Apply `event`, then everything it caused
    pub fn send(&mut self, event: PipelineEvent) -> Result<()> {
        self.apply(event)?;
        self.drain()
    }

    pub fn drain(&mut self) -> Result<()> {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Apply `event` alone, leaving what it caused in the queue
    pub fn apply(&mut self, event: PipelineEvent) -> Result<()> {
        let result = self.coordinator.handle_event(event);

        // The gate is open exactly while the renderer is rendering
        if !self.coordinator.is_terminated() {
            assert_eq!(
                self.coordinator.delivery_gate().is_open(),
                self.coordinator.renderer_state() == RendererState::Rendering,
                "gate out of step with renderer state {}",
                self.coordinator.renderer_state()
            );
        }
        result
    }

    pub fn log_snapshot(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}
