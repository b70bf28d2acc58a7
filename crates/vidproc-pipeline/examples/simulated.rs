//! Simulated capture card and renderer
//!
//! Drives the full pipeline without hardware: a simulated card pumps v210
//! frames from its own thread, the preferred "hdr" renderer is unavailable
//! so the fallback chain kicks in, and the latency tuner corrects a renderer
//! that presents frames late.
//!
//! # Running
//!
//! ```bash
//! cargo run -p vidproc-pipeline --example simulated
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use vidproc_format::converter::v210_row_stride;
use vidproc_format::{PixelFormat, VideoConversion, VideoFrameDescriptor};
use vidproc_pipeline::{
    CaptureDevice, CaptureDeviceState, CaptureEventSink, CaptureInput, CaptureInputId, ColorSpace, DeviceId,
    DisplayMode, Eotf, FrameView, HdrMetadata, LoggingObserver, PipelineConfig, PipelineRunner, RenderSink,
    RendererBuildRequest, RendererError, RendererErrorKind, RendererEventSink, RendererFactory, RendererSettings,
    RendererState, TimingClock, UserCommand, VideoFrame, VideoState,
};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn video_state() -> VideoState {
    VideoState {
        descriptor: VideoFrameDescriptor::new(PixelFormat::V210, WIDTH, HEIGHT, v210_row_stride(WIDTH) * HEIGHT as usize),
        display_mode: DisplayMode::new(WIDTH, HEIGHT, 50.0),
        color_space: ColorSpace::Rec709,
        eotf: Eotf::Sdr,
        hdr: None,
        valid: true,
    }
}

struct SimClock;

impl TimingClock for SimClock {
    fn description(&self) -> String {
        "simulated 10 MHz clock".to_string()
    }

    fn now_ticks(&self) -> i64 {
        0
    }

    fn ticks_per_second(&self) -> i64 {
        10_000_000
    }
}

struct SimCard {
    sink: Arc<Mutex<Option<CaptureEventSink>>>,
    capturing: Arc<AtomicBool>,
    input: Option<CaptureInputId>,
    pump: Option<thread::JoinHandle<()>>,
}

impl SimCard {
    fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(None)),
            capturing: Arc::new(AtomicBool::new(false)),
            input: None,
            pump: None,
        }
    }

    fn emit_state(&self, state: CaptureDeviceState) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.device_state_changed(state);
        }
    }
}

impl CaptureDevice for SimCard {
    fn id(&self) -> DeviceId {
        DeviceId(1)
    }

    fn name(&self) -> String {
        "Simulated Card".to_string()
    }

    fn set_event_sink(&mut self, sink: Option<CaptureEventSink>) {
        let attached = sink.is_some();
        *self.sink.lock() = sink;
        if attached {
            self.emit_state(CaptureDeviceState::Ready);
        }
    }

    fn start_capture(&mut self) {
        self.capturing.store(true, Ordering::SeqCst);
        self.emit_state(CaptureDeviceState::Capturing);
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.video_state_changed(video_state());
        }

        let sink = Arc::clone(&self.sink);
        let capturing = Arc::clone(&self.capturing);
        self.pump = Some(thread::spawn(move || {
            let descriptor = video_state().descriptor;
            let mut timestamp = 0;
            while capturing.load(Ordering::SeqCst) {
                let frame = VideoFrame {
                    descriptor,
                    timestamp,
                    data: vec![0u8; descriptor.buffer_size],
                };
                if let Some(sink) = sink.lock().as_ref() {
                    sink.video_frame(&frame);
                }
                timestamp += 200_000;
                thread::sleep(Duration::from_millis(20));
            }
        }));
    }

    fn stop_capture(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(pump) = self.pump.take() {
            let _ = pump.join();
        }
        self.emit_state(CaptureDeviceState::Ready);
    }

    fn select_input(&mut self, input: CaptureInputId) {
        self.input = Some(input);
    }

    fn set_timing_offset_ms(&mut self, offset_ms: i32) {
        println!("  [card] timing offset now {} ms", offset_ms);
    }

    fn current_input_id(&self) -> Option<CaptureInputId> {
        self.input
    }

    fn supported_inputs(&self) -> Vec<CaptureInput> {
        vec![CaptureInput::new(0, "SDI"), CaptureInput::new(1, "HDMI")]
    }

    fn timing_clock(&self) -> Option<Arc<dyn TimingClock>> {
        Some(Arc::new(SimClock))
    }

    fn hardware_latency_ms(&self) -> Option<f64> {
        Some(3.5)
    }
}

struct SimRenderer {
    events: RendererEventSink,
    frames: AtomicU64,
    late_ms: Mutex<f64>,
}

impl RenderSink for SimRenderer {
    fn start(&self) -> Result<(), RendererError> {
        self.events.state_changed(RendererState::Ready);
        self.events.state_changed(RendererState::Rendering);
        Ok(())
    }

    fn stop(&self) -> Result<(), RendererError> {
        println!("  [renderer] stopped after {} frames", self.frames.load(Ordering::Relaxed));
        self.events.state_changed(RendererState::Stopped);
        Ok(())
    }

    fn reset(&self) -> Result<(), RendererError> {
        // Pretend the offset correction fixed presentation timing
        *self.late_ms.lock() = -8.0;
        Ok(())
    }

    fn on_video_state(&self, _state: &VideoState) -> bool {
        true
    }

    fn set_hdr_metadata(&self, _hdr: &HdrMetadata) -> Result<(), RendererError> {
        Ok(())
    }

    fn on_video_frame(&self, _frame: &FrameView<'_>) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    fn set_frame_queue_max_size(&self, _max_size: usize) {}

    fn frame_queue_size(&self) -> usize {
        0
    }

    fn entry_latency_ms(&self) -> f64 {
        1.0
    }

    fn exit_latency_ms(&self) -> f64 {
        *self.late_ms.lock()
    }

    fn dropped_frame_count(&self) -> u64 {
        0
    }
}

struct SimFactory;

impl RendererFactory for SimFactory {
    fn build(&mut self, request: &RendererBuildRequest) -> Result<Arc<dyn RenderSink>, RendererError> {
        println!(
            "  [factory] building {} for {} {}x{}",
            request.backend, request.format.pixel_format, request.format.width, request.format.height
        );
        if request.backend.as_str() == "hdr" {
            return Err(RendererError::new(RendererErrorKind::Unsupported, "no HDR display attached"));
        }

        Ok(Arc::new(SimRenderer {
            events: request.events.clone(),
            frames: AtomicU64::new(0),
            late_ms: Mutex::new(6.0),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("vidproc-pipeline Simulated Example");
    println!("==================================");

    let config = PipelineConfig::builder()
        .tick_interval_ms(200)
        .tuner_period_ticks(2)
        .renderer(RendererSettings {
            video_conversion: VideoConversion::V210ToP210,
            ..Default::default()
        })
        .build();

    let runner = PipelineRunner::new(config, Box::new(SimFactory), Box::new(LoggingObserver))?;
    let handle = runner.handle();
    let task = tokio::spawn(runner.run());

    handle.device_found(Box::new(SimCard::new()))?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("\nSwitching to SDI input");
    handle.send_command(UserCommand::SelectInput(CaptureInputId(0)))?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("\nTerminating");
    handle.terminate()?;
    task.await??;

    println!("Done");
    Ok(())
}
