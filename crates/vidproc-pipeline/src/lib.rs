//! # vidproc-pipeline
//!
//! Lifecycle coordination between a live capture device and a renderer, with
//! a lock-free frame delivery gate and a periodic latency auto-tuner.
//!
//! # Features
//!
//! - **Lifecycle Coordination**: one reconciliation function decides every
//!   device and renderer command, one command at a time
//! - **Ordered Device Switching**: the renderer is always torn down before
//!   the capture device it is clocked from
//! - **Renderer Fallback**: preferred backend first, then each fallback with
//!   reduced parameters, then a `Failed` state that waits for a retry
//! - **Frame Delivery Gate**: capture threads forward frames only while the
//!   renderer is `Rendering`
//! - **Latency Auto-Tuning**: queue backlog resets and timing offset
//!   correction on a scheduled tick
//! - **Format Conversion**: optional v210 → P210 repacking on the capture
//!   thread via `vidproc-format`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vidproc_pipeline::{LoggingObserver, PipelineConfig, PipelineRunner, UserCommand};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = PipelineRunner::new(
//!         PipelineConfig::default(),
//!         Box::new(MyRendererFactory::new()),
//!         Box::new(LoggingObserver),
//!     )?;
//!     let handle = runner.handle();
//!     let task = tokio::spawn(runner.run());
//!
//!     // Discovery hands devices over; the first one is selected automatically
//!     handle.device_found(Box::new(MyCaptureCard::open(0)?))?;
//!     handle.send_command(UserCommand::ToggleFullScreen)?;
//!
//!     handle.terminate()?;
//!     task.await??;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//!  capture thread                         coordination task
//! ┌──────────────────────┐   events    ┌─────────────────────────┐
//! │  CaptureEventSink    │────────────►│  PipelineRunner         │
//! │                      │   (mpsc)    │   ├─ LifecycleCoordinator│
//! │  gate open?          │             │   │    rules::next_action│
//! │   └─ FrameConverter  │             │   └─ LatencyAutoTuner   │
//! │       └─ RenderSink  │◄── gate ────│        (tick)           │
//! └──────────────────────┘  open/close └────────────┬────────────┘
//!                                                   │ commands
//!                                     ┌─────────────┴────────────┐
//!                                     ▼                          ▼
//!                              CaptureDevice             RendererFactory
//!                                                          └─ RenderSink
//! ```
//!
//! # Reconciliation Rules
//!
//! | Priority | Condition | Step |
//! |----------|-----------|------|
//! | 1 | desired device ≠ attached | stop renderer, stop capture, release, attach |
//! | 2 | no device, renderer alive | wait |
//! | 3 | terminating | complete |
//! | 4 | no device | idle |
//! | 5 | device state unknown | wait |
//! | 6 | desired input ≠ current | stop renderer, stop capture, select and start |
//! | 7 | not capturing | wait |
//! | 8 | no renderer | build through the fallback chain |
//! | 9 | rendering, signal invalid | stop renderer |
//! | 10 | rendering, restart wanted | restart renderer |
//! | 11 | otherwise | steady |

#![cfg_attr(docsrs, feature(doc_cfg))]

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod actor;
pub mod colorimetry;
pub mod config;
pub mod coordinator;
pub mod delivery;
pub mod error;
pub mod events;
pub mod gate;
pub mod negotiation;
pub mod rules;
pub mod runner;
pub mod tuner;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use actor::{
    CaptureDevice, LoggingObserver, PipelineObserver, RenderSink, RendererBuildRequest, RendererFactory,
    TimingClock,
};
pub use colorimetry::{Colorimetry, ColorimetryError, ColorimetryOverrides};
pub use config::{LatencyBands, PipelineConfig, PipelineConfigBuilder, RendererBackend, RendererSettings, StartStopTimeMethod};
pub use coordinator::LifecycleCoordinator;
pub use delivery::{CaptureEventSink, DeliveryStats, RendererEventSink};
pub use error::{PipelineError, RendererError, RendererErrorKind, Result};
pub use events::{PipelineEvent, UserCommand};
pub use gate::FrameDeliveryGate;
pub use negotiation::{NegotiatedMediaFormat, RendererParams};
pub use runner::{PipelineHandle, PipelineRunner};
pub use tuner::{LatencyAutoTuner, LatencyBand, RendererTelemetry, TunerDecision, MAX_OFFSET_STEP_MS};
pub use types::{
    CaptureDeviceState, CaptureInput, CaptureInputId, CardState, CieXy, ColorSpace, DeviceId, DisplayMode, Eotf,
    FrameView, HdrMetadata, InputEncoding, InputLockStatus, RendererState, VideoFrame, VideoState,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
