//! # vidproc
//!
//! Live capture-to-render video pipeline coordination and pixel-format
//! transcoding for Rust.
//!
//! This crate provides a unified interface to the vidproc libraries:
//!
//! - **[`format`]** - Pixel format catalog and frame format conversion (v210 → P210)
//! - **[`pipeline`]** - Capture/renderer lifecycle coordination, frame delivery gate, latency auto-tuning
//!
//! # Features
//!
//! Both features are enabled by default. The format layer can be used on its own:
//!
//! ```toml
//! # Use everything (default)
//! vidproc = "0.1"
//!
//! # Pixel formats and converters only
//! vidproc = { version = "0.1", default-features = false, features = ["format"] }
//! ```
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `format` | Yes | Pixel format catalog and frame conversion |
//! | `pipeline` | Yes | Lifecycle coordination (implies `format`) |
//! | `full` | No | All features from all sub-crates |
//!
//! # Quick Start
//!
//! ## Converting a v210 Frame
//!
//! ```rust,ignore
//! use vidproc::format::{FrameConverter, PixelFormat, VideoConversion, VideoFrameDescriptor};
//!
//! let desc = VideoFrameDescriptor::new(PixelFormat::V210, 1920, 1080, 5120 * 1080);
//! let mut converter = FrameConverter::new(&desc, VideoConversion::V210ToP210)?;
//! let p210 = converter.convert(&captured_bytes)?;
//! assert_eq!(converter.output_descriptor().pixel_format, PixelFormat::P210);
//! ```
//!
//! ## Running the Pipeline
//!
//! ```rust,ignore
//! use vidproc::prelude::*;
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
//!     handle.device_found(Box::new(MyCaptureCard::open(0)?))?;
//!     handle.send_command(UserCommand::SetFullScreen(true))?;
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
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            vidproc                              │
//! ├──────────────────────────────┬──────────────────────────────────┤
//! │       vidproc-pipeline       │          vidproc-format          │
//! │                              │                                  │
//! │  PipelineRunner              │  PixelFormat / PixelFormatInfo   │
//! │  LifecycleCoordinator        │  VideoFrameDescriptor            │
//! │  FrameDeliveryGate           │  FrameConverter                  │
//! │  LatencyAutoTuner            │  V210ToP210Formatter             │
//! └──────────────┬───────────────┴─────────────────┬────────────────┘
//!                │                                 │
//!                ▼                                 ▼
//!     CaptureDevice / RenderSink           v210 and P210 payloads
//! ```
//!
//! # Related Crates
//!
//! You can also use the individual crates directly:
//!
//! - [`vidproc-format`](https://crates.io/crates/vidproc-format) - Formats and conversion only
//! - [`vidproc-pipeline`](https://crates.io/crates/vidproc-pipeline) - Pipeline coordination

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// RE-EXPORTS
// =============================================================================

/// Pixel format catalog and frame format conversion.
///
/// - Bits per pixel, FourCC and name for every known encoding
/// - v210 → P210 repacking into a reused output buffer
///
/// See [`vidproc_format`] documentation for details.
#[cfg(feature = "format")]
#[cfg_attr(docsrs, doc(cfg(feature = "format")))]
pub use vidproc_format as format;

/// Capture device and renderer lifecycle coordination.
///
/// - Ordered device switching and renderer fallback
/// - Frame delivery gated on the renderer state
/// - Periodic latency auto-tuning
///
/// See [`vidproc_pipeline`] documentation for details.
#[cfg(feature = "pipeline")]
#[cfg_attr(docsrs, doc(cfg(feature = "pipeline")))]
pub use vidproc_pipeline as pipeline;

// =============================================================================
// PRELUDE - Common types for convenience
// =============================================================================

/// Prelude module with commonly used types.
///
/// ```rust
/// use vidproc::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "format")]
    pub use vidproc_format::{ConversionError, FrameConverter, PixelFormat, VideoConversion, VideoFrameDescriptor};

    #[cfg(feature = "pipeline")]
    pub use vidproc_pipeline::{
        CaptureDevice, CaptureEventSink, LifecycleCoordinator, LoggingObserver, PipelineConfig, PipelineError,
        PipelineHandle, PipelineObserver, PipelineRunner, RenderSink, RendererFactory, UserCommand,
    };
}
