//! Pipeline Configuration
//!
//! Provides configuration for the lifecycle coordinator, the renderer
//! fallback chain and the latency auto-tuner, with a builder pattern for
//! ergonomic construction.
//!
//! # Examples
//!
//! ```rust
//! use vidproc_pipeline::{PipelineConfig, RendererBackend, RendererSettings};
//! use vidproc_format::VideoConversion;
//!
//! // Using builder pattern
//! let config = PipelineConfig::builder()
//!     .queue_reset_threshold(4)
//!     .auto_timing_offset(false)
//!     .renderer(RendererSettings {
//!         preferred_backend: RendererBackend::new("madvr"),
//!         video_conversion: VideoConversion::V210ToP210,
//!         ..Default::default()
//!     })
//!     .build();
//! assert!(config.validate().is_ok());
//!
//! // Using struct literal with defaults
//! let config = PipelineConfig {
//!     tick_interval_ms: 500,
//!     ..Default::default()
//! };
//! ```

use std::fmt;

use vidproc_format::VideoConversion;

use crate::colorimetry::ColorimetryOverrides;

/// Renderer backend identifier
///
/// Opaque to the pipeline; the [`RendererFactory`](crate::RendererFactory)
/// maps it to an implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RendererBackend(String);

impl RendererBackend {
    /// Create a backend identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RendererBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How sample start/stop times are stamped on frames handed to the renderer
///
/// The first word names the start time source, the second the stop time
/// source. "Clock" uses the capture timing clock, "Theo" the theoretical
/// frame time, "Smart" a clock time corrected toward the theoretical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StartStopTimeMethod {
    /// Clock start, smoothed stop
    #[default]
    ClockSmart,
    /// Clock start, theoretical stop
    ClockTheo,
    /// Clock start, clock stop
    ClockClock,
    /// Theoretical start and stop
    TheoTheo,
    /// Clock start, no stop time
    ClockNone,
    /// Theoretical start, no stop time
    TheoNone,
    /// No timestamps
    None,
}

/// Renderer construction settings
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSettings {
    /// Backend tried first with the full parameter set (default: "hdr")
    pub preferred_backend: RendererBackend,

    /// Backends tried in order with reduced parameters (default: ["mpc-vr", "evr"])
    ///
    /// Each is tried once, without colorimetry overrides.
    pub fallback_backends: Vec<RendererBackend>,

    /// Forced colorimetry values (default: none forced)
    pub colorimetry_overrides: ColorimetryOverrides,

    /// Frame timestamping method (default: ClockSmart)
    pub start_stop_time_method: StartStopTimeMethod,

    /// Whether the renderer queues frames (default: true)
    pub frame_queue_enabled: bool,

    /// Maximum renderer queue depth (default: 32)
    pub frame_queue_max_size: usize,

    /// Conversion applied before delivery (default: None)
    pub video_conversion: VideoConversion,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            preferred_backend: RendererBackend::new("hdr"),
            fallback_backends: vec![RendererBackend::new("mpc-vr"), RendererBackend::new("evr")],
            colorimetry_overrides: ColorimetryOverrides::default(),
            start_stop_time_method: StartStopTimeMethod::default(),
            frame_queue_enabled: true,
            frame_queue_max_size: 32,
            video_conversion: VideoConversion::None,
        }
    }
}

/// Latency classification thresholds
///
/// Edges are in milliseconds unless noted as frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyBands {
    /// Exit latency below this many frames (negated) is red (default: 3.0)
    pub exit_red_late_frames: f64,

    /// Exit latency above this is red (default: 10.0)
    pub exit_red_early_ms: f64,

    /// Exit latency below this many frames (negated) is orange (default: 2.0)
    pub exit_orange_late_frames: f64,

    /// Exit latency above this is orange (default: -5.0)
    pub exit_orange_early_ms: f64,

    /// Hardware latency at or above this is orange (default: 10.0)
    pub hardware_orange_ms: f64,

    /// Hardware latency at or above this is red (default: 15.0)
    pub hardware_red_ms: f64,
}

impl Default for LatencyBands {
    fn default() -> Self {
        Self {
            exit_red_late_frames: 3.0,
            exit_red_early_ms: 10.0,
            exit_orange_late_frames: 2.0,
            exit_orange_early_ms: -5.0,
            hardware_orange_ms: 10.0,
            hardware_red_ms: 15.0,
        }
    }
}

/// Configuration for the video pipeline
///
/// Use [`PipelineConfig::builder()`] for ergonomic construction or struct
/// literal syntax with [`Default::default()`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Timing offset pushed to a device on attach (default: 0)
    pub initial_timing_offset_ms: i32,

    /// Let the tuner shift the timing offset (default: true)
    pub auto_timing_offset: bool,

    /// Let the tuner reset a backlogged renderer (default: true)
    pub auto_renderer_reset: bool,

    /// Renderer queue depth that triggers a reset (default: 3)
    pub queue_reset_threshold: usize,

    /// Ticks between tuner runs (default: 5)
    pub tuner_period_ticks: u32,

    /// Lead below this is mistimed, in ms (default: 0.0)
    pub lead_lower_bound_ms: f64,

    /// Lead above this many frames is mistimed (default: 2.0)
    pub lead_upper_bound_frames: f64,

    /// Tick interval in milliseconds (default: 1000)
    pub tick_interval_ms: u64,

    /// Renderer construction settings
    pub renderer: RendererSettings,

    /// Request a full-screen surface for the first renderer (default: false)
    pub start_full_screen: bool,

    /// Select the first discovered device when none is desired (default: true)
    pub auto_select_first_device: bool,

    /// Input preferred when a device has no current input (default: "HDMI")
    pub preferred_input_name: String,

    /// Latency classification thresholds
    pub latency_bands: LatencyBands,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            initial_timing_offset_ms: 0,
            auto_timing_offset: true,
            auto_renderer_reset: true,
            queue_reset_threshold: 3,
            tuner_period_ticks: 5,
            lead_lower_bound_ms: 0.0,
            lead_upper_bound_frames: 2.0,
            tick_interval_ms: 1000,
            renderer: RendererSettings::default(),
            start_full_screen: false,
            auto_select_first_device: true,
            preferred_input_name: "HDMI".to_string(),
            latency_bands: LatencyBands::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate configuration and return any issues
    ///
    /// Returns `Ok(())` if configuration is valid, or a list of issues.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut issues = Vec::new();

        if self.tick_interval_ms < 10 {
            issues.push("tick_interval_ms should be at least 10ms".to_string());
        }

        if self.tuner_period_ticks == 0 {
            issues.push("tuner_period_ticks must be at least 1".to_string());
        }

        if self.queue_reset_threshold == 0 {
            issues.push("queue_reset_threshold must be at least 1".to_string());
        }

        if self.lead_upper_bound_frames <= 0.0 {
            issues.push("lead_upper_bound_frames must be positive".to_string());
        }

        if self.renderer.preferred_backend.as_str().is_empty() {
            issues.push("preferred_backend cannot be empty".to_string());
        }

        if self
            .renderer
            .fallback_backends
            .iter()
            .any(|b| b.as_str().is_empty())
        {
            issues.push("fallback_backends cannot contain empty identifiers".to_string());
        }

        if self.renderer.frame_queue_enabled && self.renderer.frame_queue_max_size == 0 {
            issues.push("frame_queue_max_size must be at least 1 when queueing".to_string());
        }

        let bands = &self.latency_bands;
        if bands.exit_red_late_frames < bands.exit_orange_late_frames {
            issues.push("exit_red_late_frames should not be below exit_orange_late_frames".to_string());
        }

        if bands.exit_red_early_ms < bands.exit_orange_early_ms {
            issues.push("exit_red_early_ms should not be below exit_orange_early_ms".to_string());
        }

        if bands.hardware_red_ms < bands.hardware_orange_ms {
            issues.push("hardware_red_ms should not be below hardware_orange_ms".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Builder for [`PipelineConfig`]
///
/// Provides a fluent interface for constructing configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    initial_timing_offset_ms: Option<i32>,
    auto_timing_offset: Option<bool>,
    auto_renderer_reset: Option<bool>,
    queue_reset_threshold: Option<usize>,
    tuner_period_ticks: Option<u32>,
    lead_lower_bound_ms: Option<f64>,
    lead_upper_bound_frames: Option<f64>,
    tick_interval_ms: Option<u64>,
    renderer: Option<RendererSettings>,
    start_full_screen: Option<bool>,
    auto_select_first_device: Option<bool>,
    preferred_input_name: Option<String>,
    latency_bands: Option<LatencyBands>,
}

impl PipelineConfigBuilder {
    /// Set the timing offset pushed on attach
    #[must_use]
    pub fn initial_timing_offset_ms(mut self, offset: i32) -> Self {
        self.initial_timing_offset_ms = Some(offset);
        self
    }

    /// Enable automatic timing offset correction
    #[must_use]
    pub fn auto_timing_offset(mut self, enable: bool) -> Self {
        self.auto_timing_offset = Some(enable);
        self
    }

    /// Enable automatic renderer reset on queue backlog
    #[must_use]
    pub fn auto_renderer_reset(mut self, enable: bool) -> Self {
        self.auto_renderer_reset = Some(enable);
        self
    }

    /// Set queue depth that triggers a reset
    #[must_use]
    pub fn queue_reset_threshold(mut self, threshold: usize) -> Self {
        self.queue_reset_threshold = Some(threshold);
        self
    }

    /// Set ticks between tuner runs
    #[must_use]
    pub fn tuner_period_ticks(mut self, ticks: u32) -> Self {
        self.tuner_period_ticks = Some(ticks);
        self
    }

    /// Set the lower lead bound in ms
    #[must_use]
    pub fn lead_lower_bound_ms(mut self, ms: f64) -> Self {
        self.lead_lower_bound_ms = Some(ms);
        self
    }

    /// Set the upper lead bound in frames
    #[must_use]
    pub fn lead_upper_bound_frames(mut self, frames: f64) -> Self {
        self.lead_upper_bound_frames = Some(frames);
        self
    }

    /// Set tick interval in milliseconds
    #[must_use]
    pub fn tick_interval_ms(mut self, interval: u64) -> Self {
        self.tick_interval_ms = Some(interval);
        self
    }

    /// Set renderer settings
    #[must_use]
    pub fn renderer(mut self, settings: RendererSettings) -> Self {
        self.renderer = Some(settings);
        self
    }

    /// Request full screen for the first renderer
    #[must_use]
    pub fn start_full_screen(mut self, enable: bool) -> Self {
        self.start_full_screen = Some(enable);
        self
    }

    /// Select the first discovered device automatically
    #[must_use]
    pub fn auto_select_first_device(mut self, enable: bool) -> Self {
        self.auto_select_first_device = Some(enable);
        self
    }

    /// Set the preferred input connector name
    #[must_use]
    pub fn preferred_input_name(mut self, name: impl Into<String>) -> Self {
        self.preferred_input_name = Some(name.into());
        self
    }

    /// Set latency classification thresholds
    #[must_use]
    pub fn latency_bands(mut self, bands: LatencyBands) -> Self {
        self.latency_bands = Some(bands);
        self
    }

    /// Build the configuration
    ///
    /// Returns a [`PipelineConfig`] with builder values overriding defaults.
    #[must_use]
    pub fn build(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();

        PipelineConfig {
            initial_timing_offset_ms: self
                .initial_timing_offset_ms
                .unwrap_or(defaults.initial_timing_offset_ms),
            auto_timing_offset: self.auto_timing_offset.unwrap_or(defaults.auto_timing_offset),
            auto_renderer_reset: self.auto_renderer_reset.unwrap_or(defaults.auto_renderer_reset),
            queue_reset_threshold: self
                .queue_reset_threshold
                .unwrap_or(defaults.queue_reset_threshold),
            tuner_period_ticks: self.tuner_period_ticks.unwrap_or(defaults.tuner_period_ticks),
            lead_lower_bound_ms: self.lead_lower_bound_ms.unwrap_or(defaults.lead_lower_bound_ms),
            lead_upper_bound_frames: self
                .lead_upper_bound_frames
                .unwrap_or(defaults.lead_upper_bound_frames),
            tick_interval_ms: self.tick_interval_ms.unwrap_or(defaults.tick_interval_ms),
            renderer: self.renderer.unwrap_or(defaults.renderer),
            start_full_screen: self.start_full_screen.unwrap_or(defaults.start_full_screen),
            auto_select_first_device: self
                .auto_select_first_device
                .unwrap_or(defaults.auto_select_first_device),
            preferred_input_name: self
                .preferred_input_name
                .unwrap_or(defaults.preferred_input_name),
            latency_bands: self.latency_bands.unwrap_or(defaults.latency_bands),
        }
    }
}
