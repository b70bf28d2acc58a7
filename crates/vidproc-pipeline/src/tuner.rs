//! Latency auto-tuner
//!
//! Runs on the scheduled tick and only looks at a renderer that is
//! `Rendering`. Two corrections exist and at most one is applied per run:
//!
//! | Condition | Decision |
//! |-----------|----------|
//! | queue size ≥ threshold | reset the renderer |
//! | lead < lower bound or lead > N frames | shift the offset by `round(lead)` and reset |
//!
//! where `lead = -exit_latency_ms`. A backlogged queue inflates exit latency,
//! so offset tuning is skipped whenever the queue correction fires.
//! A single shift never exceeds [`MAX_OFFSET_STEP_MS`].

use std::fmt;

use crate::config::{LatencyBands, PipelineConfig};

/// Largest timing offset shift one tuner run may request
pub const MAX_OFFSET_STEP_MS: i32 = 1000;

/// Telemetry sampled from a rendering renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererTelemetry {
    /// Frames waiting in the renderer queue
    pub queue_size: usize,

    /// Capture-to-presentation latency in ms; negative is late
    pub exit_latency_ms: f64,

    /// Duration of one frame in ms
    pub frame_duration_ms: f64,
}

/// Corrections requested by one tuner run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TunerDecision {
    /// Request a lightweight renderer reset
    pub reset_renderer: bool,

    /// Shift the capture timing offset by this many ms
    pub offset_delta_ms: Option<i32>,
}

impl TunerDecision {
    /// Whether nothing was requested
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.reset_renderer && self.offset_delta_ms.is_none()
    }
}

/// Periodic latency corrector
#[derive(Debug, Clone)]
pub struct LatencyAutoTuner {
    period_ticks: u32,
    tick: u64,
    auto_renderer_reset: bool,
    auto_timing_offset: bool,
    queue_reset_threshold: usize,
    lead_lower_bound_ms: f64,
    lead_upper_bound_frames: f64,
}

impl LatencyAutoTuner {
    /// Create a tuner from pipeline configuration
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            period_ticks: config.tuner_period_ticks.max(1),
            tick: 0,
            auto_renderer_reset: config.auto_renderer_reset,
            auto_timing_offset: config.auto_timing_offset,
            queue_reset_threshold: config.queue_reset_threshold,
            lead_lower_bound_ms: config.lead_lower_bound_ms,
            lead_upper_bound_frames: config.lead_upper_bound_frames,
        }
    }

    /// Advance one tick
    ///
    /// `telemetry` is `None` unless the renderer is `Rendering`. The tuner
    /// runs on ticks 0, N, 2N, ... of its own counter.
    pub fn on_tick(&mut self, telemetry: Option<RendererTelemetry>) -> TunerDecision {
        let due = self.tick % u64::from(self.period_ticks) == 0;
        self.tick += 1;

        match telemetry {
            Some(telemetry) if due => self.evaluate(&telemetry),
            _ => TunerDecision::default(),
        }
    }

    /// Decide corrections for one telemetry sample
    #[must_use]
    pub fn evaluate(&self, telemetry: &RendererTelemetry) -> TunerDecision {
        if self.auto_renderer_reset && telemetry.queue_size >= self.queue_reset_threshold {
            return TunerDecision {
                reset_renderer: true,
                offset_delta_ms: None,
            };
        }

        if !self.auto_timing_offset || telemetry.frame_duration_ms <= 0.0 {
            return TunerDecision::default();
        }

        let lead = -telemetry.exit_latency_ms;
        let upper = self.lead_upper_bound_frames * telemetry.frame_duration_ms;
        if lead < self.lead_lower_bound_ms || lead > upper {
            return TunerDecision {
                reset_renderer: true,
                offset_delta_ms: Some(offset_step(lead)),
            };
        }

        TunerDecision::default()
    }
}

fn offset_step(lead_ms: f64) -> i32 {
    let bound = f64::from(MAX_OFFSET_STEP_MS);
    lead_ms.clamp(-bound, bound).round() as i32
}

/// Traffic-light classification of a latency figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatencyBand {
    /// Within target
    Green,
    /// Drifting
    Orange,
    /// Needs attention
    Red,
}

impl fmt::Display for LatencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Red => "red",
        };
        f.write_str(s)
    }
}

/// Classify renderer exit latency
pub fn classify_exit_latency(exit_latency_ms: f64, frame_duration_ms: f64, bands: &LatencyBands) -> LatencyBand {
    if exit_latency_ms < -bands.exit_red_late_frames * frame_duration_ms
        || exit_latency_ms > bands.exit_red_early_ms
    {
        LatencyBand::Red
    } else if exit_latency_ms < -bands.exit_orange_late_frames * frame_duration_ms
        || exit_latency_ms > bands.exit_orange_early_ms
    {
        LatencyBand::Orange
    } else {
        LatencyBand::Green
    }
}

/// Classify capture hardware latency
pub fn classify_hardware_latency(latency_ms: f64, bands: &LatencyBands) -> LatencyBand {
    if latency_ms < bands.hardware_orange_ms {
        LatencyBand::Green
    } else if latency_ms < bands.hardware_red_ms {
        LatencyBand::Orange
    } else {
        LatencyBand::Red
    }
}
