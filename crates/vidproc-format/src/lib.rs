//! # vidproc-format
//!
//! Pixel format catalog and lossless frame format conversion for live video
//! capture pipelines.
//!
//! This crate is part of the vidproc workspace and is used by
//! `vidproc-pipeline` to decide whether captured frames need repacking
//! before they reach a renderer, and to do that repacking.
//!
//! # Features
//!
//! - **Pixel Format Catalog**: bits-per-pixel, FourCC and name for every
//!   known capture encoding
//! - **v210 → P210**: packed 10-bit 4:2:2 to planar 16-bit 4:2:2, bit exact
//! - **Pass-through**: identity formatter for formats that need no work
//! - **Buffer Reuse**: [`FrameConverter`] keeps one output frame allocated
//!
//! # Quick Start
//!
//! ```rust
//! use vidproc_format::{PixelFormat, VideoConversion};
//!
//! // Does the renderer need a conversion step for this capture format?
//! let target = VideoConversion::V210ToP210.output_format(PixelFormat::V210);
//! assert_eq!(target, PixelFormat::P210);
//! assert_eq!(target.bits_per_pixel(), 32);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │  capture source    │
//! │  (v210 frame)      │
//! └─────────┬──────────┘
//!           │
//!           ▼
//! ┌────────────────────┐
//! │  FrameConverter    │ ◄── FrameFormatter chosen by VideoConversion
//! │  (reused buffer)   │     Strides validated before writing
//! └─────────┬──────────┘
//!           │
//!           ▼
//! ┌────────────────────┐
//! │  renderer          │
//! │  (P210 frame)      │
//! └────────────────────┘
//! ```
//!
//! # Pixel Formats
//!
//! | Format | BPP | FourCC |
//! |--------|-----|--------|
//! | UYVY   | 16  | `UYVY` |
//! | v210   | 20  | `v210` |
//! | ARGB / BGRA | 32 | `ARGB` / `BGRA` |
//! | r210 / R10b / R10l | 32 | `r210` / `R10b` / `R10l` |
//! | R12B / R12L | 36 | `R12B` / `R12L` |
//! | P210   | 32  | `P210` |
//! | H.265 / DNxHR | 24 | `HEVC` / `AVdh` |

#![cfg_attr(docsrs, feature(doc_cfg))]

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod converter;
pub mod error;
pub mod format;
pub mod frame;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use converter::{
    formatter_for, ConversionStats, FrameConverter, FrameFormatter, PassthroughFormatter,
    V210ToP210Formatter, VideoConversion,
};
pub use error::{ConversionError, Result};
pub use format::{FourCc, PixelFormat, PixelFormatInfo};
pub use frame::VideoFrameDescriptor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether frames of `format` need a conversion step under `conversion`
#[must_use]
pub fn needs_conversion(format: PixelFormat, conversion: VideoConversion) -> bool {
    conversion.applies_to(format)
}
