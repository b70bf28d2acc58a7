//! Frame Format Conversion
//!
//! Repacks captured frames into the layout a renderer was negotiated for.
//!
//! # Supported Conversions
//!
//! - **v210 → P210**: 4:2:2 10-bit packed to 4:2:2 planar with 16-bit
//!   samples. This is a lossless bit repack: every 10-bit value is moved
//!   into the high bits of a 16-bit container (`value << 6`), nothing is
//!   resampled or rounded.
//! - **Pass-through**: identity for every other pair.
//!
//! # Layouts
//!
//! v210 packs six pixels into a group of four little-endian 32-bit words,
//! with three 10-bit samples per word at bits 0, 10 and 20:
//!
//! ```text
//! W0 = Cb0 Y0  Cr0
//! W1 = Y1  Cb1 Y2
//! W2 = Cr1 Y3  Cb2
//! W3 = Y4  Cr2 Y5
//! ```
//!
//! Rows are padded to a multiple of 48 pixels (128 bytes).
//!
//! P210 is a luma plane of `height` rows of `width` u16 samples, followed by
//! an interleaved Cb/Cr plane of `height` rows of `width / 2` u16 pairs.
//!
//! # Examples
//!
//! ```rust
//! use vidproc_format::{FrameConverter, PixelFormat, VideoConversion, VideoFrameDescriptor};
//! use vidproc_format::converter::{p210_frame_size, v210_row_stride};
//!
//! let source = VideoFrameDescriptor::new(
//!     PixelFormat::V210,
//!     1920,
//!     1080,
//!     v210_row_stride(1920) * 1080,
//! );
//! let mut converter = FrameConverter::new(&source, VideoConversion::V210ToP210)?;
//! assert_eq!(converter.output_descriptor().pixel_format, PixelFormat::P210);
//! assert_eq!(converter.output_frame_size(), p210_frame_size(1920, 1080));
//!
//! let captured = vec![0u8; source.buffer_size];
//! let planar = converter.convert(&captured)?;
//! assert_eq!(planar.len(), 1920 * 1080 * 4);
//! # Ok::<(), vidproc_format::ConversionError>(())
//! ```

use std::fmt;

use tracing::debug;

use crate::error::{ConversionError, Result};
use crate::format::PixelFormat;
use crate::frame::VideoFrameDescriptor;

/// Pixels carried by one v210 group
pub const V210_PIXELS_PER_GROUP: usize = 6;

/// Bytes in one v210 group
pub const V210_BYTES_PER_GROUP: usize = 16;

/// Shift that widens a 10-bit sample into a 16-bit container
pub const P210_SAMPLE_SHIFT: u32 = 6;

const V210_ROW_ALIGN_PIXELS: usize = 48;
const V210_ROW_ALIGN_BYTES: usize = 128;
const SAMPLE_MASK: u32 = 0x3ff;

/// Source row stride in bytes for a v210 frame
#[must_use]
pub fn v210_row_stride(width: u32) -> usize {
    (width as usize + V210_ROW_ALIGN_PIXELS - 1) / V210_ROW_ALIGN_PIXELS * V210_ROW_ALIGN_BYTES
}

/// Row stride in bytes of either P210 plane
#[must_use]
pub fn p210_row_stride(width: u32) -> usize {
    width as usize * 2
}

/// Exact P210 frame size in bytes (luma plane plus chroma plane)
#[must_use]
pub fn p210_frame_size(width: u32, height: u32) -> usize {
    p210_row_stride(width) * height as usize * 2
}

fn check_422_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ConversionError::invalid_dimensions(
            width,
            height,
            "width and height must be non-zero",
        ));
    }

    if width % 2 != 0 {
        return Err(ConversionError::invalid_dimensions(
            width,
            height,
            "width must be even for 4:2:2 chroma",
        ));
    }

    Ok(())
}

/// Convert a v210 frame to P210
///
/// Both buffers are validated against their independently computed
/// strides before the first byte is written.
///
/// # Arguments
///
/// * `src` - v210 frame, at least `v210_row_stride(width) * height` bytes
/// * `dst` - P210 output, at least `p210_frame_size(width, height)` bytes
/// * `width` - Frame width (must be even)
/// * `height` - Frame height
pub fn v210_to_p210(src: &[u8], dst: &mut [u8], width: u32, height: u32) -> Result<()> {
    check_422_dimensions(width, height)?;

    let rows = height as usize;
    let src_stride = v210_row_stride(width);
    let dst_stride = p210_row_stride(width);

    let src_needed = src_stride * rows;
    if src.len() < src_needed {
        return Err(ConversionError::SourceTooSmall {
            expected: src_needed,
            actual: src.len(),
        });
    }

    let dst_needed = p210_frame_size(width, height);
    if dst.len() < dst_needed {
        return Err(ConversionError::DestinationTooSmall {
            expected: dst_needed,
            actual: dst.len(),
        });
    }

    let (luma_plane, chroma_plane) = dst[..dst_needed].split_at_mut(dst_stride * rows);

    let rows_iter = src[..src_needed]
        .chunks_exact(src_stride)
        .zip(luma_plane.chunks_exact_mut(dst_stride))
        .zip(chroma_plane.chunks_exact_mut(dst_stride));

    for ((src_row, luma_row), chroma_row) in rows_iter {
        unpack_v210_row(src_row, luma_row, chroma_row, width as usize);
    }

    Ok(())
}

#[inline]
fn read_word(group: &[u8], index: usize) -> u32 {
    let offset = index * 4;
    u32::from_le_bytes([
        group[offset],
        group[offset + 1],
        group[offset + 2],
        group[offset + 3],
    ])
}

#[inline]
fn sample(word: u32, slot: u32) -> u16 {
    ((word >> (slot * 10)) & SAMPLE_MASK) as u16
}

#[inline]
fn write_sample(row: &mut [u8], index: usize, value: u16) {
    let bytes = (value << P210_SAMPLE_SHIFT).to_le_bytes();
    row[index * 2] = bytes[0];
    row[index * 2 + 1] = bytes[1];
}

fn unpack_v210_row(src_row: &[u8], luma: &mut [u8], chroma: &mut [u8], width: usize) {
    for (group_index, group) in src_row.chunks_exact(V210_BYTES_PER_GROUP).enumerate() {
        let x0 = group_index * V210_PIXELS_PER_GROUP;
        if x0 >= width {
            break;
        }

        let w0 = read_word(group, 0);
        let w1 = read_word(group, 1);
        let w2 = read_word(group, 2);
        let w3 = read_word(group, 3);

        let ys = [
            sample(w0, 1),
            sample(w1, 0),
            sample(w1, 2),
            sample(w2, 1),
            sample(w3, 0),
            sample(w3, 2),
        ];
        let cbs = [sample(w0, 0), sample(w1, 1), sample(w2, 2)];
        let crs = [sample(w0, 2), sample(w2, 0), sample(w3, 1)];

        // Last group of a row may be partial
        let count = (width - x0).min(V210_PIXELS_PER_GROUP);

        for (i, y) in ys.iter().take(count).enumerate() {
            write_sample(luma, x0 + i, *y);
        }

        for pair in 0..count / 2 {
            write_sample(chroma, x0 + pair * 2, cbs[pair]);
            write_sample(chroma, x0 + pair * 2 + 1, crs[pair]);
        }
    }
}

/// Reshapes one frame payload into another layout
///
/// A formatter is configured once per video state and then reused for every
/// frame of that state.
pub trait FrameFormatter: Send {
    /// Prepare for frames described by `descriptor`
    fn configure(&mut self, descriptor: &VideoFrameDescriptor) -> Result<()>;

    /// Transcode `src` into `dst`
    fn format_frame(&self, src: &[u8], dst: &mut [u8]) -> Result<()>;

    /// Exact size of one output frame in bytes
    fn output_frame_size(&self) -> usize;

    /// Pixel format written to `dst`
    fn output_format(&self) -> PixelFormat;

    /// Whether output bytes are identical to input bytes
    fn is_passthrough(&self) -> bool {
        false
    }
}

/// Identity formatter
#[derive(Debug, Clone, Default)]
pub struct PassthroughFormatter {
    descriptor: Option<VideoFrameDescriptor>,
}

impl PassthroughFormatter {
    /// Create an unconfigured pass-through formatter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameFormatter for PassthroughFormatter {
    fn configure(&mut self, descriptor: &VideoFrameDescriptor) -> Result<()> {
        self.descriptor = Some(*descriptor);
        Ok(())
    }

    fn format_frame(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        let size = self.output_frame_size();
        if self.descriptor.is_none() {
            return Err(ConversionError::NotConfigured);
        }
        if src.len() < size {
            return Err(ConversionError::SourceTooSmall {
                expected: size,
                actual: src.len(),
            });
        }
        if dst.len() < size {
            return Err(ConversionError::DestinationTooSmall {
                expected: size,
                actual: dst.len(),
            });
        }

        dst[..size].copy_from_slice(&src[..size]);
        Ok(())
    }

    fn output_frame_size(&self) -> usize {
        self.descriptor.map_or(0, |d| d.buffer_size)
    }

    fn output_format(&self) -> PixelFormat {
        self.descriptor.map_or(PixelFormat::Unknown, |d| d.pixel_format)
    }

    fn is_passthrough(&self) -> bool {
        true
    }
}

/// v210 to P210 formatter
#[derive(Debug, Clone, Default)]
pub struct V210ToP210Formatter {
    width: u32,
    height: u32,
}

impl V210ToP210Formatter {
    /// Create an unconfigured formatter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameFormatter for V210ToP210Formatter {
    fn configure(&mut self, descriptor: &VideoFrameDescriptor) -> Result<()> {
        if descriptor.pixel_format != PixelFormat::V210 {
            return Err(ConversionError::UnsupportedConversion {
                from: descriptor.pixel_format,
                to: PixelFormat::P210,
            });
        }
        check_422_dimensions(descriptor.width, descriptor.height)?;

        // Descriptor must cover the full v210 layout
        let expected = v210_row_stride(descriptor.width).saturating_mul(descriptor.height as usize);
        if descriptor.buffer_size < expected {
            return Err(ConversionError::SourceTooSmall {
                expected,
                actual: descriptor.buffer_size,
            });
        }

        self.width = descriptor.width;
        self.height = descriptor.height;
        Ok(())
    }

    fn format_frame(&self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        if self.width == 0 {
            return Err(ConversionError::NotConfigured);
        }
        v210_to_p210(src, dst, self.width, self.height)
    }

    fn output_frame_size(&self) -> usize {
        p210_frame_size(self.width, self.height)
    }

    fn output_format(&self) -> PixelFormat {
        PixelFormat::P210
    }
}

/// Conversion policy applied between capture and renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoConversion {
    /// Deliver frames in the captured format
    #[default]
    None,
    /// Repack v210 frames to P210; other formats pass through
    V210ToP210,
}

impl VideoConversion {
    /// Whether this policy changes frames of `source` format
    #[must_use]
    pub fn applies_to(self, source: PixelFormat) -> bool {
        matches!((self, source), (VideoConversion::V210ToP210, PixelFormat::V210))
    }

    /// Format the renderer receives for a `source` capture format
    #[must_use]
    pub fn output_format(self, source: PixelFormat) -> PixelFormat {
        if self.applies_to(source) {
            PixelFormat::P210
        } else {
            source
        }
    }
}

impl fmt::Display for VideoConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoConversion::None => f.write_str("None"),
            VideoConversion::V210ToP210 => f.write_str("V210 to P210"),
        }
    }
}

/// Pick the formatter for a capture format under a conversion policy
#[must_use]
pub fn formatter_for(source: PixelFormat, conversion: VideoConversion) -> Box<dyn FrameFormatter> {
    if conversion.applies_to(source) {
        Box::new(V210ToP210Formatter::new())
    } else {
        Box::new(PassthroughFormatter::new())
    }
}

/// Conversion statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Frames produced
    pub frames_converted: u64,

    /// Source bytes consumed
    pub bytes_in: u64,

    /// Output bytes produced
    pub bytes_out: u64,

    /// Frames rejected by the formatter
    pub failures: u64,
}

/// Formatter plus a reusable output buffer
///
/// Holds one output frame worth of memory so steady-state conversion does
/// not allocate.
pub struct FrameConverter {
    formatter: Box<dyn FrameFormatter>,
    output_buffer: Vec<u8>,
    output_descriptor: VideoFrameDescriptor,
    stats: ConversionStats,
}

impl FrameConverter {
    /// Create a converter for frames described by `source`
    pub fn new(source: &VideoFrameDescriptor, conversion: VideoConversion) -> Result<Self> {
        let mut formatter = formatter_for(source.pixel_format, conversion);
        formatter.configure(source)?;

        let output_descriptor =
            source.with_format(formatter.output_format(), formatter.output_frame_size());

        debug!(
            "Frame converter {} -> {} ({}x{}, {} bytes out)",
            source.pixel_format,
            output_descriptor.pixel_format,
            source.width,
            source.height,
            output_descriptor.buffer_size
        );

        let output_buffer = if formatter.is_passthrough() {
            Vec::new()
        } else {
            vec![0u8; output_descriptor.buffer_size]
        };

        Ok(Self {
            formatter,
            output_buffer,
            output_descriptor,
            stats: ConversionStats::default(),
        })
    }

    /// Descriptor of converted frames
    #[must_use]
    pub fn output_descriptor(&self) -> VideoFrameDescriptor {
        self.output_descriptor
    }

    /// Exact output frame size in bytes
    #[must_use]
    pub fn output_frame_size(&self) -> usize {
        self.output_descriptor.buffer_size
    }

    /// Whether frames are forwarded untouched
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.formatter.is_passthrough()
    }

    /// Convert one frame
    ///
    /// Returns the converted payload, valid until the next call. Pass-through
    /// converters hand back `src` itself.
    pub fn convert<'a>(&'a mut self, src: &'a [u8]) -> Result<&'a [u8]> {
        let out_size = self.output_descriptor.buffer_size;

        if self.formatter.is_passthrough() {
            if src.len() < out_size {
                self.stats.failures += 1;
                return Err(ConversionError::SourceTooSmall {
                    expected: out_size,
                    actual: src.len(),
                });
            }
            self.record(src.len(), out_size);
            return Ok(&src[..out_size]);
        }

        if self.output_buffer.len() != out_size {
            self.output_buffer.resize(out_size, 0);
        }

        if let Err(e) = self.formatter.format_frame(src, &mut self.output_buffer) {
            self.stats.failures += 1;
            return Err(e);
        }

        self.record(src.len(), out_size);
        Ok(&self.output_buffer)
    }

    fn record(&mut self, bytes_in: usize, bytes_out: usize) {
        self.stats.frames_converted += 1;
        self.stats.bytes_in += bytes_in as u64;
        self.stats.bytes_out += bytes_out as u64;
    }

    /// Get statistics
    #[must_use]
    pub fn stats(&self) -> ConversionStats {
        self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = ConversionStats::default();
    }
}

impl fmt::Debug for FrameConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameConverter")
            .field("output_descriptor", &self.output_descriptor)
            .field("passthrough", &self.formatter.is_passthrough())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    fn luma_value(x: usize, y: usize) -> u16 {
        ((x * 7 + y * 13 + 64) % 1024) as u16
    }

    fn cb_value(pair: usize, y: usize) -> u16 {
        ((pair * 3 + y * 5 + 100) % 1024) as u16
    }

    fn cr_value(pair: usize, y: usize) -> u16 {
        ((pair * 11 + y * 2 + 500) % 1024) as u16
    }

    /// Pack a synthetic v210 frame from the value functions above
    fn pack_v210(width: u32, height: u32) -> Vec<u8> {
        let w = width as usize;
        let stride = v210_row_stride(width);
        let mut frame = vec![0u8; stride * height as usize];

        for y in 0..height as usize {
            let groups = (w + V210_PIXELS_PER_GROUP - 1) / V210_PIXELS_PER_GROUP;
            for g in 0..groups {
                let x0 = g * V210_PIXELS_PER_GROUP;
                let luma = |i: usize| -> u32 {
                    if x0 + i < w {
                        u32::from(luma_value(x0 + i, y))
                    } else {
                        0
                    }
                };
                let chroma = |p: usize| -> (u32, u32) {
                    if x0 + 2 * p < w {
                        let pair = x0 / 2 + p;
                        (u32::from(cb_value(pair, y)), u32::from(cr_value(pair, y)))
                    } else {
                        (0, 0)
                    }
                };

                let (cb0, cr0) = chroma(0);
                let (cb1, cr1) = chroma(1);
                let (cb2, cr2) = chroma(2);
                let words = [
                    cb0 | luma(0) << 10 | cr0 << 20,
                    luma(1) | cb1 << 10 | luma(2) << 20,
                    cr1 | luma(3) << 10 | cb2 << 20,
                    luma(4) | cr2 << 10 | luma(5) << 20,
                ];

                let offset = y * stride + g * V210_BYTES_PER_GROUP;
                for (i, word) in words.iter().enumerate() {
                    frame[offset + i * 4..offset + i * 4 + 4].copy_from_slice(&word.to_le_bytes());
                }
            }
        }

        frame
    }

    fn read_u16(buf: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([buf[offset], buf[offset + 1]])
    }

    fn assert_planes_match(planar: &[u8], width: u32, height: u32) {
        let stride = p210_row_stride(width);
        let luma_size = stride * height as usize;

        for y in 0..height as usize {
            for x in 0..width as usize {
                let got = read_u16(planar, y * stride + x * 2);
                assert_eq!(got, luma_value(x, y) << 6, "luma mismatch at ({x}, {y})");
            }
            for pair in 0..width as usize / 2 {
                let base = luma_size + y * stride + pair * 4;
                assert_eq!(read_u16(planar, base), cb_value(pair, y) << 6, "cb at ({pair}, {y})");
                assert_eq!(read_u16(planar, base + 2), cr_value(pair, y) << 6, "cr at ({pair}, {y})");
            }
        }
    }

    #[test]
    fn test_strides() {
        assert_eq!(v210_row_stride(1920), 5120);
        assert_eq!(v210_row_stride(1280), 3456);
        assert_eq!(v210_row_stride(720), 1920);
        assert_eq!(v210_row_stride(12), 128);
        assert_eq!(p210_row_stride(1920), 3840);
        assert_eq!(p210_frame_size(1920, 1080), 1920 * 1080 * 4);
    }

    #[test]
    fn test_v210_to_p210_full_groups() {
        // Two full groups per row
        let (width, height) = (12, 3);
        let src = pack_v210(width, height);
        let mut dst = vec![0u8; p210_frame_size(width, height)];

        v210_to_p210(&src, &mut dst, width, height).expect("conversion should succeed");
        assert_planes_match(&dst, width, height);
    }

    #[test]
    fn test_v210_to_p210_multi_group_rows() {
        // 1280 is not a multiple of 48 so rows carry padding
        let (width, height) = (1280, 4);
        let src = pack_v210(width, height);
        let mut dst = vec![0u8; p210_frame_size(width, height)];

        v210_to_p210(&src, &mut dst, width, height).expect("conversion should succeed");
        assert_planes_match(&dst, width, height);
    }

    #[test]
    fn test_v210_to_p210_partial_last_group() {
        let (width, height) = (16, 2);
        let src = pack_v210(width, height);
        let mut dst = vec![0xAAu8; p210_frame_size(width, height)];

        v210_to_p210(&src, &mut dst, width, height).expect("conversion should succeed");
        assert_planes_match(&dst, width, height);
    }

    #[test]
    fn test_max_sample_uses_high_bits() {
        let (width, height) = (6, 1);
        let mut src = vec![0u8; v210_row_stride(width)];
        let all_ones: u32 = 0x3fff_ffff;
        for i in 0..4 {
            src[i * 4..i * 4 + 4].copy_from_slice(&all_ones.to_le_bytes());
        }
        let mut dst = vec![0u8; p210_frame_size(width, height)];

        v210_to_p210(&src, &mut dst, width, height).expect("conversion should succeed");
        assert!(dst.chunks_exact(2).all(|s| read_u16(s, 0) == 0xffc0));
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut dst = vec![0u8; 64];
        let err = v210_to_p210(&[0u8; 128], &mut dst, 5, 1).expect_err("odd width");
        assert!(matches!(err, ConversionError::InvalidDimensions { .. }));

        let err = v210_to_p210(&[], &mut dst, 0, 1).expect_err("zero width");
        assert!(matches!(err, ConversionError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_buffer_validation_precedes_writes() {
        let (width, height) = (12, 2);
        let src = pack_v210(width, height);

        let err = v210_to_p210(&src[..src.len() - 1], &mut [0u8; 96], width, height)
            .expect_err("short source");
        assert_eq!(
            err,
            ConversionError::SourceTooSmall {
                expected: 256,
                actual: 255
            }
        );

        let mut short_dst = vec![0x55u8; p210_frame_size(width, height) - 2];
        let err = v210_to_p210(&src, &mut short_dst, width, height).expect_err("short dest");
        assert!(matches!(err, ConversionError::DestinationTooSmall { .. }));
        assert!(short_dst.iter().all(|b| *b == 0x55));
    }

    #[test]
    fn test_formatter_selection() {
        let v210 = formatter_for(PixelFormat::V210, VideoConversion::V210ToP210);
        assert!(!v210.is_passthrough());
        assert_eq!(v210.output_format(), PixelFormat::P210);

        let uyvy = formatter_for(PixelFormat::UYVY, VideoConversion::V210ToP210);
        assert!(uyvy.is_passthrough());

        let none = formatter_for(PixelFormat::V210, VideoConversion::None);
        assert!(none.is_passthrough());

        assert_eq!(
            VideoConversion::V210ToP210.output_format(PixelFormat::R210),
            PixelFormat::R210
        );
    }

    #[test]
    fn test_v210_formatter_rejects_other_formats() {
        let mut formatter = V210ToP210Formatter::new();
        let descriptor = VideoFrameDescriptor::new(PixelFormat::UYVY, 1920, 1080, 1920 * 1080 * 2);
        let err = formatter.configure(&descriptor).expect_err("UYVY is not v210");
        assert!(matches!(err, ConversionError::UnsupportedConversion { .. }));

        let err = formatter.format_frame(&[], &mut []).expect_err("not configured");
        assert_eq!(err, ConversionError::NotConfigured);
    }

    #[test]
    fn test_short_descriptor_rejected_at_configure() {
        init_tracing();
        let (width, height) = (1280, 720);
        let expected = v210_row_stride(width) * height as usize;
        let short = VideoFrameDescriptor::new(PixelFormat::V210, width, height, expected - 1);

        let err = FrameConverter::new(&short, VideoConversion::V210ToP210).expect_err("short descriptor");
        assert_eq!(
            err,
            ConversionError::SourceTooSmall {
                expected,
                actual: expected - 1
            }
        );

        // Pass-through does not care about the v210 layout
        assert!(FrameConverter::new(&short, VideoConversion::None).is_ok());
    }

    #[test]
    fn test_frame_converter_reuses_buffer() {
        init_tracing();
        let (width, height) = (48, 2);
        let source = VideoFrameDescriptor::new(
            PixelFormat::V210,
            width,
            height,
            v210_row_stride(width) * height as usize,
        );
        let mut converter =
            FrameConverter::new(&source, VideoConversion::V210ToP210).expect("converter");
        let src = pack_v210(width, height);

        let first_ptr = converter.convert(&src).expect("first frame").as_ptr();
        let second = converter.convert(&src).expect("second frame");
        assert_eq!(second.as_ptr(), first_ptr);
        assert_planes_match(second, width, height);

        let stats = converter.stats();
        assert_eq!(stats.frames_converted, 2);
        assert_eq!(stats.bytes_out, 2 * p210_frame_size(width, height) as u64);

        assert!(converter.convert(&src[..10]).is_err());
        assert_eq!(converter.stats().failures, 1);

        converter.reset_stats();
        assert_eq!(converter.stats(), ConversionStats::default());
    }

    #[test]
    fn test_frame_converter_passthrough() {
        let source = VideoFrameDescriptor::new(PixelFormat::UYVY, 4, 2, 16);
        let mut converter = FrameConverter::new(&source, VideoConversion::None).expect("converter");
        assert!(converter.is_passthrough());
        assert_eq!(converter.output_descriptor(), source);

        let payload: Vec<u8> = (0..16).collect();
        let out = converter.convert(&payload).expect("pass-through");
        assert_eq!(out, payload.as_slice());
        assert_eq!(out.as_ptr(), payload.as_ptr());
    }
}
