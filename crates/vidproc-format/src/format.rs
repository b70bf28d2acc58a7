//! Pixel Format Catalog
//!
//! Static description of the pixel encodings a capture source can produce and
//! a renderer can consume. Every lookup is a pure function of the tag.
//!
//! # Examples
//!
//! ```rust
//! use vidproc_format::{FourCc, PixelFormat};
//!
//! let info = PixelFormat::V210.info();
//! assert_eq!(info.bits_per_pixel, 20);
//! assert_eq!(info.fourcc, FourCc::from_bytes(*b"v210"));
//! assert_eq!(PixelFormat::from_fourcc(info.fourcc), Some(PixelFormat::V210));
//! ```

use std::fmt;

/// Four-character code identifying a pixel encoding
///
/// Packed the same way as `MAKEFOURCC`: the first character lives in the
/// least significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FourCc(pub u32);

impl FourCc {
    /// The zero code, used for formats without a FourCC
    pub const NONE: FourCc = FourCc(0);

    /// Build a code from its four characters
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        FourCc(u32::from_le_bytes(bytes))
    }

    /// The four characters, first character first
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for b in bytes {
                write!(f, "{}", char::from(b))?;
            }
            Ok(())
        } else {
            write!(f, "0x{:08x}", self.0)
        }
    }
}

/// Catalog entry for a pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatInfo {
    /// Average bits per pixel; implied uncompressed depth for compressed formats
    pub bits_per_pixel: u32,

    /// Stable four-character identifier
    pub fourcc: FourCc,

    /// Human-readable name
    pub name: &'static str,
}

/// Pixel encodings known to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// Not yet known
    #[default]
    Unknown,
    /// UYVY 4:2:2, four 8-bit components per 32-bit LE word
    UYVY,
    /// v210 4:2:2, twelve 10-bit components in four 32-bit LE words
    V210,
    /// ARGB 8-bit, alpha valid
    ARGB,
    /// BGRA 8-bit, alpha may be valid
    BGRA,
    /// r210, three 10-bit components per 32-bit BE word
    R210,
    /// R10b, three 10-bit components per 32-bit BE word
    R10b,
    /// R10l, three 10-bit components per 32-bit LE word
    R10l,
    /// R12B, 12-bit BE RGB full range
    R12B,
    /// R12L, 12-bit LE RGB full range
    R12L,
    /// P210 4:2:2 planar, 10-bit samples in 16-bit containers
    P210,
    /// H.265 compressed
    H265,
    /// Avid DNxHR compressed
    DNxHR,
}

impl PixelFormat {
    /// All known formats, `Unknown` excluded
    pub const ALL: [PixelFormat; 12] = [
        PixelFormat::UYVY,
        PixelFormat::V210,
        PixelFormat::ARGB,
        PixelFormat::BGRA,
        PixelFormat::R210,
        PixelFormat::R10b,
        PixelFormat::R10l,
        PixelFormat::R12B,
        PixelFormat::R12L,
        PixelFormat::P210,
        PixelFormat::H265,
        PixelFormat::DNxHR,
    ];

    /// Look up the catalog entry for this format
    #[must_use]
    pub const fn info(self) -> PixelFormatInfo {
        let (bits_per_pixel, fourcc, name) = match self {
            PixelFormat::Unknown => (0, FourCc::NONE, "Unknown"),
            PixelFormat::UYVY => (16, FourCc::from_bytes(*b"UYVY"), "YUV 4:2:2 8-bit"),
            PixelFormat::V210 => (20, FourCc::from_bytes(*b"v210"), "YUV 4:2:2 10-bit"),
            PixelFormat::ARGB => (32, FourCc::from_bytes(*b"ARGB"), "ARGB 8-bit"),
            PixelFormat::BGRA => (32, FourCc::from_bytes(*b"BGRA"), "BGRA 8-bit"),
            PixelFormat::R210 => (32, FourCc::from_bytes(*b"r210"), "RGB 10-bit"),
            PixelFormat::R10b => (32, FourCc::from_bytes(*b"R10b"), "RGB 10-bit BE"),
            PixelFormat::R10l => (32, FourCc::from_bytes(*b"R10l"), "RGB 10-bit LE"),
            PixelFormat::R12B => (36, FourCc::from_bytes(*b"R12B"), "RGB 12-bit BE"),
            PixelFormat::R12L => (36, FourCc::from_bytes(*b"R12L"), "RGB 12-bit LE"),
            PixelFormat::P210 => (32, FourCc::from_bytes(*b"P210"), "YUV 4:2:2 planar 16-bit"),
            PixelFormat::H265 => (24, FourCc::from_bytes(*b"HEVC"), "H.265"),
            PixelFormat::DNxHR => (24, FourCc::from_bytes(*b"AVdh"), "DNxHR"),
        };

        PixelFormatInfo {
            bits_per_pixel,
            fourcc,
            name,
        }
    }

    /// Bits per pixel
    #[must_use]
    pub const fn bits_per_pixel(self) -> u32 {
        self.info().bits_per_pixel
    }

    /// Four-character code
    #[must_use]
    pub const fn fourcc(self) -> FourCc {
        self.info().fourcc
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.info().name
    }

    /// Reverse lookup by four-character code
    #[must_use]
    pub fn from_fourcc(fourcc: FourCc) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.fourcc() == fourcc)
    }

    /// Whether this is one of the RGB families
    #[must_use]
    pub const fn is_rgb(self) -> bool {
        matches!(
            self,
            PixelFormat::ARGB
                | PixelFormat::BGRA
                | PixelFormat::R210
                | PixelFormat::R10b
                | PixelFormat::R10l
                | PixelFormat::R12B
                | PixelFormat::R12L
        )
    }

    /// Whether frames carry a compressed bitstream
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        matches!(self, PixelFormat::H265 | PixelFormat::DNxHR)
    }

    /// Whether samples are stored in separate planes
    #[must_use]
    pub const fn is_planar(self) -> bool {
        matches!(self, PixelFormat::P210)
    }

    /// Bitmap header compression value
    ///
    /// Uncompressed RGB formats report `0` (BI_RGB); everything else reports
    /// its FourCC.
    #[must_use]
    pub const fn bitmap_compression(self) -> u32 {
        if self.is_rgb() {
            0
        } else {
            self.fourcc().0
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
