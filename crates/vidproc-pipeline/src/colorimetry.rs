//! Renderer colorimetry
//!
//! Symbolic translation from what a capture source signals (color space,
//! EOTF) to what a renderer is told (primaries, transfer matrix, transfer
//! function, nominal range). User overrides replace individual derived
//! values. No numeric tables live here.

use std::fmt;

use thiserror::Error;

use crate::types::{ColorSpace, Eotf, VideoState};

/// Nominal pixel value range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalRange {
    /// 0-255
    Full,
    /// 16-235
    Limited,
    /// 48-208
    Small,
}

/// Transfer function handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferFunction {
    /// Linear light
    Linear,
    /// Pure gamma 1.8
    Gamma18,
    /// Pure gamma 2.0
    Gamma20,
    /// Pure gamma 2.2
    Gamma22,
    /// BT.709 curve (gamma 2.2 with linear toe)
    Bt709,
    /// SMPTE 240M
    Smpte240m,
    /// sRGB
    Srgb,
    /// Pure gamma 2.8
    Gamma28,
    /// Log 100:1
    Log100,
    /// Log 316:1
    Log316,
    /// SMPTE ST 2084 (PQ)
    St2084,
    /// ARIB STD-B67 (HLG)
    Hlg,
}

/// YCbCr to RGB transfer matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferMatrix {
    /// ITU-R BT.601
    Bt601,
    /// ITU-R BT.709
    Bt709,
    /// SMPTE 240M
    Smpte240m,
    /// BT.2020 non-constant luminance, 10-bit
    Bt2020Ncl10,
    /// BT.2020 non-constant luminance, 12-bit
    Bt2020Ncl12,
    /// FCC
    Fcc,
    /// YCgCo
    YCgCo,
}

/// Color primaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primaries {
    /// BT.709
    Bt709,
    /// BT.470-2 System M
    Bt470SysM,
    /// BT.470-2 System B,G
    Bt470SysBg,
    /// SMPTE 170M
    Smpte170m,
    /// SMPTE 240M
    Smpte240m,
    /// EBU Tech 3213
    Ebu3213,
    /// SMPTE C
    SmpteC,
    /// BT.2020
    Bt2020,
    /// DCI-P3
    DciP3,
}

/// Values forced over the derived colorimetry
///
/// `None` fields are derived from the video state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorimetryOverrides {
    /// Forced nominal range (default: None)
    pub nominal_range: Option<NominalRange>,

    /// Forced transfer function (default: None)
    pub transfer_function: Option<TransferFunction>,

    /// Forced transfer matrix (default: None)
    pub transfer_matrix: Option<TransferMatrix>,

    /// Forced primaries (default: None)
    pub primaries: Option<Primaries>,
}

impl ColorimetryOverrides {
    /// Whether nothing is forced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Colorimetry a renderer is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colorimetry {
    /// `None` lets the renderer decide
    pub nominal_range: Option<NominalRange>,

    /// Transfer function
    pub transfer_function: TransferFunction,

    /// Transfer matrix
    pub transfer_matrix: TransferMatrix,

    /// Primaries
    pub primaries: Primaries,
}

impl fmt::Display for Colorimetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?}/{:?}",
            self.primaries, self.transfer_matrix, self.transfer_function
        )
    }
}

/// Signalled colorimetry with no renderer equivalent
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorimetryError {
    /// No primaries for this color space
    #[error("No primaries known for color space {0:?}")]
    Primaries(ColorSpace),

    /// No transfer matrix for this color space
    #[error("No transfer matrix known for color space {0:?}")]
    TransferMatrix(ColorSpace),

    /// No transfer function for this EOTF in this color space
    #[error("No transfer function known for {eotf:?} in {color_space:?}")]
    TransferFunction {
        /// Signalled EOTF
        eotf: Eotf,
        /// Signalled color space
        color_space: ColorSpace,
    },
}

/// Primaries for a signalled color space
pub fn primaries_for(color_space: ColorSpace) -> Result<Primaries, ColorimetryError> {
    match color_space {
        ColorSpace::Rec601_525 => Ok(Primaries::Bt470SysM),
        ColorSpace::Rec709 => Ok(Primaries::Bt709),
        ColorSpace::Bt2020 => Ok(Primaries::Bt2020),
        other => Err(ColorimetryError::Primaries(other)),
    }
}

/// Transfer matrix for a signalled color space
pub fn transfer_matrix_for(color_space: ColorSpace) -> Result<TransferMatrix, ColorimetryError> {
    match color_space {
        ColorSpace::Rec601_525 | ColorSpace::Rec601_625 => Ok(TransferMatrix::Bt601),
        ColorSpace::Rec709 => Ok(TransferMatrix::Bt709),
        ColorSpace::Bt2020 => Ok(TransferMatrix::Bt2020Ncl10),
        other => Err(ColorimetryError::TransferMatrix(other)),
    }
}

/// Transfer function for a signalled EOTF
///
/// SDR is only known for Rec.709; PQ and HLG are independent of the
/// color space.
pub fn transfer_function_for(
    eotf: Eotf,
    color_space: ColorSpace,
) -> Result<TransferFunction, ColorimetryError> {
    match (eotf, color_space) {
        (Eotf::Sdr, ColorSpace::Rec709) => Ok(TransferFunction::Bt709),
        (Eotf::Pq, _) => Ok(TransferFunction::St2084),
        (Eotf::Hlg, _) => Ok(TransferFunction::Hlg),
        (eotf, color_space) => Err(ColorimetryError::TransferFunction { eotf, color_space }),
    }
}

/// Derive renderer colorimetry for `video`, applying `overrides`
///
/// A forced value skips its translation entirely, so an override can make
/// an otherwise untranslatable signal renderable.
pub fn derive_colorimetry(
    video: &VideoState,
    overrides: &ColorimetryOverrides,
) -> Result<Colorimetry, ColorimetryError> {
    let primaries = match overrides.primaries {
        Some(p) => p,
        None => primaries_for(video.color_space)?,
    };

    let transfer_matrix = match overrides.transfer_matrix {
        Some(m) => m,
        None => transfer_matrix_for(video.color_space)?,
    };

    let transfer_function = match overrides.transfer_function {
        Some(t) => t,
        None => transfer_function_for(video.eotf, video.color_space)?,
    };

    Ok(Colorimetry {
        nominal_range: overrides.nominal_range,
        transfer_function,
        transfer_matrix,
        primaries,
    })
}
