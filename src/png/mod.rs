//! PNG structured-chunk support: IHDR parsing and the byte-level merge
//! strategy. Merging never rasterizes to a drawing surface, so output height
//! is bounded by memory, not by any platform canvas ceiling.

mod chunk;
mod merge;

pub(crate) use merge::{encode_plane, merge, merge_planes};

use crate::error::StitchError;

pub(crate) const SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// PNG color type (IHDR byte 9).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColorMode {
    Gray,
    Rgb,
    Indexed,
    GrayAlpha,
    Rgba,
}

impl ColorMode {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Gray),
            2 => Some(Self::Rgb),
            3 => Some(Self::Indexed),
            4 => Some(Self::GrayAlpha),
            6 => Some(Self::Rgba),
            _ => None,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::Gray => 0,
            Self::Rgb => 2,
            Self::Indexed => 3,
            Self::GrayAlpha => 4,
            Self::Rgba => 6,
        }
    }

    pub(crate) fn channels(self) -> usize {
        match self {
            Self::Gray | Self::Indexed => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Parsed IHDR fields.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PngHeader {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color: ColorMode,
    pub interlace: u8,
}

impl PngHeader {
    /// Bytes per scanline of raw samples (without the filter byte).
    pub(crate) fn row_bytes(&self) -> Result<usize, StitchError> {
        let bits = (self.width as usize)
            .checked_mul(self.color.channels())
            .and_then(|n| n.checked_mul(self.bit_depth as usize))
            .ok_or(StitchError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            })?;
        bits.checked_add(7)
            .map(|b| b / 8)
            .ok_or(StitchError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            })
    }

    /// Byte distance to the sample one whole pixel to the left, for
    /// filtering. At least 1 even for sub-byte depths.
    pub(crate) fn filter_bpp(&self) -> usize {
        core::cmp::max(
            1,
            self.color.channels() * self.bit_depth as usize / 8,
        )
    }
}

/// Parse the IHDR of a PNG buffer. The IHDR must be the first chunk with a
/// 13-byte body.
pub(crate) fn parse_header(data: &[u8]) -> Result<PngHeader, StitchError> {
    if data.len() < 8 || &data[0..8] != SIGNATURE {
        return Err(StitchError::UnrecognizedFormat);
    }
    let mut chunks = chunk::ChunkReader::new(data);
    let ihdr = chunks
        .next_chunk()?
        .ok_or(StitchError::UnexpectedEof)?;
    if &ihdr.tag != b"IHDR" || ihdr.data.len() != 13 {
        return Err(StitchError::InvalidHeader(
            "first chunk is not a 13-byte IHDR".into(),
        ));
    }
    let d = ihdr.data;
    let width = u32::from_be_bytes([d[0], d[1], d[2], d[3]]);
    let height = u32::from_be_bytes([d[4], d[5], d[6], d[7]]);
    let bit_depth = d[8];
    let color = ColorMode::from_u8(d[9])
        .ok_or_else(|| StitchError::InvalidHeader(format!("unknown color type {}", d[9])))?;
    let compression = d[10];
    let filter = d[11];
    let interlace = d[12];

    if width == 0 || height == 0 {
        return Err(StitchError::InvalidHeader(format!(
            "zero dimension: {width}x{height}"
        )));
    }
    if !matches!(bit_depth, 1 | 2 | 4 | 8 | 16) {
        return Err(StitchError::InvalidHeader(format!(
            "invalid bit depth {bit_depth}"
        )));
    }
    if compression != 0 || filter != 0 {
        return Err(StitchError::InvalidHeader(format!(
            "unknown compression/filter method {compression}/{filter}"
        )));
    }

    Ok(PngHeader {
        width,
        height,
        bit_depth,
        color,
        interlace,
    })
}
