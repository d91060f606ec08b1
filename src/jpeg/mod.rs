//! JPEG merge strategy: decode every input to an RGBA plane, concatenate by
//! row, and re-encode once at a fixed quality. JPEG has no scanline filter
//! concept, so no filter step applies here.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat};

use crate::error::StitchError;
use crate::limits::Limits;

/// Fixed re-encode quality. One knob, not a tuning surface.
pub(crate) const JPEG_QUALITY: u8 = 90;

/// Decode a JPEG buffer to an RGBA8 plane.
///
/// JPEG carries no alpha; the decoder output keeps a synthetic opaque alpha
/// channel so every merge strategy works over the same 4-byte-per-pixel
/// plane shape.
pub(crate) fn decode_rgba(data: &[u8]) -> Result<(u32, u32, Vec<u8>), StitchError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

/// Encode an RGBA8 plane as baseline JPEG. Alpha is dropped at this
/// boundary since the format cannot carry it.
pub(crate) fn encode_rgba(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, StitchError> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&px[0..3]);
    }
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(&rgb, width, height, ExtendedColorType::Rgb8)?;
    Ok(out)
}

/// Full JPEG merge: decode, concatenate planes, re-encode.
pub(crate) fn merge(buffers: &[&[u8]], limits: Option<&Limits>) -> Result<Vec<u8>, StitchError> {
    let (width, total_height, plane) = merge_rgba_planes(buffers, limits)?;
    encode_rgba(&plane, width, total_height)
}

/// Decode each buffer via the format decoder and concatenate the RGBA
/// planes, validating width equality.
pub(crate) fn merge_rgba_planes(
    buffers: &[&[u8]],
    limits: Option<&Limits>,
) -> Result<(u32, u32, Vec<u8>), StitchError> {
    let first = buffers.first().ok_or(StitchError::EmptyInput)?;
    let (width, mut total_height, mut plane) = decode_rgba(first)?;

    for (i, buf) in buffers.iter().enumerate().skip(1) {
        let (w, h, p) = decode_rgba(buf)?;
        if w != width {
            return Err(StitchError::FormatMismatch(format!(
                "buffer {i} is {w}px wide, expected {width}px"
            )));
        }
        total_height = total_height
            .checked_add(h)
            .ok_or(StitchError::DimensionsTooLarge {
                width,
                height: u32::MAX,
            })?;
        plane.extend_from_slice(&p);
    }

    if let Some(limits) = limits {
        limits.check(width, total_height)?;
        limits.check_memory(plane.len())?;
    }
    Ok((width, total_height, plane))
}
