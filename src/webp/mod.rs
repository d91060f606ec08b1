//! WebP merge strategy and animated-container assembly.
//!
//! Merging to WebP routes through the PNG merge: inputs are normalized to a
//! single merged plane, emitted as PNG, then handed to a pluggable still
//! encoder for recompression. If that encoder fails for any reason the
//! merged PNG is returned unchanged — a complete, valid output is always
//! preferred over format fidelity. This is deliberate policy, not a bug.

pub(crate) mod anim;

use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageFormat};

use crate::error::StitchError;
use crate::format::RasterFormat;
use crate::limits::Limits;
use crate::merge::MergeOutput;
use crate::png::{self, ColorMode, PngHeader};
use crate::{jpeg, StitchResult};

/// Pluggable still-image WebP encoder.
///
/// The engine never links a lossy codec itself; callers with one (libwebp,
/// a hardware encoder) inject it here. The default is the lossless encoder
/// from the `image` crate.
pub trait WebpStillEncoder {
    /// Encode an RGBA8 plane as one WebP still.
    fn encode_rgba(&self, rgba: &[u8], width: u32, height: u32) -> StitchResult<Vec<u8>>;
}

/// Default recompressor: lossless VP8L via the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LosslessWebpEncoder;

impl WebpStillEncoder for LosslessWebpEncoder {
    fn encode_rgba(&self, rgba: &[u8], width: u32, height: u32) -> StitchResult<Vec<u8>> {
        let mut out = Vec::new();
        WebPEncoder::new_lossless(&mut out).encode(rgba, width, height, ExtendedColorType::Rgba8)?;
        Ok(out)
    }
}

/// Decode a WebP still to an RGBA8 plane.
pub(crate) fn decode_rgba(data: &[u8]) -> Result<(u32, u32, Vec<u8>), StitchError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::WebP)?;
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok((width, height, rgba.into_raw()))
}

/// Merge to WebP by normalizing through PNG first.
///
/// PNG inputs go through the structured-chunk merge directly; JPEG and WebP
/// inputs are decoded to RGBA planes and joined row-wise. The merged image
/// is then recompressed via `encoder`, falling back to the merged PNG when
/// that fails.
pub(crate) fn merge(
    buffers: &[&[u8]],
    input: RasterFormat,
    limits: Option<&Limits>,
    encoder: &dyn WebpStillEncoder,
) -> Result<MergeOutput, StitchError> {
    let (header, plane) = match input {
        RasterFormat::Png => png::merge_planes(buffers, limits)?,
        RasterFormat::Jpeg | RasterFormat::Webp => {
            type Decoder = fn(&[u8]) -> Result<(u32, u32, Vec<u8>), StitchError>;
            let decode: Decoder = match input {
                RasterFormat::Jpeg => jpeg::decode_rgba,
                _ => decode_rgba,
            };
            let first = buffers.first().ok_or(StitchError::EmptyInput)?;
            let (width, mut total_height, mut plane) = decode(first)?;
            for (i, buf) in buffers.iter().enumerate().skip(1) {
                let (w, h, p) = decode(buf)?;
                if w != width {
                    return Err(StitchError::FormatMismatch(format!(
                        "buffer {i} is {w}px wide, expected {width}px"
                    )));
                }
                total_height = total_height.checked_add(h).ok_or(
                    StitchError::DimensionsTooLarge {
                        width,
                        height: u32::MAX,
                    },
                )?;
                plane.extend_from_slice(&p);
            }
            if let Some(limits) = limits {
                limits.check(width, total_height)?;
                limits.check_memory(plane.len())?;
            }
            let header = PngHeader {
                width,
                height: total_height,
                bit_depth: 8,
                color: ColorMode::Rgba,
                interlace: 0,
            };
            (header, plane)
        }
    };

    let png_bytes = png::encode_plane(&plane, &header)?;

    let recompressed = plane_to_rgba(&plane, &header)
        .ok_or_else(|| {
            StitchError::UnsupportedVariant(format!(
                "cannot recompress depth-{} {:?} plane to WebP",
                header.bit_depth, header.color
            ))
        })
        .and_then(|rgba| encoder.encode_rgba(&rgba, header.width, header.height));

    match recompressed {
        Ok(bytes) => Ok(MergeOutput {
            bytes,
            format: RasterFormat::Webp,
        }),
        // Degrade gracefully: the merged PNG is complete and valid.
        Err(_) => Ok(MergeOutput {
            bytes: png_bytes,
            format: RasterFormat::Png,
        }),
    }
}

/// Expand an 8-bit plane to RGBA8 for the still encoder. Returns `None` for
/// depths/modes the recompression path does not take.
fn plane_to_rgba(plane: &[u8], header: &PngHeader) -> Option<Vec<u8>> {
    if header.bit_depth != 8 {
        return None;
    }
    match header.color {
        ColorMode::Rgba => Some(plane.to_vec()),
        ColorMode::Rgb => {
            let mut out = Vec::with_capacity(plane.len() / 3 * 4);
            for px in plane.chunks_exact(3) {
                out.extend_from_slice(px);
                out.push(255);
            }
            Some(out)
        }
        ColorMode::Gray => {
            let mut out = Vec::with_capacity(plane.len() * 4);
            for &g in plane {
                out.extend_from_slice(&[g, g, g, 255]);
            }
            Some(out)
        }
        ColorMode::GrayAlpha => {
            let mut out = Vec::with_capacity(plane.len() * 2);
            for px in plane.chunks_exact(2) {
                out.extend_from_slice(&[px[0], px[0], px[0], px[1]]);
            }
            Some(out)
        }
        ColorMode::Indexed => None,
    }
}
