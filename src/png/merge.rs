//! Structured-chunk merge: concatenate IDAT payloads, inflate, unfilter,
//! join planes row-wise, then re-emit a single taller PNG.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::chunk::{write_chunk, ChunkReader};
use super::{parse_header, ColorMode, PngHeader, SIGNATURE};
use crate::error::StitchError;
use crate::filter;
use crate::limits::Limits;

/// Decode one PNG buffer to its raw, filter-free sample plane.
pub(crate) fn decode_plane(
    data: &[u8],
    limits: Option<&Limits>,
) -> Result<(PngHeader, Vec<u8>), StitchError> {
    let header = parse_header(data)?;
    if header.interlace != 0 {
        return Err(StitchError::UnsupportedVariant(
            "interlaced PNG".into(),
        ));
    }
    if header.color == ColorMode::Indexed {
        return Err(StitchError::UnsupportedVariant(
            "indexed-color PNG (palette merge would corrupt colors)".into(),
        ));
    }
    let row_bytes = header.row_bytes()?;
    let plane_bytes = row_bytes
        .checked_mul(header.height as usize)
        .ok_or(StitchError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    if let Some(limits) = limits {
        limits.check(header.width, header.height)?;
        limits.check_memory(plane_bytes)?;
    }

    let mut blob = Vec::new();
    let mut chunks = ChunkReader::new(data);
    while let Some(chunk) = chunks.next_chunk()? {
        match &chunk.tag {
            b"IDAT" => blob.extend_from_slice(chunk.data),
            b"IEND" => break,
            _ => {}
        }
    }
    if blob.is_empty() {
        return Err(StitchError::Decode("no IDAT chunk".into()));
    }

    let expected = plane_bytes
        .checked_add(header.height as usize)
        .ok_or(StitchError::DimensionsTooLarge {
            width: header.width,
            height: header.height,
        })?;
    // Cap the inflate at the header-derived size: a stream that expands past
    // it is rejected below anyway, so never materialize more than one extra
    // byte of it.
    let mut raw = Vec::with_capacity(expected);
    ZlibDecoder::new(&blob[..])
        .take(expected as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| StitchError::Decode(format!("inflate failed: {e}")))?;

    if raw.len() > expected {
        return Err(StitchError::Decode(format!(
            "inflated payload exceeds the {expected} bytes the header describes"
        )));
    }
    if raw.len() < expected {
        return Err(StitchError::Decode(format!(
            "inflated payload is {} bytes, expected {expected}",
            raw.len()
        )));
    }

    let plane = filter::unfilter(&raw, row_bytes, header.height as usize, header.filter_bpp())?;
    Ok((header, plane))
}

/// Decode every input and concatenate the planes in input order.
///
/// The returned header carries the summed height; all other fields are the
/// validated-identical fields of the first input.
pub(crate) fn merge_planes(
    buffers: &[&[u8]],
    limits: Option<&Limits>,
) -> Result<(PngHeader, Vec<u8>), StitchError> {
    let first = buffers.first().ok_or(StitchError::EmptyInput)?;
    let (mut header, mut plane) = decode_plane(first, limits)?;

    for (i, buf) in buffers.iter().enumerate().skip(1) {
        let (next, next_plane) = decode_plane(buf, limits)?;
        if next.width != header.width
            || next.bit_depth != header.bit_depth
            || next.color != header.color
        {
            return Err(StitchError::FormatMismatch(format!(
                "buffer {i} is {}px wide, depth {}, {:?}; expected {}px, depth {}, {:?}",
                next.width,
                next.bit_depth,
                next.color,
                header.width,
                header.bit_depth,
                header.color,
            )));
        }
        header.height = header.height.checked_add(next.height).ok_or(
            StitchError::DimensionsTooLarge {
                width: header.width,
                height: u32::MAX,
            },
        )?;
        plane.extend_from_slice(&next_plane);
    }

    if let Some(limits) = limits {
        limits.check(header.width, header.height)?;
        limits.check_memory(plane.len())?;
    }
    Ok((header, plane))
}

/// Re-encode a raw plane as a single PNG: signature, IHDR, one IDAT holding
/// the filter-0 rows deflated at maximum compression, and IEND.
pub(crate) fn encode_plane(plane: &[u8], header: &PngHeader) -> Result<Vec<u8>, StitchError> {
    let row_bytes = header.row_bytes()?;
    debug_assert_eq!(plane.len(), row_bytes * header.height as usize);

    let raw = filter::filter_none(plane, row_bytes);
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(raw.len() / 2),
        Compression::best(),
    );
    encoder.write_all(&raw)?;
    let compressed = encoder.finish()?;

    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&header.width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&header.height.to_be_bytes());
    ihdr[8] = header.bit_depth;
    ihdr[9] = header.color.as_u8();
    // compression, filter, interlace are always 0 on the re-encode path
    let mut out = Vec::with_capacity(8 + 25 + 12 + compressed.len() + 12);
    out.extend_from_slice(SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &compressed);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Full PNG merge: N same-geometry PNG buffers in, one taller PNG out.
pub(crate) fn merge(buffers: &[&[u8]], limits: Option<&Limits>) -> Result<Vec<u8>, StitchError> {
    let (header, plane) = merge_planes(buffers, limits)?;
    encode_plane(&plane, &header)
}
