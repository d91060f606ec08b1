//! Animated WebP assembly: wrap N independently encoded still frames into
//! one RIFF container with VP8X, ANIM, and per-frame ANMF chunks.
//!
//! No partial output: any frame whose compressed sub-bitstream cannot be
//! located aborts the whole assembly. A corrupt animated file is never an
//! acceptable degraded result.

use crate::error::{StitchError, StitchResult};

/// VP8X flag octet: animation bit.
const FLAG_ANIMATION: u8 = 0x02;

/// Largest value a 24-bit duration field can carry.
const MAX_DURATION_MS: u32 = 0xFF_FFFF;

/// One animation frame: an encoded WebP still plus its display duration.
#[derive(Clone, Copy, Debug)]
pub struct AnimationFrame<'a> {
    pub data: &'a [u8],
    pub duration_ms: u32,
}

impl<'a> AnimationFrame<'a> {
    pub fn new(data: &'a [u8], duration_ms: u32) -> Self {
        Self { data, duration_ms }
    }
}

/// Builder for one animated WebP container.
///
/// Every frame must match the canvas dimensions exactly; per-frame offsets,
/// blending, and disposal are not supported and are always written as zero.
#[derive(Debug)]
pub struct AnimationRequest<'a> {
    frames: &'a [AnimationFrame<'a>],
    width: u32,
    height: u32,
    background: u32,
    loop_count: u16,
}

impl<'a> AnimationRequest<'a> {
    pub fn new(frames: &'a [AnimationFrame<'a>], width: u32, height: u32) -> Self {
        Self {
            frames,
            width,
            height,
            background: 0,
            loop_count: 0,
        }
    }

    /// Canvas background color, written big-endian (24-bit RGB plus a
    /// reserved byte).
    pub fn background(mut self, color: u32) -> Self {
        self.background = color;
        self
    }

    /// Number of loops; 0 means loop forever.
    pub fn loop_count(mut self, count: u16) -> Self {
        self.loop_count = count;
        self
    }

    /// Assemble the container.
    pub fn assemble(self) -> StitchResult<Vec<u8>> {
        if self.frames.is_empty() {
            return Err(StitchError::EmptyInput);
        }
        if self.width == 0 || self.height == 0 {
            return Err(StitchError::InvalidHeader(format!(
                "zero canvas dimension: {}x{}",
                self.width, self.height
            )));
        }
        if self.width > 1 << 24 || self.height > 1 << 24 {
            return Err(StitchError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            });
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&[0u8; 4]); // length, patched below
        out.extend_from_slice(b"WEBP");

        // VP8X: canvas size and flags, 18 bytes total.
        out.extend_from_slice(b"VP8X");
        out.extend_from_slice(&10u32.to_le_bytes());
        out.push(FLAG_ANIMATION);
        out.extend_from_slice(&[0u8; 3]);
        push_u24_le(&mut out, self.width - 1);
        push_u24_le(&mut out, self.height - 1);

        // ANIM: background color and loop count, 14 bytes total.
        out.extend_from_slice(b"ANIM");
        out.extend_from_slice(&6u32.to_le_bytes());
        out.extend_from_slice(&self.background.to_be_bytes());
        out.extend_from_slice(&self.loop_count.to_le_bytes());

        for (i, frame) in self.frames.iter().enumerate() {
            let (payload, w, h) = extract_bitstream(frame.data, i)?;
            if w != self.width || h != self.height {
                return Err(StitchError::FormatMismatch(format!(
                    "frame {i} is {w}x{h}, canvas is {}x{}",
                    self.width, self.height
                )));
            }
            let size = u32::try_from(16 + payload.len()).map_err(|_| {
                StitchError::LimitExceeded(format!("frame {i} payload exceeds u32 chunk size"))
            })?;
            out.extend_from_slice(b"ANMF");
            out.extend_from_slice(&size.to_le_bytes());
            push_u24_le(&mut out, 0); // x offset
            push_u24_le(&mut out, 0); // y offset
            push_u24_le(&mut out, w - 1);
            push_u24_le(&mut out, h - 1);
            push_u24_le(&mut out, frame.duration_ms.min(MAX_DURATION_MS));
            out.push(0); // no blending or disposal
            out.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                out.push(0);
            }
        }

        let riff_len = u32::try_from(out.len() - 8).map_err(|_| {
            StitchError::LimitExceeded("animated container exceeds u32 RIFF size".into())
        })?;
        out[4..8].copy_from_slice(&riff_len.to_le_bytes());
        Ok(out)
    }
}

/// Locate frame `index`'s compressed sub-bitstream: skip the still's own
/// 12-byte container header and scan sub-chunks for the first VP8 or VP8L
/// chunk. The returned slice is the whole chunk (tag, size, data), so the
/// emitted ANMF payload stands alone.
fn extract_bitstream(data: &[u8], index: usize) -> Result<(&[u8], u32, u32), StitchError> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return Err(StitchError::FrameExtraction(format!(
            "frame {index} is not a WebP still"
        )));
    }
    let mut pos = 12;
    while pos + 8 <= data.len() {
        let tag = &data[pos..pos + 4];
        let size = u32::from_le_bytes([
            data[pos + 4],
            data[pos + 5],
            data[pos + 6],
            data[pos + 7],
        ]) as usize;
        let end = pos
            .checked_add(8)
            .and_then(|p| p.checked_add(size))
            .filter(|&e| e <= data.len())
            .ok_or_else(|| {
                StitchError::FrameExtraction(format!("frame {index} has a truncated chunk"))
            })?;
        if tag == b"VP8 " || tag == b"VP8L" {
            let dims = if tag == b"VP8 " {
                parse_vp8_dims(&data[pos + 8..end])
            } else {
                parse_vp8l_dims(&data[pos + 8..end])
            };
            let (w, h) = dims.ok_or_else(|| {
                StitchError::FrameExtraction(format!(
                    "frame {index}: cannot read bitstream dimensions"
                ))
            })?;
            return Ok((&data[pos..end], w, h));
        }
        pos = end + (size & 1);
    }
    Err(StitchError::FrameExtraction(format!(
        "frame {index} has no VP8 or VP8L chunk"
    )))
}

/// Lossy VP8 keyframe header: 3-byte frame tag, start code 9D 01 2A, then
/// 14-bit width and height.
fn parse_vp8_dims(payload: &[u8]) -> Option<(u32, u32)> {
    if payload.len() < 10 || payload[3..6] != [0x9D, 0x01, 0x2A] {
        return None;
    }
    let w = u32::from(u16::from_le_bytes([payload[6], payload[7]]) & 0x3FFF);
    let h = u32::from(u16::from_le_bytes([payload[8], payload[9]]) & 0x3FFF);
    Some((w, h))
}

/// Lossless VP8L header: signature byte 0x2F, then 14-bit width-minus-one
/// and height-minus-one packed little-endian.
fn parse_vp8l_dims(payload: &[u8]) -> Option<(u32, u32)> {
    if payload.len() < 5 || payload[0] != 0x2F {
        return None;
    }
    let bits = u32::from_le_bytes([payload[1], payload[2], payload[3], payload[4]]);
    let w = (bits & 0x3FFF) + 1;
    let h = ((bits >> 14) & 0x3FFF) + 1;
    Some((w, h))
}

fn push_u24_le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes()[0..3]);
}
