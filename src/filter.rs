//! Scanline filter codec: reconstructs raw samples from the five per-row
//! prediction filters (None, Sub, Up, Average, Paeth) and re-encodes with
//! filter type 0 only. Re-filtering with adaptive selection is a possible
//! future optimization, not part of the contract.

use crate::error::StitchError;

/// Reconstruct raw samples from filtered rows.
///
/// `raw` is `height` rows of `1 + row_bytes` bytes, the leading byte per row
/// being the filter-type tag. `bpp` is the byte distance to the sample one
/// pixel to the left. All arithmetic wraps modulo 256.
pub(crate) fn unfilter(
    raw: &[u8],
    row_bytes: usize,
    height: usize,
    bpp: usize,
) -> Result<Vec<u8>, StitchError> {
    let stride = row_bytes + 1;
    let expected = stride
        .checked_mul(height)
        .ok_or(StitchError::UnexpectedEof)?;
    if raw.len() != expected {
        return Err(StitchError::Decode(format!(
            "filtered data is {} bytes, expected {expected}",
            raw.len()
        )));
    }

    let mut out = vec![0u8; row_bytes * height];
    for y in 0..height {
        let src = &raw[y * stride..(y + 1) * stride];
        let tag = src[0];
        let residuals = &src[1..];
        let (done, rest) = out.split_at_mut(y * row_bytes);
        let cur = &mut rest[..row_bytes];
        let prev: &[u8] = if y == 0 {
            &[]
        } else {
            &done[(y - 1) * row_bytes..]
        };

        match tag {
            0 => cur.copy_from_slice(residuals),
            1 => {
                for x in 0..row_bytes {
                    let left = if x >= bpp { cur[x - bpp] } else { 0 };
                    cur[x] = residuals[x].wrapping_add(left);
                }
            }
            2 => {
                for x in 0..row_bytes {
                    let up = if prev.is_empty() { 0 } else { prev[x] };
                    cur[x] = residuals[x].wrapping_add(up);
                }
            }
            3 => {
                for x in 0..row_bytes {
                    let left = if x >= bpp { cur[x - bpp] } else { 0 };
                    let up = if prev.is_empty() { 0 } else { prev[x] };
                    let avg = ((u16::from(left) + u16::from(up)) / 2) as u8;
                    cur[x] = residuals[x].wrapping_add(avg);
                }
            }
            4 => {
                for x in 0..row_bytes {
                    let left = if x >= bpp { cur[x - bpp] } else { 0 };
                    let up = if prev.is_empty() { 0 } else { prev[x] };
                    let up_left = if x >= bpp && !prev.is_empty() {
                        prev[x - bpp]
                    } else {
                        0
                    };
                    cur[x] = residuals[x].wrapping_add(paeth(left, up, up_left));
                }
            }
            other => {
                return Err(StitchError::Decode(format!(
                    "unknown filter type {other} on row {y}"
                )));
            }
        }
    }
    Ok(out)
}

/// Encode a raw plane with filter type 0 on every row.
///
/// Correctness over compression ratio: the output always inflates back to
/// `plane` regardless of content.
pub(crate) fn filter_none(plane: &[u8], row_bytes: usize) -> Vec<u8> {
    let height = plane.len() / row_bytes;
    let mut out = Vec::with_capacity(plane.len() + height);
    for row in plane.chunks_exact(row_bytes) {
        out.push(0);
        out.extend_from_slice(row);
    }
    out
}

/// Paeth predictor: whichever of left/up/up-left is closest to
/// `left + up - up_left`, ties broken left, then up, then up-left.
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Forward-filter one plane, one filter type per row, for test input.
    fn filter_forward(plane: &[u8], row_bytes: usize, bpp: usize, tags: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut prev: Vec<u8> = vec![];
        for (y, row) in plane.chunks_exact(row_bytes).enumerate() {
            let tag = tags[y % tags.len()];
            out.push(tag);
            for x in 0..row_bytes {
                let left = if x >= bpp { row[x - bpp] } else { 0 };
                let up = if prev.is_empty() { 0 } else { prev[x] };
                let up_left = if x >= bpp && !prev.is_empty() {
                    prev[x - bpp]
                } else {
                    0
                };
                let predicted = match tag {
                    0 => 0,
                    1 => left,
                    2 => up,
                    3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                    4 => paeth(left, up, up_left),
                    _ => unreachable!(),
                };
                out.push(row[x].wrapping_sub(predicted));
            }
            prev = row.to_vec();
        }
        out
    }

    fn noise(len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        let mut state: u32 = 0xDEAD_BEEF;
        for b in out.iter_mut() {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            *b = state as u8;
        }
        out
    }

    #[test]
    fn unfilter_inverts_all_five_filters() {
        let row_bytes = 7 * 3;
        let height = 10;
        let bpp = 3;
        let plane = noise(row_bytes * height);
        let filtered = filter_forward(&plane, row_bytes, bpp, &[0, 1, 2, 3, 4]);
        let got = unfilter(&filtered, row_bytes, height, bpp).unwrap();
        assert_eq!(got, plane);
    }

    #[test]
    fn filter_none_roundtrip_is_idempotent() {
        let row_bytes = 5 * 4;
        let height = 6;
        let plane = noise(row_bytes * height);
        let filtered = filter_forward(&plane, row_bytes, 4, &[4, 3, 2, 1, 0]);
        let decoded = unfilter(&filtered, row_bytes, height, 4).unwrap();
        let reencoded = filter_none(&decoded, row_bytes);
        let decoded_again = unfilter(&reencoded, row_bytes, height, 4).unwrap();
        assert_eq!(decoded_again, decoded);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = unfilter(&[0u8; 10], 4, 3, 1).unwrap_err();
        assert!(matches!(err, StitchError::Decode(_)));
    }

    #[test]
    fn unknown_filter_tag_is_rejected() {
        let mut raw = vec![0u8; 5];
        raw[0] = 9;
        let err = unfilter(&raw, 4, 1, 1).unwrap_err();
        assert!(matches!(err, StitchError::Decode(_)));
    }

    #[test]
    fn paeth_tie_break_prefers_left_then_up() {
        // All equidistant: left wins.
        assert_eq!(paeth(1, 1, 1), 1);
        // p = 3: pa = 2, pb = pc = 1, so up beats up-left.
        assert_eq!(paeth(1, 4, 2), 4);
        // Clear minimum cases.
        assert_eq!(paeth(2, 4, 8), 2);
        assert_eq!(paeth(4, 8, 2), 8);
    }
}
