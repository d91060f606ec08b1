//! Animated-container assembly: byte layout, length integrity, and
//! extraction failure atomicity.

use rasterstitch::{
    AnimationFrame, AnimationRequest, LosslessWebpEncoder, RasterFormat, StitchError,
    WebpStillEncoder,
};

/// Minimal single-still WebP wrapping a fake VP8 keyframe bitstream with
/// the given dimensions. `filler` controls the bitstream tail length, so
/// tests can force odd and even chunk sizes.
fn fake_vp8_still(width: u16, height: u16, filler: usize, leading_junk_chunk: bool) -> Vec<u8> {
    let mut vp8 = vec![0u8; 3]; // frame tag
    vp8.extend_from_slice(&[0x9D, 0x01, 0x2A]); // keyframe start code
    vp8.extend_from_slice(&width.to_le_bytes());
    vp8.extend_from_slice(&height.to_le_bytes());
    vp8.extend(std::iter::repeat(0xAB).take(filler));

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(b"WEBP");
    if leading_junk_chunk {
        out.extend_from_slice(b"EXIF");
        out.extend_from_slice(&3u32.to_le_bytes());
        out.extend_from_slice(&[1, 2, 3, 0]); // odd chunk + pad
    }
    out.extend_from_slice(b"VP8 ");
    out.extend_from_slice(&(vp8.len() as u32).to_le_bytes());
    out.extend_from_slice(&vp8);
    if vp8.len() % 2 == 1 {
        out.push(0);
    }
    let size = (out.len() - 8) as u32;
    out[4..8].copy_from_slice(&size.to_le_bytes());
    out
}

fn read_u32_le(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap())
}

fn read_u24_le(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], 0])
}

#[test]
fn assembled_container_layout_and_length_integrity() {
    let a = fake_vp8_still(64, 48, 21, false); // odd VP8 chunk size
    let b = fake_vp8_still(64, 48, 30, true);
    let frames = [AnimationFrame::new(&a, 125), AnimationFrame::new(&b, 250)];
    let out = AnimationRequest::new(&frames, 64, 48)
        .background(0x00FF_00FF)
        .loop_count(3)
        .assemble()
        .unwrap();

    assert_eq!(RasterFormat::sniff(&out), Some(RasterFormat::Webp));
    // Top-level length field equals total length minus the 8-byte prefix.
    assert_eq!(read_u32_le(&out, 4) as usize, out.len() - 8);

    // VP8X: type, size 10, animation flag, reserved, canvas minus one.
    assert_eq!(&out[12..16], b"VP8X");
    assert_eq!(read_u32_le(&out, 16), 10);
    assert_eq!(out[20], 0x02);
    assert_eq!(&out[21..24], &[0, 0, 0]);
    assert_eq!(read_u24_le(&out, 24), 63);
    assert_eq!(read_u24_le(&out, 27), 47);

    // ANIM: background color big-endian, loop count little-endian.
    assert_eq!(&out[30..34], b"ANIM");
    assert_eq!(read_u32_le(&out, 34), 6);
    assert_eq!(&out[38..42], &0x00FF_00FFu32.to_be_bytes());
    assert_eq!(&out[42..44], &3u16.to_le_bytes());

    // Declared chunk sizes (with padding) account for every byte after the
    // 12-byte header.
    let mut pos = 12;
    let mut anmf_count = 0;
    while pos < out.len() {
        let tag = &out[pos..pos + 4];
        let size = read_u32_le(&out, pos + 4) as usize;
        if tag == b"ANMF" {
            anmf_count += 1;
            // Offsets always zero, dims minus one, then the duration.
            assert_eq!(read_u24_le(&out, pos + 8), 0);
            assert_eq!(read_u24_le(&out, pos + 11), 0);
            assert_eq!(read_u24_le(&out, pos + 14), 63);
            assert_eq!(read_u24_le(&out, pos + 17), 47);
            assert_eq!(out[pos + 23], 0);
            assert_eq!(&out[pos + 24..pos + 28], b"VP8 ");
        }
        pos += 8 + size + (size & 1);
    }
    assert_eq!(pos, out.len());
    assert_eq!(anmf_count, 2);
}

#[test]
fn frame_payload_is_the_still_frames_data_chunk() {
    let a = fake_vp8_still(32, 16, 10, true);
    // The VP8 chunk of the input still, located independently.
    let vp8_at = a.windows(4).position(|w| w == b"VP8 ").unwrap();
    let vp8_len = read_u32_le(&a, vp8_at + 4) as usize;
    let expected = &a[vp8_at..vp8_at + 8 + vp8_len];

    let frames = [AnimationFrame::new(&a, 40)];
    let out = AnimationRequest::new(&frames, 32, 16).assemble().unwrap();

    let anmf_at = out.windows(4).position(|w| w == b"ANMF").unwrap();
    let anmf_len = read_u32_le(&out, anmf_at + 4) as usize;
    assert_eq!(anmf_len, 16 + expected.len());
    assert_eq!(&out[anmf_at + 24..anmf_at + 8 + anmf_len], expected);
}

#[test]
fn duration_saturates_at_24_bits() {
    let a = fake_vp8_still(8, 8, 4, false);
    let frames = [AnimationFrame::new(&a, 0x0ABC_DEF0)];
    let out = AnimationRequest::new(&frames, 8, 8).assemble().unwrap();
    let anmf_at = out.windows(4).position(|w| w == b"ANMF").unwrap();
    assert_eq!(read_u24_le(&out, anmf_at + 20), 0xFF_FFFF);
}

#[test]
fn missing_data_chunk_aborts_assembly() {
    let mut bad = b"RIFF".to_vec();
    bad.extend_from_slice(&12u32.to_le_bytes());
    bad.extend_from_slice(b"WEBP");
    bad.extend_from_slice(b"EXIF");
    bad.extend_from_slice(&4u32.to_le_bytes());
    bad.extend_from_slice(&[0; 4]);

    let good = fake_vp8_still(8, 8, 4, false);
    let frames = [AnimationFrame::new(&good, 50), AnimationFrame::new(&bad, 50)];
    let err = AnimationRequest::new(&frames, 8, 8).assemble().unwrap_err();
    assert!(matches!(err, StitchError::FrameExtraction(_)), "{err}");
}

#[test]
fn frame_canvas_mismatch_is_rejected() {
    let a = fake_vp8_still(16, 16, 4, false);
    let frames = [AnimationFrame::new(&a, 50)];
    let err = AnimationRequest::new(&frames, 16, 20).assemble().unwrap_err();
    assert!(matches!(err, StitchError::FormatMismatch(_)), "{err}");
}

#[test]
fn empty_frame_list_is_rejected() {
    let err = AnimationRequest::new(&[], 8, 8).assemble().unwrap_err();
    assert!(matches!(err, StitchError::EmptyInput));
}

#[test]
fn assembles_real_lossless_frames() {
    let mut frames_data = Vec::new();
    for seed in 0..3u8 {
        let rgba: Vec<u8> = (0..10 * 6 * 4).map(|i| (i as u8).wrapping_mul(seed + 1)).collect();
        frames_data.push(LosslessWebpEncoder.encode_rgba(&rgba, 10, 6).unwrap());
    }
    let frames: Vec<AnimationFrame> = frames_data
        .iter()
        .map(|d| AnimationFrame::new(d, 100))
        .collect();
    let out = AnimationRequest::new(&frames, 10, 6).assemble().unwrap();

    assert_eq!(RasterFormat::sniff(&out), Some(RasterFormat::Webp));
    assert_eq!(read_u32_le(&out, 4) as usize, out.len() - 8);
    assert_eq!(out.windows(4).filter(|&w| w == b"ANMF").count(), 3);
    assert_eq!(out.windows(4).filter(|&w| w == b"VP8L").count(), 3);
}
