/// Still-image format detected from magic bytes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    /// PNG (structured-chunk format, merged at the chunk level).
    Png,
    /// Baseline JPEG (merged by decode-concatenate-reencode).
    Jpeg,
    /// WebP (still or animated, RIFF container).
    Webp,
}

impl RasterFormat {
    /// Detect the format from the leading magic bytes, if recognized.
    pub fn sniff(data: &[u8]) -> Option<RasterFormat> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(RasterFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(RasterFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(RasterFormat::Webp);
        }
        None
    }

    /// MIME type tag for this format.
    pub fn mime(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Jpeg => "image/jpeg",
            RasterFormat::Webp => "image/webp",
        }
    }
}
