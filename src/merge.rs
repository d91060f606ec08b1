use crate::error::{StitchError, StitchResult};
use crate::format::RasterFormat;
use crate::limits::Limits;
use crate::webp::{LosslessWebpEncoder, WebpStillEncoder};
use crate::{jpeg, png, webp};

/// One merged still image: the encoded bytes plus the format they ended up
/// in. The output format can differ from the requested target when the
/// WebP route falls back to PNG.
#[derive(Clone, Debug)]
pub struct MergeOutput {
    pub bytes: Vec<u8>,
    pub format: RasterFormat,
}

impl MergeOutput {
    /// MIME type tag of the produced buffer.
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

/// Builder for one vertical merge of same-format, same-width stills.
///
/// Dispatches on the target format: PNG inputs are merged at the chunk
/// level without rasterizing, JPEG inputs are decoded, concatenated and
/// re-encoded, and a WebP target routes through the PNG merge before
/// recompression.
pub struct MergeRequest<'a> {
    buffers: &'a [&'a [u8]],
    target: Option<RasterFormat>,
    limits: Option<&'a Limits>,
    webp_encoder: Option<&'a dyn WebpStillEncoder>,
}

impl<'a> MergeRequest<'a> {
    pub fn new(buffers: &'a [&'a [u8]]) -> Self {
        Self {
            buffers,
            target: None,
            limits: None,
            webp_encoder: None,
        }
    }

    /// Merge toward a specific output format instead of the sniffed input
    /// format.
    pub fn target(mut self, format: RasterFormat) -> Self {
        self.target = Some(format);
        self
    }

    pub fn limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Inject a still encoder for the WebP recompression step.
    pub fn webp_encoder(mut self, encoder: &'a dyn WebpStillEncoder) -> Self {
        self.webp_encoder = Some(encoder);
        self
    }

    /// Run the merge.
    pub fn merge(self) -> StitchResult<MergeOutput> {
        let first = self.buffers.first().ok_or(StitchError::EmptyInput)?;
        let input = RasterFormat::sniff(first).ok_or(StitchError::UnrecognizedFormat)?;
        for (i, buf) in self.buffers.iter().enumerate().skip(1) {
            let format = RasterFormat::sniff(buf).ok_or(StitchError::UnrecognizedFormat)?;
            if format != input {
                return Err(StitchError::FormatMismatch(format!(
                    "buffer {i} is {format:?}, expected {input:?}"
                )));
            }
        }

        let target = self.target.unwrap_or(input);
        match target {
            RasterFormat::Png => {
                require_input(input, RasterFormat::Png)?;
                Ok(MergeOutput {
                    bytes: png::merge(self.buffers, self.limits)?,
                    format: RasterFormat::Png,
                })
            }
            RasterFormat::Jpeg => {
                require_input(input, RasterFormat::Jpeg)?;
                Ok(MergeOutput {
                    bytes: jpeg::merge(self.buffers, self.limits)?,
                    format: RasterFormat::Jpeg,
                })
            }
            RasterFormat::Webp => webp::merge(
                self.buffers,
                input,
                self.limits,
                self.webp_encoder.unwrap_or(&LosslessWebpEncoder),
            ),
        }
    }
}

fn require_input(input: RasterFormat, expected: RasterFormat) -> StitchResult<()> {
    if input != expected {
        return Err(StitchError::FormatMismatch(format!(
            "inputs are {input:?} but the merge target is {expected:?}"
        )));
    }
    Ok(())
}
