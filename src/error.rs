use std::io;

pub type StitchResult<T> = Result<T, StitchError>;

/// Errors from merging stills and assembling animations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StitchError {
    #[error("no input buffers")]
    EmptyInput,

    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("format mismatch: {0}")]
    FormatMismatch(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
