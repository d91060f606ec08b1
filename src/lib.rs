//! # rasterstitch
//!
//! Byte-level vertical merge of still images and animated WebP assembly.
//!
//! Rendering surfaces cap out at a platform-dependent height (somewhere
//! between 16k and 65k pixels), but an exported page or log can be
//! arbitrarily tall. This crate treats images as structured byte streams
//! instead of pixels on a surface, so merged output height is bounded only
//! by memory.
//!
//! ## Operations
//!
//! - [`MergeRequest`]: vertically concatenate same-width PNG or JPEG stills
//!   into one taller still. PNG merges happen at the chunk level (inflate,
//!   unfilter, join rows, re-deflate); JPEG merges decode, concatenate and
//!   re-encode once at a fixed quality; a WebP target routes through the
//!   PNG merge and recompresses via a pluggable [`WebpStillEncoder`],
//!   falling back to the merged PNG when that fails.
//! - [`AnimationRequest`]: wrap independently encoded WebP stills into one
//!   animated container with per-frame durations.
//!
//! ## Non-Goals
//!
//! - General-purpose image editing or transcoding
//! - Adaptive scanline filter selection (re-encode always uses filter 0)
//! - Interlaced or progressive input
//! - Per-frame offsets, blending, or disposal in animations
//!
//! ## Usage
//!
//! ```no_run
//! use rasterstitch::{MergeRequest, RasterFormat};
//!
//! let sections: Vec<Vec<u8>> = vec![]; // PNG chunks from your renderer
//! let refs: Vec<&[u8]> = sections.iter().map(|s| s.as_slice()).collect();
//!
//! let merged = MergeRequest::new(&refs).merge()?;
//! assert_eq!(merged.format, RasterFormat::Png);
//! # Ok::<(), rasterstitch::StitchError>(())
//! ```

#![forbid(unsafe_code)]

mod crc;
mod error;
mod filter;
mod format;
mod jpeg;
mod limits;
mod merge;
mod png;
mod webp;

pub use crc::crc32;
pub use error::{StitchError, StitchResult};
pub use format::RasterFormat;
pub use limits::Limits;
pub use merge::{MergeOutput, MergeRequest};
pub use webp::anim::{AnimationFrame, AnimationRequest};
pub use webp::{LosslessWebpEncoder, WebpStillEncoder};
