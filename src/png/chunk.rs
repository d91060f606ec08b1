//! PNG chunk framing: `length(u32 BE) | type(4 bytes) | data | crc32(type+data)`.

use crate::crc::crc32;
use crate::error::StitchError;

pub(crate) struct Chunk<'a> {
    pub tag: [u8; 4],
    pub data: &'a [u8],
}

/// Walks the chunk sequence following the 8-byte signature.
pub(crate) struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ChunkReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 8 }
    }

    /// Next chunk, or `None` once past the end of the buffer.
    pub(crate) fn next_chunk(&mut self) -> Result<Option<Chunk<'a>>, StitchError> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let header = self
            .data
            .get(self.pos..self.pos + 8)
            .ok_or(StitchError::UnexpectedEof)?;
        let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let tag = [header[4], header[5], header[6], header[7]];
        let data_start = self.pos + 8;
        let data = self
            .data
            .get(data_start..data_start + len)
            .ok_or(StitchError::UnexpectedEof)?;
        // Trailing CRC is carried but not re-validated; this engine only
        // re-encodes, it never trusts input checksums for anything.
        if data_start + len + 4 > self.data.len() {
            return Err(StitchError::UnexpectedEof);
        }
        self.pos = data_start + len + 4;
        Ok(Some(Chunk { tag, data }))
    }
}

/// Append one framed chunk, checksumming type tag plus payload.
pub(crate) fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    let mut checksummed = Vec::with_capacity(4 + data.len());
    checksummed.extend_from_slice(tag);
    checksummed.extend_from_slice(data);
    out.extend_from_slice(&crc32(&checksummed).to_be_bytes());
}
