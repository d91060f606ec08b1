//! Caps on merged geometry and decoded-plane allocations.

use crate::StitchError;

/// Caps applied before a merge commits to large allocations.
///
/// Unset fields go unchecked. A merged output grows with the number of
/// inputs, so the caps are enforced against the summed output geometry,
/// not against any single input.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Cap on output pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Cap on bytes allocated for decoded planes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), StitchError> {
        let w = u64::from(width);
        let h = u64::from(height);
        let against = [
            ("width", w, self.max_width),
            ("height", h, self.max_height),
            ("pixel count", w * h, self.max_pixels),
        ];
        for (what, actual, cap) in against {
            match cap {
                Some(cap) if actual > cap => {
                    return Err(StitchError::LimitExceeded(format!(
                        "{what} {actual} exceeds limit {cap}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), StitchError> {
        match self.max_memory_bytes {
            Some(cap) if bytes as u64 > cap => Err(StitchError::LimitExceeded(format!(
                "allocation of {bytes} bytes exceeds memory limit {cap}"
            ))),
            _ => Ok(()),
        }
    }
}
