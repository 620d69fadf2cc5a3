//! Resynchronization of raw transport chunks onto frame boundaries.
//!
//! The transport hands over whatever it read up to the end marker, which may
//! begin mid-frame after an earlier truncated read. Anything before the first
//! start marker is discarded. A `0x53` byte in leading noise is indistinguishable
//! from a real start marker; such chunks fail validation rather than being
//! searched further.

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{Frame, FrameCodec, START_MARKER};

pub fn find_start_marker(raw: &[u8]) -> Option<usize> {
    raw.iter().position(|&b| b == START_MARKER)
}

/// Slice `raw` from its first start marker onwards.
pub fn resync(raw: &[u8]) -> ProtocolResult<&[u8]> {
    if raw.is_empty() {
        return Err(ProtocolError::NoData);
    }
    let start = find_start_marker(raw).ok_or(ProtocolError::NoStartMarker { len: raw.len() })?;
    Ok(&raw[start..])
}

impl FrameCodec {
    /// Resynchronize `raw` and decode the frame it contains.
    pub fn receive(&self, raw: &[u8]) -> ProtocolResult<Frame> {
        self.decode(resync(raw)?)
    }
}
