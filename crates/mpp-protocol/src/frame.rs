//! MPP frame encoding and validation.
//!
//! Wire layout:
//! - Byte 0: start marker `0x53` (`'S'`)
//! - Byte 1: user data length (`4 + payload length`)
//! - Byte 2: node id
//! - Byte 3: command code
//! - Bytes 4..4+N: payload
//! - Byte 4+N: CRC-8 over bytes `1..4+N`
//! - Byte 5+N: end marker `0x45` (`'E'`)
//!
//! Total frame length is always `user_data_length + 2`.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

use crate::crc::Crc8;
use crate::error::{ProtocolError, ProtocolResult};

pub const START_MARKER: u8 = 0x53;
pub const END_MARKER: u8 = 0x45;

/// User data bytes besides the payload: length, node, command and CRC.
pub const USER_DATA_OVERHEAD: usize = 4;

/// Smallest valid frame (empty payload).
pub const MIN_FRAME_LEN: usize = USER_DATA_OVERHEAD + 2;

/// Largest frame the drive's serial reads accept.
pub const MAX_FRAME_LEN: usize = 64;

pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - MIN_FRAME_LEN;

/// Upper bound imposed by the one-byte length field.
const LENGTH_FIELD_PAYLOAD_LIMIT: usize = u8::MAX as usize - USER_DATA_OVERHEAD;

pub const DEFAULT_NODE_ID: u8 = 1;

/// Codec configuration: which node we talk to, which CRC parameters the
/// firmware uses and how large a frame the link can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    pub node_id: u8,
    pub crc: Crc8,
    pub max_frame_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID,
            crc: Crc8::MPP,
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

impl FrameConfig {
    pub fn new(node_id: u8) -> Self {
        Self {
            node_id,
            ..Self::default()
        }
    }

    pub fn with_crc(mut self, crc: Crc8) -> Self {
        self.crc = crc;
        self
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    /// Largest payload that fits in one frame under this configuration.
    pub fn max_payload_len(&self) -> usize {
        self.max_frame_len
            .saturating_sub(MIN_FRAME_LEN)
            .min(LENGTH_FIELD_PAYLOAD_LIMIT)
    }
}

/// A validated frame. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    node_id: u8,
    command: u8,
    payload: Vec<u8>,
    checksum: u8,
}

impl Frame {
    pub fn node_id(&self) -> u8 {
        self.node_id
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn user_data_length(&self) -> usize {
        self.payload.len() + USER_DATA_OVERHEAD
    }

    /// Length of this frame on the wire.
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + MIN_FRAME_LEN
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Borrowed view produced by validation; shared by the encode self-check and
/// the decode path.
struct FrameView<'a> {
    node_id: u8,
    command: u8,
    payload: &'a [u8],
    checksum: u8,
}

impl FrameView<'_> {
    fn to_frame(&self) -> Frame {
        Frame {
            node_id: self.node_id,
            command: self.command,
            payload: self.payload.to_vec(),
            checksum: self.checksum,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCodec {
    config: FrameConfig,
}

impl FrameCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn node_id(&self) -> u8 {
        self.config.node_id
    }

    /// Write a frame for `(node_id, command, payload)` into `out`.
    ///
    /// Returns the number of bytes written. Allocation-free.
    pub fn encode_into(
        &self,
        node_id: u8,
        command: u8,
        payload: &[u8],
        out: &mut [u8],
    ) -> ProtocolResult<usize> {
        let max = self.config.max_payload_len();
        if payload.len() > max {
            return Err(ProtocolError::PayloadTooLarge {
                len: payload.len(),
                max,
            });
        }

        let frame_len = payload.len() + MIN_FRAME_LEN;
        let actual = out.len();
        let Some(out) = out.get_mut(..frame_len) else {
            return Err(ProtocolError::BufferTooSmall {
                needed: frame_len,
                actual,
            });
        };

        let user_data_length = payload.len() + USER_DATA_OVERHEAD;
        let length_byte =
            u8::try_from(user_data_length).map_err(|_| ProtocolError::PayloadTooLarge {
                len: payload.len(),
                max,
            })?;

        out[0] = START_MARKER;
        out[1] = length_byte;
        out[2] = node_id;
        out[3] = command;
        out[USER_DATA_OVERHEAD..user_data_length].copy_from_slice(payload);
        out[user_data_length] = self.config.crc.checksum(&out[1..user_data_length]);
        out[user_data_length + 1] = END_MARKER;

        debug_assert!(
            self.validate(out, node_id).is_ok(),
            "encoder produced a frame its own validator rejects"
        );

        Ok(frame_len)
    }

    pub fn encode(&self, node_id: u8, command: u8, payload: &[u8]) -> ProtocolResult<Vec<u8>> {
        let mut out = vec![0u8; payload.len() + MIN_FRAME_LEN];
        let len = self.encode_into(node_id, command, payload, &mut out)?;
        out.truncate(len);
        Ok(out)
    }

    /// Validate `raw` as exactly one frame addressed to the configured node.
    pub fn decode(&self, raw: &[u8]) -> ProtocolResult<Frame> {
        self.validate(raw, self.config.node_id)
            .map(|view| view.to_frame())
    }

    pub fn is_valid_frame(&self, raw: &[u8]) -> bool {
        self.validate(raw, self.config.node_id).is_ok()
    }

    // Checks run in a fixed order and the first failure decides the error.
    // The declared length is compared before the end marker so that a frame
    // cut short by the transport reports a length problem, not a delimiter one.
    fn validate<'a>(&self, raw: &'a [u8], expected_node: u8) -> ProtocolResult<FrameView<'a>> {
        if raw.len() < MIN_FRAME_LEN {
            return Err(ProtocolError::Truncated {
                len: raw.len(),
                min: MIN_FRAME_LEN,
            });
        }

        let start = raw[0];
        let end = raw[raw.len() - 1];
        if start != START_MARKER {
            return Err(ProtocolError::BadDelimiter { start, end });
        }

        let user_data_length = usize::from(raw[1]);
        let declared = user_data_length + 2;
        if raw.len() != declared {
            return Err(ProtocolError::LengthMismatch {
                declared,
                actual: raw.len(),
            });
        }

        if end != END_MARKER {
            return Err(ProtocolError::BadDelimiter { start, end });
        }

        let node_id = raw[2];
        if node_id != expected_node {
            return Err(ProtocolError::WrongNode {
                expected: expected_node,
                actual: node_id,
            });
        }

        let expected = self.config.crc.checksum(&raw[1..user_data_length]);
        let checksum = raw[user_data_length];
        if checksum != expected {
            return Err(ProtocolError::ChecksumMismatch {
                expected,
                actual: checksum,
            });
        }

        Ok(FrameView {
            node_id,
            command: raw[3],
            payload: &raw[USER_DATA_OVERHEAD..user_data_length],
            checksum,
        })
    }
}
