//! MPP command payloads: parameter read and soft reset.
//!
//! A parameter read request carries the object address as
//! `[index_low, index_high, subindex]`, low byte first, the reverse of the
//! usual `6064.0` notation. The response echoes the address and appends
//! 1–4 little-endian value bytes.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

use std::fmt;
use std::str::FromStr;

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::{Frame, FrameCodec};
use crate::value::decode_value;

/// Length of the address triple at the start of read payloads.
pub const ADDRESS_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    /// Soft reset. The drive answers with its name as ASCII.
    Reset,
    /// Parameter (SDO) read request and response.
    ReadParameter,
}

impl CommandCode {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0x00 => Some(Self::Reset),
            0x01 => Some(Self::ReadParameter),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Reset => 0x00,
            Self::ReadParameter => 0x01,
        }
    }
}

/// Object dictionary address: 16-bit index plus 8-bit subindex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectAddress {
    pub index: u16,
    pub subindex: u8,
}

impl ObjectAddress {
    pub const fn new(index: u16, subindex: u8) -> Self {
        Self { index, subindex }
    }

    pub fn from_parts(index_high: u8, index_low: u8, subindex: u8) -> Self {
        Self::new(u16::from_be_bytes([index_high, index_low]), subindex)
    }

    /// Parse the wire triple `[index_low, index_high, subindex]`.
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        let [low, high, subindex] = bytes;
        Self::from_parts(high, low, subindex)
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_LEN] {
        [self.index_low(), self.index_high(), self.subindex]
    }

    pub fn index_high(self) -> u8 {
        self.index.to_be_bytes()[0]
    }

    pub fn index_low(self) -> u8 {
        self.index.to_be_bytes()[1]
    }

    pub fn read_request(self) -> Request {
        Request {
            command: CommandCode::ReadParameter,
            payload: self.to_bytes().to_vec(),
        }
    }
}

impl fmt::Display for ObjectAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}.{:x}", self.index, self.subindex)
    }
}

impl FromStr for ObjectAddress {
    type Err = ProtocolError;

    /// Accepts `6064`, `6064.0`, `0x6064.0` and `6064:1`; all digits are hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidObjectAddress {
            input: s.to_string(),
        };
        // `from_str_radix` would also take a leading sign.
        let hex_digits =
            |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_hexdigit());

        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let (index, subindex) = match trimmed.split_once(['.', ':']) {
            Some((index, subindex)) => (index, Some(subindex)),
            None => (trimmed, None),
        };

        if !hex_digits(index) || index.len() > 4 {
            return Err(invalid());
        }
        let index = u16::from_str_radix(index, 16).map_err(|_| invalid())?;
        let subindex = match subindex {
            Some(sub) => {
                let sub = sub.strip_prefix("0x").unwrap_or(sub);
                if !hex_digits(sub) {
                    return Err(invalid());
                }
                u8::from_str_radix(sub, 16).map_err(|_| invalid())?
            }
            None => 0,
        };

        Ok(Self::new(index, subindex))
    }
}

/// A command ready to be framed for the configured node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: CommandCode,
    payload: Vec<u8>,
}

impl Request {
    pub fn command(&self) -> CommandCode {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn encode(&self, codec: &FrameCodec) -> ProtocolResult<Vec<u8>> {
        codec.encode(codec.node_id(), self.command.to_u8(), &self.payload)
    }
}

pub fn build_read_request(index_high: u8, index_low: u8, subindex: u8) -> Request {
    ObjectAddress::from_parts(index_high, index_low, subindex).read_request()
}

pub fn build_reset() -> Request {
    Request {
        command: CommandCode::Reset,
        payload: Vec::new(),
    }
}

fn expect_command(frame: &Frame, expected: CommandCode) -> ProtocolResult<()> {
    if frame.command() != expected.to_u8() {
        return Err(ProtocolError::UnexpectedCommand {
            expected: expected.to_u8(),
            actual: frame.command(),
        });
    }
    Ok(())
}

/// Parameter read response: the echoed address and the raw value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    pub address: ObjectAddress,
    pub data: Vec<u8>,
}

impl ReadResponse {
    pub fn parse(frame: &Frame) -> ProtocolResult<Self> {
        expect_command(frame, CommandCode::ReadParameter)?;

        let payload = frame.payload();
        let Some((address, data)) = payload.split_first_chunk::<ADDRESS_LEN>() else {
            return Err(ProtocolError::ShortPayload {
                expected: ADDRESS_LEN,
                actual: payload.len(),
            });
        };

        Ok(Self {
            address: ObjectAddress::from_bytes(*address),
            data: data.to_vec(),
        })
    }

    /// Parse and check the response answers the object that was asked for.
    pub fn parse_for(frame: &Frame, expected: ObjectAddress) -> ProtocolResult<Self> {
        let response = Self::parse(frame)?;
        if response.address != expected {
            return Err(ProtocolError::AddressMismatch {
                expected,
                actual: response.address,
            });
        }
        Ok(response)
    }

    pub fn value(&self, signed: bool) -> ProtocolResult<i128> {
        decode_value(&self.data, signed)
    }
}

/// Boot-up message sent by the drive after a soft reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootMessage {
    pub payload: Vec<u8>,
}

impl BootMessage {
    pub fn parse(frame: &Frame) -> ProtocolResult<Self> {
        expect_command(frame, CommandCode::Reset)?;
        Ok(Self {
            payload: frame.payload().to_vec(),
        })
    }

    /// Drive name, if the payload is text.
    pub fn name(&self) -> Option<&str> {
        let name = std::str::from_utf8(&self.payload).ok()?;
        Some(name.trim_end_matches('\0').trim())
    }
}
