//! MPP protocol error types.

use thiserror::Error;

use crate::commands::ObjectAddress;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Payload too large: {len} bytes, at most {max} fit in a frame")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Output buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("No data received")]
    NoData,

    #[error("No start marker in {len} received bytes")]
    NoStartMarker { len: usize },

    #[error("Frame truncated: {len} bytes, minimum is {min}")]
    Truncated { len: usize, min: usize },

    #[error("Bad delimiter: start={start:#04x}, end={end:#04x}")]
    BadDelimiter { start: u8, end: u8 },

    #[error("Length mismatch: header declares {declared} bytes, frame has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Wrong node: expected {expected}, got {actual}")]
    WrongNode { expected: u8, actual: u8 },

    #[error("CRC mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Cannot decode a value from zero bytes")]
    EmptyValue,

    #[error("Value too wide: {len} bytes, at most {max} supported")]
    ValueTooWide { len: usize, max: usize },

    #[error("Unexpected command: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedCommand { expected: u8, actual: u8 },

    #[error("Payload too short: expected at least {expected} bytes, got {actual}")]
    ShortPayload { expected: usize, actual: usize },

    #[error("Response for object {actual}, requested {expected}")]
    AddressMismatch {
        expected: ObjectAddress,
        actual: ObjectAddress,
    },

    #[error("Invalid object address: {input:?}")]
    InvalidObjectAddress { input: String },
}

impl ProtocolError {
    /// True for failures that indicate bytes were damaged or lost on the wire,
    /// as opposed to a well-formed frame with unexpected content.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::NoStartMarker { .. }
                | Self::Truncated { .. }
                | Self::BadDelimiter { .. }
                | Self::LengthMismatch { .. }
                | Self::ChecksumMismatch { .. }
        )
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
