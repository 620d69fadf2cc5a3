//! Numeric interpretation of parameter value bytes.
//!
//! Values travel little-endian. A signed value's sign bit is the high bit of
//! the last (most significant) byte, and the width is exactly the number of
//! bytes the drive sent.

use crate::error::{ProtocolError, ProtocolResult};

/// Widest value that decodes; covers the 64-bit integer types in both
/// signed and unsigned form.
pub const MAX_VALUE_WIDTH: usize = 8;

pub fn decode_value(bytes: &[u8], signed: bool) -> ProtocolResult<i128> {
    let Some(&msb) = bytes.last() else {
        return Err(ProtocolError::EmptyValue);
    };
    if bytes.len() > MAX_VALUE_WIDTH {
        return Err(ProtocolError::ValueTooWide {
            len: bytes.len(),
            max: MAX_VALUE_WIDTH,
        });
    }

    // Sign-extend into the unused high bytes.
    let fill = if signed && msb & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 16];
    for (slot, &byte) in buf.iter_mut().zip(bytes) {
        *slot = byte;
    }
    Ok(i128::from_le_bytes(buf))
}

pub fn decode_unsigned(bytes: &[u8]) -> ProtocolResult<u32> {
    let value = decode_value(bytes, false)?;
    u32::try_from(value).map_err(|_| ProtocolError::ValueTooWide {
        len: bytes.len(),
        max: size_of::<u32>(),
    })
}

pub fn decode_signed(bytes: &[u8]) -> ProtocolResult<i32> {
    let value = decode_value(bytes, true)?;
    i32::try_from(value).map_err(|_| ProtocolError::ValueTooWide {
        len: bytes.len(),
        max: size_of::<i32>(),
    })
}
