//! MPP serial protocol for single-node motor drives.
//!
//! This crate is intentionally I/O-free. It provides pure functions and types
//! that can be tested and fuzzed without a serial port attached.
//!
//! # Key Features
//! - `S`/`E` delimited, length-prefixed frames protected by CRC-8 (poly `0xD5`)
//! - Resynchronization of dirty transport buffers onto the next start marker
//! - Parameter read requests addressed by object index/subindex
//! - Little-endian value decoding with sign-of-last-byte semantics
//! - CiA 402 statusword interpretation
//!
//! # Example
//!
//! ```
//! use mpp_protocol::{FrameCodec, ReadResponse, objects};
//!
//! let codec = FrameCodec::default();
//! let request = objects::POSITION_ACTUAL_VALUE.read_request().encode(&codec)?;
//! assert_eq!(request, [0x53, 0x07, 0x01, 0x01, 0x64, 0x60, 0x00, 0x56, 0x45]);
//!
//! let reply = [0x53, 0x0B, 0x01, 0x01, 0x64, 0x60, 0x00, 0x09, 0x00, 0x00, 0x00, 0x53, 0x45];
//! let frame = codec.receive(&reply)?;
//! let response = ReadResponse::parse_for(&frame, objects::POSITION_ACTUAL_VALUE)?;
//! assert_eq!(response.value(true)?, 9);
//! # Ok::<(), mpp_protocol::ProtocolError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

pub mod commands;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hex;
pub mod objects;
pub mod receiver;
pub mod statusword;
pub mod value;

pub use commands::{
    ADDRESS_LEN, BootMessage, CommandCode, ObjectAddress, ReadResponse, Request,
    build_read_request, build_reset,
};
pub use crc::{CRC8_INIT, CRC8_POLYNOMIAL, Crc8, crc8};
pub use error::{ProtocolError, ProtocolResult};
pub use frame::{
    DEFAULT_NODE_ID, END_MARKER, Frame, FrameCodec, FrameConfig, MAX_FRAME_LEN, MAX_PAYLOAD_LEN,
    MIN_FRAME_LEN, START_MARKER, USER_DATA_OVERHEAD,
};
pub use hex::{HexBytes, format_frame};
pub use receiver::{find_start_marker, resync};
pub use statusword::{DriveState, Statusword};
pub use value::{MAX_VALUE_WIDTH, decode_signed, decode_unsigned, decode_value};
