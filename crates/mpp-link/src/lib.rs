//! Serial link to an MPP motor drive.
//!
//! Wraps the pure codec in `mpp-protocol` with a [`Transport`] (a real serial
//! port or a scripted mock) and a [`Drive`] session that performs one
//! request/response cycle per call.

pub mod config;
pub mod drive;
pub mod error;
pub mod transport;

pub use config::{DEFAULT_BAUD_RATE, DEFAULT_PORT, DEFAULT_TIMEOUT_MS, LinkConfig};
pub use drive::Drive;
pub use error::{LinkError, LinkResult};
pub use transport::{MockTransport, SerialTransport, Transport, available_ports, chunk_complete};

/// Open the configured serial port and start a session on it.
pub fn connect(config: &LinkConfig) -> LinkResult<Drive<SerialTransport>> {
    config.validate()?;
    let transport = SerialTransport::open(config)?;
    Ok(Drive::new(transport, config.frame_config()))
}
