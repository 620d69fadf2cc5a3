//! Link-layer error types.

use mpp_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LinkError {
    /// The drive did not answer within the transport timeout.
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::NoData))
    }

    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

pub type LinkResult<T> = Result<T, LinkError>;
