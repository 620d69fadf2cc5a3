//! Error types for mppctl

use mpp_link::LinkError;
use mpp_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Port unavailable: {0}")]
    PortUnavailable(String),

    #[error("Aborted by user")]
    Aborted,
}

/// Process exit status for each failure class. Code 2 is left to clap for
/// usage errors.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<CliError>() {
        return match e {
            CliError::InvalidInput(_) | CliError::InvalidConfiguration(_) => 4,
            CliError::PortUnavailable(_) => 5,
            CliError::Aborted => 1,
        };
    }

    let protocol = error.downcast_ref::<ProtocolError>().or_else(|| {
        error
            .downcast_ref::<LinkError>()
            .and_then(LinkError::protocol)
    });
    if let Some(e) = protocol {
        return match e {
            ProtocolError::NoData => 6,
            ProtocolError::InvalidObjectAddress { .. } => 4,
            _ => 3,
        };
    }

    match error.downcast_ref::<LinkError>() {
        Some(LinkError::Serial(_)) => 5,
        Some(LinkError::InvalidConfig(_) | LinkError::Json(_) | LinkError::Yaml(_)) => 4,
        _ => 1,
    }
}
