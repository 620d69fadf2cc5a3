//! Command implementations for mppctl

pub mod drive;
pub mod frame;
pub mod ports;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mpp_link::LinkConfig;
use tracing::debug;

use crate::error::CliError;

/// Serial link options shared by every command that talks to a drive.
#[derive(Args, Debug, Default, Clone)]
pub struct LinkArgs {
    /// Serial port name (e.g. /dev/ttyUSB0, COM3)
    #[arg(short, long, global = true, env = "MPP_PORT")]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long, global = true, env = "MPP_BAUD")]
    pub baud: Option<u32>,

    /// Drive node id
    #[arg(long, global = true, env = "MPP_NODE")]
    pub node: Option<u8>,

    /// Read timeout in milliseconds
    #[arg(long, global = true, env = "MPP_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Link config file (.json, .yaml or .yml)
    #[arg(long, global = true, env = "MPP_CONFIG")]
    pub config: Option<PathBuf>,
}

impl LinkArgs {
    /// Config file (or defaults) with command-line overrides applied on top.
    pub fn resolve(&self) -> Result<LinkConfig> {
        let mut config = match &self.config {
            Some(path) => LinkConfig::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => LinkConfig::default(),
        };

        if let Some(port) = &self.port {
            config.port.clone_from(port);
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(node) = self.node {
            config.node_id = node;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        config
            .validate()
            .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
        debug!(?config, "Resolved link config");
        Ok(config)
    }
}

/// Parse hex bytes given as separate tokens (`53 07 01`), one run
/// (`530701`), or a mix. `0x` prefixes and `,`/`:` separators are accepted.
pub fn parse_hex(tokens: &[String]) -> Result<Vec<u8>, CliError> {
    let mut bytes = Vec::new();

    for token in tokens
        .iter()
        .flat_map(|t| t.split([' ', ',', ':']))
        .filter(|t| !t.is_empty())
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        if !digits.is_ascii() || digits.len() % 2 != 0 {
            return Err(CliError::InvalidInput(format!(
                "{token:?} is not a whole number of hex bytes"
            )));
        }

        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|e| CliError::InvalidInput(format!("{token:?}: {e}")))?;
            bytes.push(byte);
        }
    }

    if bytes.is_empty() {
        return Err(CliError::InvalidInput("no bytes given".into()));
    }
    Ok(bytes)
}
