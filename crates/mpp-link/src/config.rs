//! Serial link configuration, loadable from JSON or YAML.

use std::path::Path;
use std::time::Duration;

use mpp_protocol::{
    CRC8_INIT, CRC8_POLYNOMIAL, Crc8, DEFAULT_NODE_ID, FrameConfig, MAX_FRAME_LEN, MIN_FRAME_LEN,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LinkError, LinkResult};

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Everything needed to open a port and talk to one drive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout; a read returns whatever arrived once it expires.
    pub timeout_ms: u64,
    pub node_id: u8,
    /// Upper bound on bytes accepted per read.
    pub max_frame_len: usize,
    pub crc_polynomial: u8,
    pub crc_init: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            node_id: DEFAULT_NODE_ID,
            max_frame_len: MAX_FRAME_LEN,
            crc_polynomial: CRC8_POLYNOMIAL,
            crc_init: CRC8_INIT,
        }
    }
}

impl LinkConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file. Missing keys take their
    /// defaults. The result is validated before it is returned.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> LinkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(LinkError::InvalidConfig(format!(
                    "unsupported config format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )));
            }
        };

        config.validate()?;
        debug!("Loaded link config from {:?}", path);
        Ok(config)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> LinkResult<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;
        debug!("Saved link config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> LinkResult<()> {
        if self.port.trim().is_empty() {
            return Err(LinkError::InvalidConfig("port name is empty".into()));
        }

        if self.baud_rate == 0 {
            return Err(LinkError::InvalidConfig("baud rate must be non-zero".into()));
        }

        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(LinkError::InvalidConfig(format!(
                "invalid timeout: {} ms",
                self.timeout_ms
            )));
        }

        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&self.max_frame_len) {
            return Err(LinkError::InvalidConfig(format!(
                "max frame length {} outside {}..={}",
                self.max_frame_len, MIN_FRAME_LEN, MAX_FRAME_LEN
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig::new(self.node_id)
            .with_crc(Crc8::new(self.crc_polynomial, self.crc_init))
            .with_max_frame_len(self.max_frame_len)
    }
}
