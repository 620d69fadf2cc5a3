//! Local environment: serial ports and the effective link config

use anyhow::Result;
use mpp_link::LinkConfig;

use crate::output;

pub fn list(json: bool) -> Result<()> {
    let ports = mpp_link::available_ports()?;
    output::print_ports(&ports, json);
    Ok(())
}

pub fn show_config(config: &LinkConfig, json: bool) {
    output::print_config(config, json);
}
