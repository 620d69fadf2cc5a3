//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use mpp_link::LinkConfig;
use mpp_protocol::{BootMessage, DriveState, HexBytes, ObjectAddress, Statusword};
use serde::Serialize;
use serde_json::json;

use crate::error::exit_code;

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    print_json(&json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "exit_code": exit_code(error),
            "causes": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    }));
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

pub fn print_ports(ports: &[String], json: bool) {
    if json {
        print_json(&json!({ "success": true, "ports": ports }));
    } else if ports.is_empty() {
        println!("{}", "No serial ports found".yellow());
    } else {
        println!("{}", "Serial ports:".bold());
        for port in ports {
            println!("  {port}");
        }
    }
}

pub fn print_config(config: &LinkConfig, json: bool) {
    if json {
        print_json(&json!({ "success": true, "config": config }));
    } else {
        println!("{}", "Link configuration:".bold());
        println!("  Port:        {}", config.port);
        println!("  Baud rate:   {}", config.baud_rate);
        println!("  Timeout:     {} ms", config.timeout_ms);
        println!("  Node:        {}", config.node_id);
        println!("  Max frame:   {} bytes", config.max_frame_len);
        println!(
            "  CRC-8:       poly {:#04x}, init {:#04x}",
            config.crc_polynomial, config.crc_init
        );
    }
}

pub fn print_boot(boot: &BootMessage, json: bool) {
    let name = boot.name();
    if json {
        print_json(&json!({
            "success": true,
            "name": name,
            "payload": HexBytes(&boot.payload).to_string(),
        }));
    } else {
        match name {
            Some(name) => println!("{} {}", "Drive reset:".green().bold(), name),
            None => println!(
                "{} {}",
                "Drive reset, boot payload:".green().bold(),
                HexBytes(&boot.payload)
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValueReport {
    pub object: String,
    pub data: String,
    pub value: i128,
}

impl ValueReport {
    pub fn new(object: ObjectAddress, data: &[u8], value: i128) -> Self {
        Self {
            object: object.to_string(),
            data: HexBytes(data).to_string(),
            value,
        }
    }
}

pub fn print_value(report: &ValueReport, json: bool) {
    if json {
        print_json(&json!({ "success": true, "read": report }));
    } else {
        println!(
            "{} = {} {}",
            report.object.bold(),
            report.value,
            format!("[{}]", report.data).dimmed()
        );
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub raw: u16,
    pub state: String,
    pub fault: bool,
    pub flags: Vec<String>,
}

impl From<Statusword> for StatusReport {
    fn from(sw: Statusword) -> Self {
        let state = sw.state();
        Self {
            raw: sw.bits(),
            state: format!("{state:?}"),
            fault: state.is_fault(),
            flags: sw.iter_names().map(|(name, _)| name.to_string()).collect(),
        }
    }
}

pub fn print_status(report: &StatusReport, json: bool) {
    if json {
        print_json(&json!({ "success": true, "status": report }));
        return;
    }

    let state = if report.fault {
        report.state.red().bold()
    } else if report.state == format!("{:?}", DriveState::OperationEnabled) {
        report.state.green().bold()
    } else {
        report.state.yellow()
    };
    println!("{} {} ({:#06x})", "State:".bold(), state, report.raw);
    if !report.flags.is_empty() {
        println!("  Flags: {}", report.flags.join(", "));
    }
}

pub fn print_position(position: i32, json: bool) {
    if json {
        // One object per line so watch output can be streamed.
        println!("{}", json!({ "success": true, "position": position }));
    } else {
        println!("{} {}", "Position:".bold(), position);
    }
}

pub fn print_encoded(frame: &[u8], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "frame": HexBytes(frame).to_string(),
            "length": frame.len(),
        }));
    } else {
        println!("{}", HexBytes(frame));
    }
}

/// A frame taken apart for display.
#[derive(Debug, Serialize)]
pub struct FrameReport {
    pub node_id: u8,
    pub command: u8,
    pub command_name: Option<String>,
    pub payload: String,
    pub checksum: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub fn print_frame(report: &FrameReport, json: bool) {
    if json {
        print_json(&json!({ "success": true, "frame": report }));
        return;
    }

    println!("{}", "Valid frame".green().bold());
    println!("  Node:     {}", report.node_id);
    match &report.command_name {
        Some(name) => println!("  Command:  {:#04x} ({name})", report.command),
        None => println!("  Command:  {:#04x}", report.command),
    }
    println!("  Payload:  {}", report.payload);
    println!("  CRC:      {:#04x}", report.checksum);
    if let Some(object) = &report.object {
        println!("  Object:   {object}");
    }
    if let Some(value) = report.value {
        println!("  Value:    {value}");
    }
    if let Some(name) = &report.name {
        println!("  Name:     {name}");
    }
}
