//! Offline frame tools: build requests and take captured bytes apart

use anyhow::Result;
use mpp_link::LinkConfig;
use mpp_protocol::{
    BootMessage, CommandCode, FrameCodec, ObjectAddress, ProtocolError, ReadResponse, build_reset,
};
use tracing::debug;

use crate::commands::parse_hex;
use crate::output::{self, FrameReport};

/// Frame the request for `object`, or a soft reset when `object` is `None`.
pub fn encode(config: &LinkConfig, object: Option<ObjectAddress>, json: bool) -> Result<()> {
    let codec = FrameCodec::new(config.frame_config());
    let request = match object {
        Some(object) => object.read_request(),
        None => build_reset(),
    };
    let frame = request.encode(&codec)?;
    output::print_encoded(&frame, json);
    Ok(())
}

/// Validate captured bytes as a reply from the configured node.
pub fn decode(config: &LinkConfig, bytes: &[String], unsigned: bool, json: bool) -> Result<()> {
    let raw = parse_hex(bytes)?;
    let report = describe(&FrameCodec::new(config.frame_config()), &raw, unsigned)?;
    output::print_frame(&report, json);
    Ok(())
}

pub fn describe(codec: &FrameCodec, raw: &[u8], unsigned: bool) -> Result<FrameReport> {
    let frame = codec.receive(raw)?;
    let command = CommandCode::from_u8(frame.command());
    debug!(?command, len = frame.encoded_len(), "Decoded frame");

    let mut report = FrameReport {
        node_id: frame.node_id(),
        command: frame.command(),
        command_name: command.map(|c| format!("{c:?}")),
        payload: mpp_protocol::format_frame(frame.payload()),
        checksum: frame.checksum(),
        object: None,
        value: None,
        name: None,
    };

    match command {
        Some(CommandCode::ReadParameter) => {
            let response = ReadResponse::parse(&frame)?;
            report.object = Some(response.address.to_string());
            // A bare request carries no value bytes.
            report.value = match response.value(!unsigned) {
                Ok(value) => Some(value),
                Err(ProtocolError::EmptyValue) => None,
                Err(e) => return Err(e.into()),
            };
        }
        Some(CommandCode::Reset) => {
            let boot = BootMessage::parse(&frame)?;
            report.name = boot.name().filter(|n| !n.is_empty()).map(str::to_string);
        }
        None => {}
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_describe_position_response() -> TestResult {
        let raw = [
            0x53, 0x0B, 0x01, 0x01, 0x64, 0x60, 0x00, 0x09, 0x00, 0x00, 0x00, 0x53, 0x45,
        ];
        let report = describe(&FrameCodec::default(), &raw, false)?;
        assert_eq!(report.object.as_deref(), Some("6064.0"));
        assert_eq!(report.value, Some(9));
        assert_eq!(report.command_name.as_deref(), Some("ReadParameter"));
        assert_eq!(report.checksum, 0x53);
        Ok(())
    }

    #[test]
    fn test_describe_request_has_no_value() -> TestResult {
        let raw = [0x53, 0x07, 0x01, 0x01, 0x64, 0x60, 0x00, 0x56, 0x45];
        let report = describe(&FrameCodec::default(), &raw, false)?;
        assert_eq!(report.object.as_deref(), Some("6064.0"));
        assert_eq!(report.value, None);
        Ok(())
    }

    #[test]
    fn test_describe_five_byte_value() -> TestResult {
        let codec = FrameCodec::default();
        let raw = codec.encode(1, 0x01, &[0x64, 0x60, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF])?;
        assert_eq!(describe(&codec, &raw, false)?.value, Some(-1));
        assert_eq!(describe(&codec, &raw, true)?.value, Some(0xFF_FFFF_FFFF));
        Ok(())
    }

    #[test]
    fn test_describe_reports_undecodable_value() -> TestResult {
        let codec = FrameCodec::default();
        let mut payload = vec![0x64, 0x60, 0x00];
        payload.extend_from_slice(&[0x01; 9]);
        let raw = codec.encode(1, 0x01, &payload)?;
        let err = describe(&codec, &raw, false).err();
        assert!(err.is_some_and(|e| matches!(
            e.downcast_ref::<ProtocolError>(),
            Some(ProtocolError::ValueTooWide { len: 9, max: 8 })
        )));
        Ok(())
    }

    #[test]
    fn test_describe_reset_request() -> TestResult {
        let raw = [0x53, 0x04, 0x01, 0x00, 0x50, 0x45];
        let report = describe(&FrameCodec::default(), &raw, false)?;
        assert_eq!(report.command_name.as_deref(), Some("Reset"));
        assert_eq!(report.name, None);
        assert_eq!(report.payload, "");
        Ok(())
    }

    #[test]
    fn test_describe_rejects_bad_crc() {
        let raw = [0x53, 0x07, 0x01, 0x01, 0x64, 0x60, 0x00, 0x57, 0x45];
        let err = describe(&FrameCodec::default(), &raw, false).err();
        assert!(err.is_some_and(|e| matches!(
            e.downcast_ref::<ProtocolError>(),
            Some(ProtocolError::ChecksumMismatch { .. })
        )));
    }

    #[test]
    fn test_encode_with_node_override() -> TestResult {
        let config = LinkConfig {
            node_id: 2,
            ..LinkConfig::default()
        };
        encode(&config, Some(ObjectAddress::new(0x6064, 0)), true)?;
        Ok(())
    }
}
