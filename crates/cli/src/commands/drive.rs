//! Commands that talk to a connected drive

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use mpp_link::{Drive, LinkConfig, LinkError, SerialTransport, Transport};
use mpp_protocol::ObjectAddress;
use tracing::{info, warn};

use crate::error::CliError;
use crate::output::{self, StatusReport, ValueReport};

/// Open the configured port.
pub fn connect(config: &LinkConfig) -> Result<Drive<SerialTransport>> {
    mpp_link::connect(config).map_err(|e| match e {
        LinkError::Serial(err) => {
            CliError::PortUnavailable(format!("{}: {}", config.port, err)).into()
        }
        other => anyhow::Error::from(other),
    })
}

pub fn reset<T: Transport>(drive: &mut Drive<T>, yes: bool, json: bool) -> Result<()> {
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Soft-reset the drive? Motion will stop.")
            .default(false)
            .interact()
            .context("Confirmation prompt failed; pass --yes to skip it")?;
        if !confirmed {
            return Err(CliError::Aborted.into());
        }
    }

    let boot = drive.soft_reset()?;
    output::print_boot(&boot, json);
    Ok(())
}

pub fn read<T: Transport>(
    drive: &mut Drive<T>,
    object: ObjectAddress,
    unsigned: bool,
    json: bool,
) -> Result<()> {
    let response = drive.read_raw(object)?;
    let value = response.value(!unsigned)?;
    output::print_value(&ValueReport::new(object, &response.data, value), json);
    Ok(())
}

pub fn status<T: Transport>(drive: &mut Drive<T>, json: bool) -> Result<()> {
    let statusword = drive.read_statusword()?;
    output::print_status(&StatusReport::from(statusword), json);
    Ok(())
}

pub fn position<T: Transport>(drive: &mut Drive<T>, json: bool) -> Result<()> {
    let position = drive.read_position()?;
    output::print_position(position, json);
    Ok(())
}

/// Poll the position until `count` reads have been made (forever if `None`).
///
/// A failed read is logged and polling goes on. Fails only if no read
/// succeeded at all.
pub fn watch_position<T: Transport>(
    drive: &mut Drive<T>,
    interval: Duration,
    count: Option<u64>,
    json: bool,
) -> Result<()> {
    info!(?interval, ?count, "Polling position");
    let mut reads: u64 = 0;
    let mut successes: u64 = 0;
    let mut last_error = None;

    loop {
        match drive.read_position() {
            Ok(position) => {
                successes = successes.saturating_add(1);
                output::print_position(position, json);
            }
            Err(e) => {
                warn!(error = %e, "Position read failed");
                last_error = Some(e);
            }
        }

        reads = reads.saturating_add(1);
        if count.is_some_and(|limit| reads >= limit) {
            break;
        }
        thread::sleep(interval);
    }

    match last_error {
        Some(e) if successes == 0 => Err(e.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpp_link::MockTransport;
    use mpp_protocol::{FrameCodec, FrameConfig, ProtocolError};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const POS_RESPONSE: [u8; 13] = [
        0x53, 0x0B, 0x01, 0x01, 0x64, 0x60, 0x00, 0x09, 0x00, 0x00, 0x00, 0x53, 0x45,
    ];

    fn drive_with(replies: &[&[u8]]) -> Drive<MockTransport> {
        let mut mock = MockTransport::new();
        for reply in replies {
            mock.push_reply(reply.to_vec());
        }
        Drive::new(mock, FrameConfig::default())
    }

    #[test]
    fn test_watch_continues_after_failure() -> TestResult {
        let mut drive = drive_with(&[&[], &POS_RESPONSE, &[0x53, 0x00]]);
        watch_position(&mut drive, Duration::ZERO, Some(3), true)?;
        assert_eq!(drive.transport().written().len(), 3);
        Ok(())
    }

    #[test]
    fn test_watch_fails_when_nothing_answers() {
        let mut drive = drive_with(&[]);
        let result = watch_position(&mut drive, Duration::ZERO, Some(2), true);
        let err = result.err();
        assert!(err.is_some_and(|e| matches!(
            e.downcast_ref::<LinkError>(),
            Some(LinkError::Protocol(ProtocolError::NoData))
        )));
    }

    #[test]
    fn test_read_unsigned() -> TestResult {
        let reply = FrameCodec::default().encode(1, 0x01, &[0x10, 0x10, 0x00, 0xFF])?;
        let mut drive = drive_with(&[&reply]);
        read(&mut drive, ObjectAddress::new(0x1010, 0), true, true)?;
        Ok(())
    }

    #[test]
    fn test_reset_with_yes_skips_prompt() -> TestResult {
        let reply = FrameCodec::default().encode(1, 0x00, b"MPP drive")?;
        let mut drive = drive_with(&[&reply]);
        reset(&mut drive, true, true)?;
        assert_eq!(
            drive.transport().written().first().map(Vec::as_slice),
            Some(&[0x53, 0x04, 0x01, 0x00, 0x50, 0x45][..])
        );
        Ok(())
    }

    #[test]
    fn test_status_reads_statusword() -> TestResult {
        let reply = [
            0x53, 0x09, 0x01, 0x01, 0x41, 0x60, 0x00, 0x40, 0x04, 0x6C, 0x45,
        ];
        let mut drive = drive_with(&[&reply]);
        status(&mut drive, false)?;
        Ok(())
    }
}
