//! Byte-stream transports the drive session runs over.
//!
//! A transport writes whole frames and hands back one chunk per read. It does
//! not validate anything; the session resynchronizes and decodes the chunk.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use mpp_protocol::{END_MARKER, HexBytes, find_start_marker};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, trace};

use crate::config::LinkConfig;
use crate::error::LinkResult;

/// Abstraction for the serial link to one drive.
///
/// Implementations must be `Send` but are not required to be `Sync`: one
/// request is outstanding at a time.
pub trait Transport: Send {
    fn write_all(&mut self, data: &[u8]) -> LinkResult<()>;

    /// Read one chunk of at most `max_bytes`, blocking no longer than the
    /// transport's timeout. An empty chunk means nothing arrived.
    fn read_chunk(&mut self, max_bytes: usize) -> LinkResult<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> LinkResult<()> {
        (**self).write_all(data)
    }

    fn read_chunk(&mut self, max_bytes: usize) -> LinkResult<Vec<u8>> {
        (**self).read_chunk(max_bytes)
    }
}

/// True once `chunk` (whose last byte is an end marker) holds everything its
/// first start marker's length byte announced.
///
/// An end-marker byte can also occur inside a payload or as a CRC, so stopping
/// at the first one would cut frames short.
pub fn chunk_complete(chunk: &[u8]) -> bool {
    let Some(start) = find_start_marker(chunk) else {
        return false;
    };
    match chunk.get(start + 1) {
        Some(&user_data_length) => chunk.len() - start >= usize::from(user_data_length) + 2,
        None => false,
    }
}

/// Serial port transport, 8N1 without flow control.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    timeout: Duration,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SerialTransport {
    pub fn open(config: &LinkConfig) -> LinkResult<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.timeout())
            .open()?;
        info!(
            "Opened serial port {} at {} baud (timeout {}ms)",
            config.port, config.baud_rate, config.timeout_ms
        );
        Ok(Self::from_port(port, config.timeout()))
    }

    pub fn from_port(port: Box<dyn SerialPort>, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> LinkResult<()> {
        self.port.write_all(data)?;
        self.port.flush()?;
        trace!(bytes = %HexBytes(data), "serial write");
        Ok(())
    }

    fn read_chunk(&mut self, max_bytes: usize) -> LinkResult<Vec<u8>> {
        let deadline = Instant::now() + self.timeout;
        let mut chunk = Vec::with_capacity(max_bytes);
        let mut byte = [0u8; 1];

        while chunk.len() < max_bytes {
            // Each read may only block for what is left of the chunk's budget.
            let Some(remaining) = deadline
                .checked_duration_since(Instant::now())
                .filter(|left| !left.is_zero())
            else {
                break;
            };
            self.port.set_timeout(remaining)?;

            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    let [b] = byte;
                    chunk.push(b);
                    if b == END_MARKER && chunk_complete(&chunk) {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        trace!(bytes = %HexBytes(&chunk), "serial read");
        Ok(chunk)
    }
}

/// Names of the serial ports present on this machine.
pub fn available_ports() -> LinkResult<Vec<String>> {
    let ports = serialport::available_ports()?;
    debug!("Found {} serial ports", ports.len());
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// In-memory transport with scripted replies. Records every write.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, reply: impl Into<Vec<u8>>) -> Self {
        self.push_reply(reply);
        self
    }

    pub fn push_reply(&mut self, reply: impl Into<Vec<u8>>) {
        self.replies.push_back(reply.into());
    }

    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> LinkResult<()> {
        self.written.push(data.to_vec());
        Ok(())
    }

    fn read_chunk(&mut self, max_bytes: usize) -> LinkResult<Vec<u8>> {
        let mut reply = self.replies.pop_front().unwrap_or_default();
        reply.truncate(max_bytes);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_chunk_complete_on_full_frame() {
        assert!(chunk_complete(&[
            0x53, 0x07, 0x01, 0x01, 0x64, 0x60, 0x00, 0x56, 0x45
        ]));
    }

    #[test]
    fn test_chunk_incomplete_when_end_marker_is_payload() {
        // Value byte 0x45 inside a read response.
        assert!(!chunk_complete(&[0x53, 0x0B, 0x01, 0x01, 0x64, 0x60, 0x00, 0x45]));
    }

    #[test]
    fn test_chunk_complete_after_noise() {
        assert!(chunk_complete(&[
            0x00, 0x45, 0x53, 0x04, 0x01, 0x00, 0x50, 0x45
        ]));
    }

    #[test]
    fn test_chunk_without_start_marker_is_incomplete() {
        assert!(!chunk_complete(&[0x00, 0x45]));
        assert!(!chunk_complete(&[0x53]));
    }

    #[test]
    fn test_mock_replays_in_order() -> TestResult {
        let mut mock = MockTransport::new().with_reply([1u8, 2]).with_reply([3u8]);
        mock.write_all(&[0xAA])?;
        assert_eq!(mock.read_chunk(64)?, [1, 2]);
        assert_eq!(mock.read_chunk(64)?, [3]);
        assert!(mock.read_chunk(64)?.is_empty());
        assert_eq!(mock.written(), [vec![0xAA]]);
        Ok(())
    }

    #[test]
    fn test_mock_respects_max_bytes() -> TestResult {
        let mut mock = MockTransport::new().with_reply(vec![0u8; 100]);
        assert_eq!(mock.read_chunk(64)?.len(), 64);
        Ok(())
    }

    /// Port that delivers a byte every couple of milliseconds and records the
    /// timeouts it is given.
    struct TricklePort {
        timeout: Duration,
        timeouts: Arc<Mutex<Vec<Duration>>>,
    }

    impl Read for TricklePort {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            std::thread::sleep(Duration::from_millis(2));
            match buf.first_mut() {
                Some(slot) => {
                    *slot = 0x00;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    impl Write for TricklePort {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SerialPort for TricklePort {
        fn name(&self) -> Option<String> {
            Some("trickle".to_string())
        }
        fn baud_rate(&self) -> serialport::Result<u32> {
            Ok(115_200)
        }
        fn data_bits(&self) -> serialport::Result<DataBits> {
            Ok(DataBits::Eight)
        }
        fn flow_control(&self) -> serialport::Result<FlowControl> {
            Ok(FlowControl::None)
        }
        fn parity(&self) -> serialport::Result<Parity> {
            Ok(Parity::None)
        }
        fn stop_bits(&self) -> serialport::Result<StopBits> {
            Ok(StopBits::One)
        }
        fn timeout(&self) -> Duration {
            self.timeout
        }
        fn set_baud_rate(&mut self, _: u32) -> serialport::Result<()> {
            Ok(())
        }
        fn set_data_bits(&mut self, _: DataBits) -> serialport::Result<()> {
            Ok(())
        }
        fn set_flow_control(&mut self, _: FlowControl) -> serialport::Result<()> {
            Ok(())
        }
        fn set_parity(&mut self, _: Parity) -> serialport::Result<()> {
            Ok(())
        }
        fn set_stop_bits(&mut self, _: StopBits) -> serialport::Result<()> {
            Ok(())
        }
        fn set_timeout(&mut self, timeout: Duration) -> serialport::Result<()> {
            self.timeout = timeout;
            if let Ok(mut seen) = self.timeouts.lock() {
                seen.push(timeout);
            }
            Ok(())
        }
        fn write_request_to_send(&mut self, _: bool) -> serialport::Result<()> {
            Ok(())
        }
        fn write_data_terminal_ready(&mut self, _: bool) -> serialport::Result<()> {
            Ok(())
        }
        fn read_clear_to_send(&mut self) -> serialport::Result<bool> {
            Ok(true)
        }
        fn read_data_set_ready(&mut self) -> serialport::Result<bool> {
            Ok(true)
        }
        fn read_ring_indicator(&mut self) -> serialport::Result<bool> {
            Ok(false)
        }
        fn read_carrier_detect(&mut self) -> serialport::Result<bool> {
            Ok(true)
        }
        fn bytes_to_read(&self) -> serialport::Result<u32> {
            Ok(1)
        }
        fn bytes_to_write(&self) -> serialport::Result<u32> {
            Ok(0)
        }
        fn clear(&self, _: serialport::ClearBuffer) -> serialport::Result<()> {
            Ok(())
        }
        fn try_clone(&self) -> serialport::Result<Box<dyn SerialPort>> {
            Err(serialport::Error::new(
                serialport::ErrorKind::Unknown,
                "not cloneable",
            ))
        }
        fn set_break(&self) -> serialport::Result<()> {
            Ok(())
        }
        fn clear_break(&self) -> serialport::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_serial_read_never_waits_past_deadline() -> TestResult {
        let budget = Duration::from_millis(20);
        let timeouts = Arc::new(Mutex::new(Vec::new()));
        let port = TricklePort {
            timeout: budget,
            timeouts: Arc::clone(&timeouts),
        };
        let mut transport = SerialTransport::from_port(Box::new(port), budget);

        let chunk = transport.read_chunk(1_000)?;
        assert!(!chunk.is_empty());
        assert!(chunk.len() < 1_000);

        let seen = timeouts.lock().map_err(|e| e.to_string())?;
        assert_eq!(seen.len(), chunk.len());
        assert!(seen.iter().all(|t| *t <= budget));
        assert!(seen.windows(2).all(|pair| pair.first() >= pair.last()));
        Ok(())
    }

    #[test]
    fn test_boxed_transport_delegates() -> TestResult {
        let mut boxed: Box<dyn Transport> = Box::new(MockTransport::new().with_reply([9u8]));
        boxed.write_all(&[1])?;
        assert_eq!(boxed.read_chunk(8)?, [9]);
        Ok(())
    }

    mod property_tests {
        use super::*;
        use mpp_protocol::FrameCodec;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(proptest::test_runner::Config::with_cases(500))]

            #[test]
            fn prop_only_the_full_frame_is_complete(
                command in any::<u8>(),
                payload in prop::collection::vec(any::<u8>(), 0..=58),
            ) {
                let frame = FrameCodec::default()
                    .encode(1, command, &payload)
                    .map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert!(chunk_complete(&frame));
                for cut in 1..frame.len() {
                    prop_assert!(!chunk_complete(&frame[..cut]));
                }
            }
        }
    }
}
