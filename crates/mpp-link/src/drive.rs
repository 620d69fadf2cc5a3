//! Request/response session with a single drive.

use mpp_protocol::{
    BootMessage, Frame, FrameCodec, FrameConfig, HexBytes, ObjectAddress, ReadResponse, Request,
    Statusword, build_reset, decode_signed, objects,
};
use tracing::{debug, info, trace, warn};

use crate::error::LinkResult;
use crate::transport::Transport;

/// One drive on one transport. Every call writes a request and reads exactly
/// one chunk back; there is no retry.
pub struct Drive<T: Transport> {
    transport: T,
    codec: FrameCodec,
}

impl<T: Transport> std::fmt::Debug for Drive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drive")
            .field("node_id", &self.codec.node_id())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Drive<T> {
    pub fn new(transport: T, config: FrameConfig) -> Self {
        debug!(node_id = config.node_id, "Creating drive session");
        Self {
            transport,
            codec: FrameCodec::new(config),
        }
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send `request` and validate the reply frame.
    pub fn exchange(&mut self, request: &Request) -> LinkResult<Frame> {
        let raw = request.encode(&self.codec)?;
        debug!(
            command = ?request.command(),
            frame = %HexBytes(&raw),
            "-> request"
        );
        self.transport.write_all(&raw)?;

        let chunk = self
            .transport
            .read_chunk(self.codec.config().max_frame_len)?;
        trace!(len = chunk.len(), bytes = %HexBytes(&chunk), "<- chunk");

        match self.codec.receive(&chunk) {
            Ok(frame) => {
                debug!(
                    command = frame.command(),
                    payload = %HexBytes(frame.payload()),
                    "<- response"
                );
                Ok(frame)
            }
            Err(e) => {
                warn!(error = %e, bytes = %HexBytes(&chunk), "Rejected response");
                Err(e.into())
            }
        }
    }

    /// Soft-reset the drive and return its boot-up message.
    pub fn soft_reset(&mut self) -> LinkResult<BootMessage> {
        let frame = self.exchange(&build_reset())?;
        let boot = BootMessage::parse(&frame)?;
        info!(name = boot.name().unwrap_or("<binary>"), "Drive reset");
        Ok(boot)
    }

    /// Read an object and check the reply echoes its address.
    pub fn read_raw(&mut self, address: ObjectAddress) -> LinkResult<ReadResponse> {
        let frame = self.exchange(&address.read_request())?;
        Ok(ReadResponse::parse_for(&frame, address)?)
    }

    pub fn read_value(&mut self, address: ObjectAddress, signed: bool) -> LinkResult<i128> {
        let value = self.read_raw(address)?.value(signed)?;
        debug!(object = %address, value, "Read value");
        Ok(value)
    }

    /// Position actual value (6064.0) in encoder increments.
    pub fn read_position(&mut self) -> LinkResult<i32> {
        let response = self.read_raw(objects::POSITION_ACTUAL_VALUE)?;
        Ok(decode_signed(&response.data)?)
    }

    pub fn read_statusword(&mut self) -> LinkResult<Statusword> {
        let response = self.read_raw(objects::STATUSWORD)?;
        Ok(Statusword::from_response(&response)?)
    }
}
