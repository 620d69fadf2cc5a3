//! CiA 402 statusword decoding.

use bitflags::bitflags;

use crate::commands::ReadResponse;
use crate::error::{ProtocolError, ProtocolResult};
use crate::value::decode_value;

bitflags! {
    /// Statusword bits (object 0x6041).
    ///
    /// Bits 8 and 12–15 are manufacturer or mode specific and kept as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Statusword: u16 {
        const READY_TO_SWITCH_ON    = 1 << 0;
        const SWITCHED_ON           = 1 << 1;
        const OPERATION_ENABLED     = 1 << 2;
        const FAULT                 = 1 << 3;
        const VOLTAGE_ENABLED       = 1 << 4;
        const QUICK_STOP            = 1 << 5;
        const SWITCH_ON_DISABLED    = 1 << 6;
        const WARNING               = 1 << 7;
        const REMOTE                = 1 << 9;
        const TARGET_REACHED        = 1 << 10;
        const INTERNAL_LIMIT_ACTIVE = 1 << 11;

        const _ = !0;
    }
}

/// Power state machine state derived from the statusword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveState {
    NotReadyToSwitchOn,
    SwitchOnDisabled,
    ReadyToSwitchOn,
    SwitchedOn,
    OperationEnabled,
    QuickStopActive,
    FaultReactionActive,
    Fault,
    Unknown,
}

impl DriveState {
    pub fn is_fault(self) -> bool {
        matches!(self, Self::Fault | Self::FaultReactionActive)
    }
}

const STATE_MASK_SHORT: u16 = 0x004F;
const STATE_MASK_LONG: u16 = 0x006F;

impl Statusword {
    pub fn from_raw(raw: u16) -> Self {
        Self::from_bits_retain(raw)
    }

    /// Interpret a read response for 0x6041. The value is at most 16 bits.
    pub fn from_response(response: &ReadResponse) -> ProtocolResult<Self> {
        if response.data.len() > 2 {
            return Err(ProtocolError::ValueTooWide {
                len: response.data.len(),
                max: 2,
            });
        }
        let value = decode_value(&response.data, false)?;
        let raw = u16::try_from(value).map_err(|_| ProtocolError::ValueTooWide {
            len: response.data.len(),
            max: 2,
        })?;
        Ok(Self::from_raw(raw))
    }

    pub fn state(self) -> DriveState {
        let raw = self.bits();
        match (raw & STATE_MASK_SHORT, raw & STATE_MASK_LONG) {
            (0x00, _) => DriveState::NotReadyToSwitchOn,
            (0x40, _) => DriveState::SwitchOnDisabled,
            (_, 0x21) => DriveState::ReadyToSwitchOn,
            (_, 0x23) => DriveState::SwitchedOn,
            (_, 0x27) => DriveState::OperationEnabled,
            (_, 0x07) => DriveState::QuickStopActive,
            (0x0F, _) => DriveState::FaultReactionActive,
            (0x08, _) => DriveState::Fault,
            _ => DriveState::Unknown,
        }
    }
}
