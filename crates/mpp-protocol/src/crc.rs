//! Bit-serial CRC-8 used as the frame integrity check.
//!
//! The drive shifts right (LSB first) with polynomial `0xD5` starting from
//! `0xFF`. There is no final XOR. Both constants must match the firmware
//! exactly, so they are carried as a value rather than hard-coded at call sites.

/// Polynomial used by the drive firmware.
pub const CRC8_POLYNOMIAL: u8 = 0xD5;

/// Initial accumulator value.
pub const CRC8_INIT: u8 = 0xFF;

/// CRC-8 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crc8 {
    pub polynomial: u8,
    pub init: u8,
}

impl Default for Crc8 {
    fn default() -> Self {
        Self::MPP
    }
}

impl Crc8 {
    /// Parameters of the MPP drive protocol.
    pub const MPP: Self = Self::new(CRC8_POLYNOMIAL, CRC8_INIT);

    pub const fn new(polynomial: u8, init: u8) -> Self {
        Self { polynomial, init }
    }

    /// Fold one byte into a running accumulator.
    #[inline]
    pub const fn update(&self, crc: u8, byte: u8) -> u8 {
        let mut crc = crc ^ byte;
        let mut bit = 0;
        while bit < 8 {
            if crc & 0x01 != 0 {
                crc = (crc >> 1) ^ self.polynomial;
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        crc
    }

    pub fn checksum(&self, data: &[u8]) -> u8 {
        data.iter()
            .fold(self.init, |crc, &byte| self.update(crc, byte))
    }
}

/// CRC-8 with the protocol's default parameters.
pub fn crc8(data: &[u8]) -> u8 {
    Crc8::MPP.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_init() {
        assert_eq!(crc8(&[]), 0xFF);
        assert_eq!(Crc8::new(0x07, 0x00).checksum(&[]), 0x00);
    }

    #[test]
    fn test_reference_status_request() {
        assert_eq!(crc8(&[0x07, 0x01, 0x01, 0x41, 0x60, 0x00]), 0x73);
    }

    #[test]
    fn test_reference_position_response() {
        let data = [0x0B, 0x01, 0x01, 0x64, 0x60, 0x00, 0x09, 0x00, 0x00, 0x00];
        assert_eq!(crc8(&data), 0x53);
    }

    #[test]
    fn test_reference_position_request() {
        assert_eq!(crc8(&[0x07, 0x01, 0x01, 0x64, 0x60, 0x00]), 0x56);
    }

    #[test]
    fn test_reset_request() {
        assert_eq!(crc8(&[0x04, 0x01, 0x00]), 0x50);
    }

    #[test]
    fn test_update_matches_checksum() {
        let data = [0x0B, 0x01, 0x01, 0x64, 0x60];
        let crc = Crc8::MPP;
        let mut acc = crc.init;
        for &b in &data {
            acc = crc.update(acc, b);
        }
        assert_eq!(acc, crc.checksum(&data));
    }

    #[test]
    fn test_polynomial_is_configurable() {
        let other = Crc8::new(0x8C, 0xFF);
        let data = [0x07, 0x01, 0x01, 0x41, 0x60, 0x00];
        assert_ne!(other.checksum(&data), crc8(&data));
    }
}
