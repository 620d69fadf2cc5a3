//! Hex rendering of raw frames for logs and console output.

use std::fmt;

/// Displays bytes as space-separated upper-case hex pairs: `53 07 01`.
#[derive(Debug, Clone, Copy)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for byte in self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
            first = false;
        }
        Ok(())
    }
}

pub fn format_frame(bytes: &[u8]) -> String {
    HexBytes(bytes).to_string()
}
