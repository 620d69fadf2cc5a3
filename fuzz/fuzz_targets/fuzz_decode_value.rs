//! Fuzzes little-endian value decoding.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_decode_value
#![no_main]
use libfuzzer_sys::fuzz_target;
use mpp_protocol::decode_value;

fuzz_target!(|data: &[u8]| {
    let signed = data.first().is_some_and(|b| b & 1 == 1);
    let bytes = data.get(1..).unwrap_or_default();
    if let Ok(value) = decode_value(bytes, signed) {
        assert!(i128::from(i64::MIN) <= value && value <= i128::from(u64::MAX));
    }
});
