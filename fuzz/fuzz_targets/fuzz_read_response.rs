//! Fuzzes parameter read response parsing on top of the receiver.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_read_response
#![no_main]
use libfuzzer_sys::fuzz_target;
use mpp_protocol::{FrameCodec, ReadResponse, Statusword};

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = FrameCodec::default().receive(data) else {
        return;
    };
    if let Ok(response) = ReadResponse::parse(&frame) {
        let _ = response.value(true);
        let _ = Statusword::from_response(&response).map(Statusword::state);
    }
});
