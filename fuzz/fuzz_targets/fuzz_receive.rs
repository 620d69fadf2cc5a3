//! Fuzzes the stream receiver (resync + frame validation).
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_receive
#![no_main]
use libfuzzer_sys::fuzz_target;
use mpp_protocol::FrameCodec;

fuzz_target!(|data: &[u8]| {
    let codec = FrameCodec::default();
    // Must never panic on arbitrary bytes, and anything accepted must
    // re-encode to a frame that is itself accepted.
    if let Ok(frame) = codec.receive(data) {
        let raw = codec
            .encode(frame.node_id(), frame.command(), frame.payload())
            .expect("accepted frame must re-encode");
        assert!(codec.is_valid_frame(&raw));
    }
});
