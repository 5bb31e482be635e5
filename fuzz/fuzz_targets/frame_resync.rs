//! Resynchronizing decoder terminates and never skips more than it read.

#![no_main]

use gsvc_core::{DecodeError, FrameDecoder, ResyncPolicy};
use libfuzzer_sys::fuzz_target;

const MAX_SKIP: usize = 256;

fuzz_target!(|data: &[u8]| {
    let mut decoder =
        FrameDecoder::new(data).with_resync(ResyncPolicy::ScanForMagic { max_skip: MAX_SKIP });

    loop {
        let before = decoder.get_ref().len();
        match decoder.decode_next() {
            Ok(_) => {},
            Err(DecodeError::Protocol(_)) => {},
            Err(_) => break,
        }
        assert!(decoder.get_ref().len() < before, "decode made no progress");
    }

    assert!(decoder.skipped_bytes() <= data.len() as u64);
});
