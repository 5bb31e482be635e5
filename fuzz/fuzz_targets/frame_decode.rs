//! Decoding arbitrary bytes never panics, never over-reads, and always ends.

#![no_main]

use gsvc_core::{DecodeError, FrameDecoder, FrameHeader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new(data);
    let mut consumed = 0usize;

    loop {
        match decoder.decode_next() {
            Ok(frame) => {
                consumed += FrameHeader::SIZE + frame.payload.len();
                assert_eq!(data.len() - consumed, decoder.get_ref().len());
            },
            Err(err) if err.is_clean_close() => {
                assert_eq!(consumed, data.len());
                break;
            },
            Err(DecodeError::Protocol(_)) => {
                assert_eq!(data.len() - consumed - FrameHeader::SIZE, decoder.get_ref().len());
                break;
            },
            Err(_) => break,
        }
    }
});
