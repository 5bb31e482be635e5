//! Header parsing never panics and validated headers re-encode identically.

#![no_main]

use gsvc_proto::{FrameHeader, ProtocolConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = ProtocolConfig::default();

    let Ok(header) = FrameHeader::from_bytes(data) else {
        assert!(data.len() < FrameHeader::SIZE);
        return;
    };

    if header.validate(&config).is_ok() {
        assert!(header.payload_size() <= config.max_payload_size);
        assert_eq!(&header.to_bytes()[..], &data[..FrameHeader::SIZE]);
    }
});
