//! Frame fixtures.

use gsvc_proto::{FrameRecord, ProtocolConfig, Result};

/// Payload shaped like a JPEG: SOI marker, filler, EOI marker.
///
/// Only the markers are meaningful; nothing decodes it as an image.
pub fn jpeg_like_payload(len: usize, fill: u8) -> Vec<u8> {
    let mut payload = vec![fill; len];
    if len >= 2 {
        payload[0] = 0xff;
        payload[1] = 0xd8;
    }
    if len >= 4 {
        payload[len - 2] = 0xff;
        payload[len - 1] = 0xd9;
    }
    payload
}

/// Frame with a JPEG-like payload and a timestamp derived from the id.
pub fn sample_frame(source_id: u16, frame_id: u32, payload_len: usize) -> FrameRecord {
    let fill = (frame_id as u8).wrapping_add(source_id as u8);
    FrameRecord::new(
        source_id,
        frame_id,
        1_700_000_000_000_000 + u64::from(frame_id) * 33_333,
        jpeg_like_payload(payload_len, fill),
    )
}

/// Concatenated wire encoding of `frames` under the default config.
pub fn wire(frames: &[FrameRecord]) -> Result<Vec<u8>> {
    let config = ProtocolConfig::default();
    let mut out = Vec::with_capacity(frames.iter().map(FrameRecord::encoded_len).sum());
    for frame in frames {
        frame.encode(&config, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_has_jpeg_markers() {
        let payload = jpeg_like_payload(16, 0);
        assert_eq!(&payload[..2], &[0xff, 0xd8]);
        assert_eq!(&payload[14..], &[0xff, 0xd9]);
    }

    #[test]
    fn wire_concatenates_frames() {
        let frames = [sample_frame(0, 1, 10), sample_frame(1, 1, 0)];
        let bytes = wire(&frames).unwrap();
        assert_eq!(bytes.len(), 28 + 10 + 28);
    }
}
