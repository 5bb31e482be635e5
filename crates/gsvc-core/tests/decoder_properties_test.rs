//! Decoder behaviour over chunked transports.
//!
//! Every test feeds the decoder through a [`ChunkedReader`] so the byte
//! positions it reports are exactly what the decoder consumed.

use std::io;

use gsvc_core::{
    AsyncFrameDecoder, DecodeError, FrameDecoder, FrameHeader, FrameRecord, ProtocolConfig,
    ProtocolError, ReadStage,
};
use gsvc_harness::{ChunkPlan, ChunkedReader, sample_frame, wire};
use proptest::prelude::*;

#[test]
fn valid_frame_decodes_exactly() {
    let frame = sample_frame(2, 99, 1_000);
    let reader = ChunkedReader::new(wire(std::slice::from_ref(&frame)).unwrap(), ChunkPlan::Whole);

    let mut decoder = FrameDecoder::new(reader);
    assert_eq!(decoder.decode_next().unwrap(), frame);
    assert_eq!(decoder.get_ref().remaining(), 0);
}

#[test]
fn payload_at_limit_is_accepted() {
    let frame = sample_frame(0, 1, 1_048_576);
    let reader =
        ChunkedReader::new(wire(std::slice::from_ref(&frame)).unwrap(), ChunkPlan::Fixed(65_536));

    let mut decoder = FrameDecoder::new(reader);
    let decoded = decoder.decode_next().unwrap();
    assert_eq!(decoded.payload.len(), 1_048_576);
    assert_eq!(decoded, frame);
}

#[test]
fn bad_magic_consumes_only_the_header() {
    let mut bytes = wire(&[sample_frame(0, 1, 64)]).unwrap();
    bytes[0..4].copy_from_slice(b"JUNK");

    let mut decoder = FrameDecoder::new(ChunkedReader::new(bytes, ChunkPlan::Fixed(5)));
    let err = decoder.decode_next().unwrap_err();

    assert_eq!(err.as_protocol(), Some(&ProtocolError::BadMagic { found: 0x4a55_4e4b }));
    assert_eq!(decoder.get_ref().position(), FrameHeader::SIZE);
}

#[test]
fn oversize_payload_consumes_only_the_header() {
    let config = ProtocolConfig::default();
    let mut bytes = FrameHeader::new(&config, 0, 1, 2, 1_048_577).to_bytes().to_vec();
    bytes.extend(std::iter::repeat_n(0u8, 4096));

    let mut decoder = FrameDecoder::new(ChunkedReader::new(bytes, ChunkPlan::Whole));
    let err = decoder.decode_next().unwrap_err();

    assert_eq!(
        err.as_protocol(),
        Some(&ProtocolError::PayloadTooLarge { size: 1_048_577, max: 1_048_576 })
    );
    assert_eq!(decoder.get_ref().position(), FrameHeader::SIZE);
}

#[test]
fn no_bytes_at_all_is_a_clean_close() {
    let mut decoder = FrameDecoder::new(ChunkedReader::new(Vec::new(), ChunkPlan::Whole));
    let err = decoder.decode_next().unwrap_err();
    assert!(err.is_clean_close());
}

#[test]
fn torn_header_is_connection_closed_not_parse_error() {
    let bytes = wire(&[sample_frame(0, 1, 8)]).unwrap();

    for k in 1..FrameHeader::SIZE {
        let reader = ChunkedReader::new(bytes[..k].to_vec(), ChunkPlan::Fixed(3));
        let err = FrameDecoder::new(reader).decode_next().unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::ConnectionClosed { stage: ReadStage::Header, received, expected: 28 }
                    if received == k
            ),
            "k={k}: {err:?}"
        );
        assert!(!err.is_clean_close());
    }
}

#[test]
fn torn_payload_is_connection_closed_at_payload_stage() {
    let bytes = wire(&[sample_frame(0, 1, 100)]).unwrap();
    let reader = ChunkedReader::new(bytes[..FrameHeader::SIZE + 60].to_vec(), ChunkPlan::Whole);

    let err = FrameDecoder::new(reader).decode_next().unwrap_err();
    assert!(matches!(
        err,
        DecodeError::ConnectionClosed { stage: ReadStage::Payload, received: 60, expected: 100 }
    ));
}

#[test]
fn transport_error_propagates() {
    let bytes = wire(&[sample_frame(0, 1, 100)]).unwrap();
    let reader = ChunkedReader::new(bytes, ChunkPlan::Fixed(16))
        .fail_at(40, io::ErrorKind::ConnectionReset);

    let err = FrameDecoder::new(reader).decode_next().unwrap_err();
    assert!(
        matches!(err, DecodeError::Transport(ref e) if e.kind() == io::ErrorKind::ConnectionReset)
    );
}

#[test]
fn back_to_back_frames_end_at_end_of_input() {
    let frames = [sample_frame(0, 1, 17), sample_frame(1, 5, 3)];
    let reader = ChunkedReader::new(wire(&frames).unwrap(), ChunkPlan::Cycle(vec![1, 2, 7]));

    let mut decoder = FrameDecoder::new(reader);
    assert_eq!(decoder.decode_next().unwrap(), frames[0]);
    assert_eq!(decoder.decode_next().unwrap(), frames[1]);
    assert_eq!(decoder.get_ref().remaining(), 0);
    assert!(decoder.decode_next().unwrap_err().is_clean_close());
}

#[tokio::test]
async fn async_decoder_matches_blocking_decoder() {
    let frames = [sample_frame(0, 1, 500), sample_frame(3, 2, 0), sample_frame(0, 2, 77)];
    let bytes = wire(&frames).unwrap();

    let mut blocking = FrameDecoder::new(ChunkedReader::new(bytes.clone(), ChunkPlan::Fixed(1)));
    let mut asynchronous = AsyncFrameDecoder::new(ChunkedReader::new(
        bytes,
        ChunkPlan::Seeded { seed: 7, max: 13 },
    ));

    for frame in &frames {
        let a = blocking.decode_next().unwrap();
        let b = asynchronous.decode_next().await.unwrap();
        assert_eq!(&a, frame);
        assert_eq!(&b, frame);
    }
    assert!(asynchronous.decode_next().await.unwrap_err().is_clean_close());
}

fn arb_frame() -> impl Strategy<Value = FrameRecord> {
    (any::<u16>(), any::<u32>(), any::<u64>(), prop::collection::vec(any::<u8>(), 0..2048))
        .prop_map(|(source_id, frame_id, timestamp_us, payload)| {
            FrameRecord::new(source_id, frame_id, timestamp_us, payload)
        })
}

proptest! {
    #[test]
    fn decoding_is_independent_of_chunking(
        frames in prop::collection::vec(arb_frame(), 1..5),
        seed in any::<u64>(),
        max in 1usize..64,
    ) {
        let bytes = wire(&frames).unwrap();

        let mut whole = FrameDecoder::new(ChunkedReader::new(bytes.clone(), ChunkPlan::Whole));
        let mut chunked =
            FrameDecoder::new(ChunkedReader::new(bytes, ChunkPlan::Seeded { seed, max }));

        for frame in &frames {
            let a = whole.decode_next().unwrap();
            let b = chunked.decode_next().unwrap();
            prop_assert_eq!(&a, frame);
            prop_assert_eq!(&b, frame);
        }
        prop_assert!(chunked.decode_next().unwrap_err().is_clean_close());
    }

    #[test]
    fn truncation_anywhere_is_connection_closed(frame in arb_frame(), cut in any::<prop::sample::Index>()) {
        let bytes = wire(std::slice::from_ref(&frame)).unwrap();
        let cut = cut.index(bytes.len());
        prop_assume!(cut > 0);

        let err = FrameDecoder::new(ChunkedReader::new(bytes[..cut].to_vec(), ChunkPlan::Fixed(1)))
            .decode_next()
            .unwrap_err();

        let is_closed = matches!(err, DecodeError::ConnectionClosed { .. });
        prop_assert!(is_closed);
        prop_assert!(!err.is_clean_close());
    }
}
