use std::io::{Cursor, Read, Write};

use proptest::prelude::*;
use streamprims_rle::{
    decode_to_vec, encode_to_vec, RleConfig, RleError, RleReader, RleWriter, DEFAULT_SIGNAL,
    MAX_RUN,
};

fn stream_roundtrip(data: &[u8], signal: u8, chunk: usize) -> Vec<u8> {
    let config = RleConfig::with_signal(signal);
    let mut writer = RleWriter::with_config(Vec::new(), config);
    for piece in data.chunks(chunk.max(1)) {
        writer.write_all(piece).unwrap();
    }
    let encoded = writer.finish().unwrap();

    let mut reader = RleReader::with_config(Cursor::new(encoded), config);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    out
}

/// Byte vectors biased towards runs and the signal byte.
fn runny_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        (
            prop_oneof![Just(DEFAULT_SIGNAL), Just(0xFFu8), Just(0x00u8), any::<u8>()],
            1usize..80,
        ),
        0..40,
    )
    .prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat(byte).take(len))
            .collect()
    })
}

proptest! {
    #[test]
    fn arbitrary_bytes_roundtrip(data in prop::collection::vec(any::<u8>(), 0..2048)) {
        let encoded = encode_to_vec(&data, DEFAULT_SIGNAL);
        prop_assert_eq!(decode_to_vec(&encoded, DEFAULT_SIGNAL).unwrap(), data);
    }

    #[test]
    fn runny_bytes_roundtrip_through_streams(
        data in runny_bytes(),
        signal in any::<u8>(),
        chunk in 1usize..64,
    ) {
        prop_assert_eq!(stream_roundtrip(&data, signal, chunk), data);
    }

    #[test]
    fn streamed_encoding_matches_buffer_encoding(data in runny_bytes()) {
        let mut writer = RleWriter::new(Vec::new());
        writer.write_all(&data).unwrap();
        let streamed = writer.finish().unwrap();
        prop_assert_eq!(streamed, encode_to_vec(&data, DEFAULT_SIGNAL));
    }
}

#[test]
fn signal_at_every_position() {
    for len in 1..12usize {
        for pos in 0..len {
            let mut data = vec![0x10u8; len];
            data[pos] = DEFAULT_SIGNAL;
            assert_eq!(stream_roundtrip(&data, DEFAULT_SIGNAL, 3), data);
        }
    }
}

#[test]
fn all_signal_runs_of_every_small_length() {
    for len in 0..200usize {
        let data = vec![DEFAULT_SIGNAL; len];
        assert_eq!(stream_roundtrip(&data, DEFAULT_SIGNAL, 7), data);
    }
}

#[test]
fn boundary_run_lengths_roundtrip() {
    for len in [1, 2, 3, 63, 64, 8191, 8192, 16383, 16384, MAX_RUN - 1, MAX_RUN, MAX_RUN + 1] {
        let data = vec![0x5Au8; len];
        assert_eq!(stream_roundtrip(&data, DEFAULT_SIGNAL, 65536), data);
    }
}

#[test]
fn frame_sizes_at_boundaries() {
    let expected_len = [
        (1usize, 1usize),
        (2, 2),
        (3, 3),
        (63, 3),
        (64, 4),
        (8191, 4),
        (8192, 4),
        (4_194_302, 5),
        (4_194_303, 5),
        (4_194_304, 6),
    ];
    for (run, frame_len) in expected_len {
        let encoded = encode_to_vec(&vec![0x41u8; run], DEFAULT_SIGNAL);
        assert_eq!(encoded.len(), frame_len, "run of {run}");
    }
}

#[test]
fn corrupted_stream_reports_frame_kind() {
    let mut encoded = encode_to_vec(&[7u8; 100], DEFAULT_SIGNAL);
    encoded.truncate(encoded.len() - 1);

    let err = decode_to_vec(&encoded, DEFAULT_SIGNAL).unwrap_err();
    assert!(matches!(err, RleError::Truncated { .. }));
    assert!(err.to_string().contains("run value"));
}
