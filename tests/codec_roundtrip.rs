use std::io::{Read, Write};

use compression_analyzer::{gzip_bound, CodecError, GzipCodec, SingleBufferCodec};
use proptest::prelude::*;
use quickcheck::quickcheck;

quickcheck! {
    fn roundtrip_every_level(data: Vec<u8>) -> bool {
        (1..=9).all(|level| {
            let compressed = GzipCodec.compress(&data, level).unwrap();
            compressed.len() <= gzip_bound(data.len())
                && GzipCodec.decompress(&compressed).unwrap() == data
        })
    }
}

proptest! {
    #[test]
    fn roundtrip_larger_buffers(
        data in prop::collection::vec(any::<u8>(), 0..40_000),
        level in 1u32..=9,
    ) {
        let compressed = GzipCodec.compress(&data, level).unwrap();
        prop_assert_eq!(GzipCodec.decompress(&compressed).unwrap(), data);
    }
}

#[test]
fn out_of_range_levels_are_rejected() {
    assert_eq!(
        GzipCodec.compress(b"data", 0).unwrap_err(),
        CodecError::InvalidLevel(0)
    );
    assert_eq!(
        GzipCodec.compress(b"data", 10).unwrap_err(),
        CodecError::InvalidLevel(10)
    );
}

#[test]
fn interoperates_with_standard_gzip() {
    let data = b"The quick brown fox jumps over the lazy dog. ".repeat(200);

    let ours = GzipCodec.compress(&data, 9).unwrap();
    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(&ours[..])
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, data);

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&data).unwrap();
    let theirs = encoder.finish().unwrap();
    assert_eq!(GzipCodec.decompress(&theirs).unwrap(), data);
}

#[test]
fn corrupted_header_is_rejected() {
    let mut compressed = GzipCodec.compress(b"hello world", 6).unwrap();
    compressed[0] = 0x00;
    assert!(matches!(
        GzipCodec.decompress(&compressed).unwrap_err(),
        CodecError::Corrupt(_)
    ));
}

#[test]
fn corrupted_checksum_is_rejected() {
    let mut compressed = GzipCodec.compress(b"hello world", 6).unwrap();
    let crc_at = compressed.len() - 8;
    compressed[crc_at] ^= 0xff;
    assert!(GzipCodec.decompress(&compressed).is_err());
}

#[test]
fn truncated_stream_never_returns_short_output() {
    let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    let compressed = GzipCodec.compress(&data, 6).unwrap();
    for cut in [0, 1, 5, 10, compressed.len() / 2, compressed.len() - 4, compressed.len() - 1] {
        assert!(
            GzipCodec.decompress(&compressed[..cut]).is_err(),
            "cut at {cut} decoded"
        );
    }
}

#[test]
fn higher_levels_do_not_grow_repetitive_output() {
    let data = b"abcabcabdabcabcabd".repeat(5000);
    let fast = GzipCodec.compress(&data, 1).unwrap();
    let best = GzipCodec.compress(&data, 9).unwrap();
    assert!(best.len() <= fast.len());
}
