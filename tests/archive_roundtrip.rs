use compression_analyzer::{
    parse, serialize, Entry, GzipArchiver, GzipCodec, MultiFileArchiver, SingleBufferCodec,
};
use proptest::prelude::*;

fn entry_strategy() -> impl Strategy<Value = Entry> {
    ("[a-zA-Z0-9._-]{1,24}", prop::collection::vec(any::<u8>(), 0..512))
        .prop_map(|(name, payload)| Entry::new(name, payload).unwrap())
}

proptest! {
    #[test]
    fn parse_inverts_serialize(entries in prop::collection::vec(entry_strategy(), 0..8)) {
        let blob = serialize(&entries);
        prop_assert_eq!(parse(&blob).unwrap(), entries);
    }

    #[test]
    fn roundtrip_through_codec(
        entries in prop::collection::vec(entry_strategy(), 0..6),
        level in 1u32..=9,
    ) {
        let codec = GzipCodec;
        let compressed = codec.compress(&serialize(&entries), level).unwrap();
        let blob = codec.decompress(&compressed).unwrap();
        prop_assert_eq!(parse(&blob).unwrap(), entries);
    }
}

#[test]
fn empty_payloads_survive() {
    let entries = vec![
        Entry::new("first", Vec::new()).unwrap(),
        Entry::new("second", vec![1, 2, 3]).unwrap(),
        Entry::new("third", Vec::new()).unwrap(),
    ];
    assert_eq!(parse(&serialize(&entries)).unwrap(), entries);
}

#[test]
fn order_and_duplicates_are_kept() {
    let entries = vec![
        Entry::new("b.txt", b"one".to_vec()).unwrap(),
        Entry::new("a.txt", b"two".to_vec()).unwrap(),
        Entry::new("b.txt", b"three".to_vec()).unwrap(),
    ];
    let parsed = parse(&serialize(&entries)).unwrap();
    let names: Vec<_> = parsed.iter().map(|e| e.name()).collect();
    assert_eq!(names, ["b.txt", "a.txt", "b.txt"]);
}

#[test]
fn unicode_names() {
    let entries = vec![Entry::new("résumé – 日本.txt", b"x".to_vec()).unwrap()];
    assert_eq!(parse(&serialize(&entries)).unwrap(), entries);
}

#[test]
fn empty_archive_packs_to_minimal_envelope() {
    let archiver = GzipArchiver::default();
    assert!(serialize(&[]).is_empty());
    let packed = archiver.pack(&[], 6).unwrap();
    assert_eq!(packed.len(), 20);
    assert!(archiver.unpack(&packed).unwrap().is_empty());
}
