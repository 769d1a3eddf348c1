use lcwpack::container::{self, CodecKind, PackOptions, StoreCodec};
use lcwpack::lcw::{self, CommandIter};
use proptest::prelude::*;

/// Byte vectors biased towards runs and repeats.
fn runny_bytes(max: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec((any::<u8>(), 1usize..100), 0..max).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(b, n)| std::iter::repeat_n(b % 4, n))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_lcw_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let stream = lcw::encode(&data);
        prop_assert_eq!(lcw::decode(&stream, data.len()), data);
    }

    #[test]
    fn prop_lcw_roundtrip_runs(data in runny_bytes(64)) {
        let stream = lcw::encode(&data);
        prop_assert_eq!(lcw::decode(&stream, data.len()), data);
    }

    #[test]
    fn prop_stream_is_terminated_and_bounded(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let stream = lcw::encode(&data);
        prop_assert_eq!(stream.last().copied(), Some(0x80));
        prop_assert!(stream.len() <= lcw::worst_case_len(data.len()));
        prop_assert_ne!(stream.first().copied(), Some(0x00));
    }

    #[test]
    fn prop_commands_cover_output(data in runny_bytes(48)) {
        let stream = lcw::encode(&data);
        let mut total = 0usize;
        for cmd in CommandIter::new(&stream) {
            total += cmd.unwrap().output_len();
        }
        prop_assert_eq!(total, data.len());
    }

    #[test]
    fn prop_decode_never_exceeds_capacity(
        stream in proptest::collection::vec(any::<u8>(), 0..512),
        cap in 0usize..2048
    ) {
        let mut dst = vec![0u8; cap];
        let report = lcw::decode_detailed(&stream, &mut dst);
        prop_assert!(report.written <= cap);
        prop_assert!(report.consumed <= stream.len());
    }

    #[test]
    fn prop_prefix_decode_matches(data in runny_bytes(32), cut in 0usize..4000) {
        let stream = lcw::encode(&data);
        let cap = cut.min(data.len());
        prop_assert_eq!(lcw::decode(&stream, cap), &data[..cap]);
    }

    #[test]
    fn prop_container_roundtrip(
        data in runny_bytes(200),
        block_size in 1usize..5000
    ) {
        let opts = PackOptions { block_size, ..PackOptions::default() };
        let stream = container::pack_with(&data, &opts).unwrap();
        prop_assert_eq!(container::unpack_with(&stream, data.len(), &CodecKind::Lcw).unwrap(), data);
    }

    #[test]
    fn prop_unpack_arbitrary_bytes_is_safe(
        stream in proptest::collection::vec(any::<u8>(), 0..512),
        cap in 0usize..4096
    ) {
        let mut dst = vec![0u8; cap];
        match container::unpack_into(&stream, &mut dst, &lcwpack::container::LcwCodec) {
            Ok(n) => prop_assert!(n <= cap),
            Err(e) => prop_assert!(e.written() <= cap),
        }
        let _ = container::unpack_into(&stream, &mut dst, &StoreCodec);
    }
}
