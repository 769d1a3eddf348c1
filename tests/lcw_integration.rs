use lcwpack::lcw::{self, AddressMode, Command, CommandIter, StopReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill(&mut out[..]);
    out
}

/// Tile-like data: long runs, repeated rows and some noise.
fn map_like(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let row: Vec<u8> = (0..64).map(|_| rng.random_range(0..8u8)).collect();
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        match rng.random_range(0..4) {
            0 => out.extend(std::iter::repeat_n(0xFF, rng.random_range(10..200))),
            1 => out.extend_from_slice(&row),
            2 => out.push(rng.random()),
            _ => {
                let back = rng.random_range(1..=out.len().clamp(1, 4000));
                let start = out.len().saturating_sub(back);
                let take = rng.random_range(3..40).min(out.len() - start);
                let copy = out[start..start + take].to_vec();
                out.extend_from_slice(&copy);
            }
        }
    }
    out.truncate(len);
    out
}

#[test]
fn roundtrip_assorted_inputs() {
    let inputs: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![0],
        vec![0xAA; 3],
        vec![0x80; 500],
        b"abababababababababababababab".to_vec(),
        (0..=255u8).cycle().take(5000).collect(),
        random_bytes(3000, 1),
        map_like(16 * 1024, 2),
    ];
    for data in inputs {
        let stream = lcw::encode(&data);
        assert_eq!(*stream.last().unwrap(), 0x80);
        assert!(stream.len() <= lcw::worst_case_len(data.len()));
        assert_eq!(lcw::decode(&stream, data.len()), data, "len {}", data.len());
    }
}

#[test]
fn map_data_compresses() {
    let data = map_like(32 * 1024, 3);
    let stream = lcw::encode(&data);
    assert!(stream.len() * 2 < data.len(), "{} vs {}", stream.len(), data.len());
}

#[test]
fn seventy_equal_bytes_contain_a_fill() {
    let stream = lcw::encode(&[0x41; 70]);
    let has_fill = CommandIter::new(&stream)
        .map(Result::unwrap)
        .any(|c| matches!(c, Command::Fill { value: 0x41, .. }));
    assert!(has_fill);
}

#[test]
fn sentinel_only_above_sixteen_bits() {
    let at_limit = map_like(65_535, 4);
    let above = map_like(65_536, 4);
    assert_ne!(lcw::encode(&at_limit)[0], 0x00);
    let stream = lcw::encode(&above);
    assert_eq!(stream[0], 0x00);
    assert_eq!(AddressMode::detect(&stream).0, AddressMode::Relative);
    assert_eq!(lcw::decode(&stream, above.len()), above);
}

#[test]
fn command_listing_accounts_for_every_byte() {
    let data = map_like(20_000, 5);
    let stream = lcw::encode(&data);
    let mut iter = CommandIter::new(&stream);
    let total: usize = iter.by_ref().map(|c| c.unwrap().output_len()).sum();
    assert_eq!(total, data.len());
    assert!(iter.terminated());
    assert_eq!(iter.position(), stream.len());
}

#[test]
fn short_capacity_truncates_cleanly() {
    let data = map_like(4096, 6);
    let stream = lcw::encode(&data);
    for cap in [0, 1, 63, 64, 65, 1000, 4095] {
        let mut dst = vec![0u8; cap];
        let report = lcw::decode_detailed(&stream, &mut dst);
        assert_eq!(report.written, cap);
        assert_eq!(report.stop, StopReason::OutputFull);
        assert_eq!(dst, data[..cap]);
    }
}

#[test]
fn extra_capacity_is_left_untouched() {
    let data = b"hello hello hello".to_vec();
    let stream = lcw::encode(&data);
    let mut dst = vec![0xEE; 64];
    let report = lcw::decode_detailed(&stream, &mut dst);
    assert_eq!(report.stop, StopReason::Terminator);
    assert_eq!(report.written, data.len());
    assert!(dst[data.len()..].iter().all(|&b| b == 0xEE));
    assert!(lcw::decode_exact(&stream, 64).is_err());
}

#[test]
fn hostile_references_never_escape_the_buffer() {
    let streams: [&[u8]; 6] = [
        // absolute copy from far beyond the written data
        &[0x81, 0x41, 0xC5, 0xFF, 0xFF, 0x80],
        // short copy reaching before the start
        &[0x81, 0x41, 0x0F, 0xFF, 0x80],
        // wide copy with a huge length
        &[0x81, 0x41, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x80],
        // fill larger than any buffer here
        &[0xFE, 0xFF, 0xFF, 0x00],
        // relative copy before the start
        &[0x00, 0x81, 0x41, 0xC0, 0x10, 0x00, 0x80],
        // literal claiming more bytes than present
        &[0xBF, 1, 2, 3],
    ];
    for stream in streams {
        for cap in [0usize, 1, 7, 100] {
            let out = lcw::decode(stream, cap);
            assert!(out.len() <= cap);
        }
    }
}

#[test]
fn random_garbage_is_bounded() {
    for seed in 0..200u64 {
        let stream = random_bytes(64, seed);
        let out = lcw::decode(&stream, 256);
        assert!(out.len() <= 256);
    }
}
