use lcwpack::container::{self, CodecKind, PackOptions};
use lcwpack::io::{pack_file, unpack_file};
use lcwpack::lcw;
use tempfile::NamedTempFile;

/// 256x256 tile overlay plus a 128x128 preview, the largest payload a map
/// section carries.
fn map_payload() -> Vec<u8> {
    let mut s = 0x2545_F491_4F6C_DD1Du64;
    let mut out = Vec::with_capacity(256 * 256 + 128 * 128);
    for y in 0..256usize {
        for x in 0..256usize {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            let noisy = (s >> 58) == 0;
            out.push(if noisy {
                (s >> 40) as u8
            } else if (x / 16 + y / 16) % 3 == 0 {
                0x05
            } else {
                0xFF
            });
        }
    }
    for i in 0..128 * 128usize {
        out.push((i % 128 / 8) as u8);
    }
    out
}

#[test]
fn raw_stream_over_64k_uses_relative_mode() {
    let data = map_payload();
    let stream = lcw::encode(&data);
    assert_eq!(stream[0], 0x00);
    assert!(stream.len() < data.len() / 2);
    assert_eq!(lcw::decode_exact(&stream, data.len()).unwrap(), data);
}

#[test]
fn container_keeps_chunks_absolute() {
    let data = map_payload();
    let stream = container::pack_with(&data, &PackOptions::default()).unwrap();
    for chunk in container::chunks(&stream) {
        assert_ne!(chunk.unwrap().payload[0], 0x00);
    }
    assert_eq!(
        container::unpack_with(&stream, data.len(), &CodecKind::Lcw).unwrap(),
        data
    );
}

#[test]
fn largest_block_size_roundtrip() {
    let data = map_payload();
    let opts = PackOptions {
        block_size: 65_535,
        ..PackOptions::default()
    };
    let stream = container::pack_with(&data, &opts).unwrap();
    assert_eq!(container::chunks(&stream).count(), data.len().div_ceil(65_535));
    assert_eq!(
        container::unpack_with(&stream, data.len(), &CodecKind::Lcw).unwrap(),
        data
    );
}

#[test]
fn file_helpers_roundtrip_large_payload() {
    let data = map_payload();
    let raw = NamedTempFile::new().unwrap();
    let packed = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();
    std::fs::write(raw.path(), &data).unwrap();

    let p = pack_file(raw.path(), packed.path(), &PackOptions::default()).unwrap();
    assert_eq!(p.input_size, data.len() as u64);
    assert_eq!(p.chunks, data.len().div_ceil(8192) as u64);

    let u = unpack_file(packed.path(), output.path(), data.len(), &CodecKind::Lcw).unwrap();
    assert_eq!(u.output_size, data.len() as u64);
    assert_eq!(u.chunks, p.chunks);
    assert_eq!(u.raw_sha256, p.raw_sha256);
    assert_eq!(std::fs::read(output.path()).unwrap(), data);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_packing_is_byte_identical() {
    let data = map_payload();
    for block_size in [1024usize, 8192, 65_535] {
        let opts = PackOptions {
            block_size,
            ..PackOptions::default()
        };
        assert_eq!(
            container::pack_parallel(&data, &opts).unwrap(),
            container::pack_with(&data, &opts).unwrap()
        );
    }
}
