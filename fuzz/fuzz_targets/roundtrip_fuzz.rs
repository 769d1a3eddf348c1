#![no_main]
use libfuzzer_sys::fuzz_target;
use lcwpack::container::{self, CodecKind, PackOptions};
use lcwpack::lcw;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the block size; the rest is the payload.
    let block_size = (data[0] as usize + 1) * 64;
    let payload = &data[1..];

    let stream = lcw::encode(payload);
    assert_eq!(lcw::decode(&stream, payload.len()), payload);

    let opts = PackOptions {
        block_size,
        ..PackOptions::default()
    };
    let packed = container::pack_with(payload, &opts).unwrap();
    let unpacked = container::unpack_with(&packed, payload.len(), &CodecKind::Lcw).unwrap();
    assert_eq!(unpacked, payload);
});
