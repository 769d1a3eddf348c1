#![no_main]
use libfuzzer_sys::fuzz_target;
use lcwpack::container::{self, LcwCodec, StoreCodec};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let cap = u16::from_le_bytes([data[0], data[1]]) as usize;
    let stream = &data[2..];
    let mut dst = vec![0u8; cap];

    // Corrupt containers must fail cleanly, never panic or overrun.
    match container::unpack_into(stream, &mut dst, &LcwCodec) {
        Ok(n) => assert!(n <= cap),
        Err(e) => assert!(e.written() <= cap),
    }
    let _ = container::unpack_into(stream, &mut dst, &StoreCodec);

    let _ = container::chunks(stream).count();
});
