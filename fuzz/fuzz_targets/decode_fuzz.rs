#![no_main]
use libfuzzer_sys::fuzz_target;
use lcwpack::lcw;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the output capacity; the rest is the stream.
    let cap = u16::from_le_bytes([data[0], data[1]]) as usize;
    let stream = &data[2..];

    let mut dst = vec![0u8; cap];
    let report = lcw::decode_detailed(stream, &mut dst);
    assert!(report.written <= cap);
    assert!(report.consumed <= stream.len());

    // The listing must never claim more bytes than the stream holds.
    let (_, header_len) = lcw::AddressMode::detect(stream);
    let mut iter = lcw::CommandIter::new(&stream[header_len..]);
    for _ in iter.by_ref() {}
    assert!(header_len + iter.position() <= stream.len());
});
