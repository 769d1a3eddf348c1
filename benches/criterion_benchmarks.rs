use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lcwpack::container::{self, CodecKind, PackOptions};
use lcwpack::lcw;
use std::fs;
use std::path::Path;

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Tile-map-like data: mostly clear cells, blocks of one terrain type and
/// scattered noise every `stride` bytes.
fn gen_map(size: usize, stride: usize) -> Vec<u8> {
    let noise = gen_data(size / stride.max(1) + 1, size as u64);
    (0..size)
        .map(|i| {
            if i % stride.max(1) == 0 {
                noise[i / stride.max(1)]
            } else if (i / 24 + i / 4096) % 5 == 0 {
                0x03
            } else {
                0xFF
            }
        })
        .collect()
}

fn write_ratio_snapshot() {
    let mut csv = String::from("workload,codec,raw_bytes,packed_bytes,ratio\n");
    let workloads = [
        ("random", gen_data(256 * 1024, 1)),
        ("map_dense", gen_map(256 * 1024, 64)),
        ("map_sparse", gen_map(256 * 1024, 1024)),
    ];
    for (name, data) in &workloads {
        for codec in [CodecKind::Lcw, CodecKind::Lzo] {
            let opts = PackOptions {
                codec: codec.clone(),
                ..PackOptions::default()
            };
            let Ok(packed) = container::pack_with(data, &opts) else {
                continue;
            };
            let ratio = packed.len() as f64 / data.len() as f64;
            csv.push_str(&format!(
                "{name},{},{},{},{ratio}\n",
                codec.name(),
                data.len(),
                packed.len()
            ));
        }
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_encoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("lcw_encoding_speed");
    for size in [4 * 1024usize, 32 * 1024, 64 * 1024] {
        let data = gen_map(size, 256);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(lcw::encode(black_box(&data))));
        });
    }
    g.finish();
}

fn bench_decoding_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("lcw_decoding_speed");
    for size in [4 * 1024usize, 64 * 1024, 256 * 1024] {
        let data = gen_map(size, 256);
        let stream = lcw::encode(&data);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(lcw::decode(black_box(&stream), size)));
        });
    }
    g.finish();
}

fn bench_container_codecs(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("container_pack_by_codec");
    let data = gen_map(80 * 1024, 128);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for codec in [CodecKind::Lcw, CodecKind::Lzo, CodecKind::Store] {
        let opts = PackOptions {
            codec: codec.clone(),
            ..PackOptions::default()
        };
        if container::pack_with(&data, &opts).is_err() {
            continue;
        }
        g.bench_function(codec.name(), |b| {
            b.iter(|| black_box(container::pack_with(black_box(&data), &opts).unwrap()));
        });
    }
    g.finish();
}

fn bench_block_size(c: &mut Criterion) {
    let mut g = c.benchmark_group("container_roundtrip_vs_block_size");
    let data = gen_map(80 * 1024, 128);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for block_size in [1024usize, 4096, 8192, 32 * 1024, 65_535] {
        let opts = PackOptions {
            block_size,
            ..PackOptions::default()
        };
        g.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                b.iter(|| {
                    let packed = container::pack_with(&data, &opts).unwrap();
                    let out = container::unpack_with(&packed, data.len(), &CodecKind::Lcw).unwrap();
                    black_box(out);
                });
            },
        );
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_encoding_speed,
    bench_decoding_speed,
    bench_container_codecs,
    bench_block_size
);
criterion_main!(benches);
