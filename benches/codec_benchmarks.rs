use std::collections::HashMap;
use std::hint::black_box;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use modbin::{Array2, Codec, CodecResult, EntryType, Mapper, Version};

#[derive(Default)]
struct Chunk {
    id: u64,
    label: String,
    heights: Array2<f32>,
    tags: HashMap<String, i32>,
}

impl EntryType for Chunk {
    const NAMESPACE: &'static str = "bench";
    const NAME: &'static str = "Chunk";

    fn map(&mut self, m: &mut Mapper<'_, '_, '_>) -> CodecResult<()> {
        m.field(&mut self.id)?;
        m.field(&mut self.label)?;
        m.field(&mut self.heights)?;
        m.field(&mut self.tags)
    }
}

fn bench_codec() -> Codec {
    Codec::builder("bench", Version::new(1, 0, 0, 0))
        .entry::<Chunk>()
        .build()
        .unwrap()
}

fn sample_chunk() -> Chunk {
    let heights: Vec<f32> = (0..64 * 64).map(|i| i as f32 * 0.001).collect();
    let mut tags = HashMap::new();
    for i in 0..32 {
        tags.insert(format!("tag-{i}"), i);
    }
    Chunk {
        id: 0x1122_3344_5566_7788,
        label: "chunk 17/42".to_owned(),
        heights: Array2::new(64, 64, heights).unwrap(),
        tags,
    }
}

fn encode_chunk(c: &mut Criterion) {
    let codec = bench_codec();
    let mut chunk = sample_chunk();

    let mut encoded = Vec::new();
    codec.serialize(&mut encoded, &mut chunk, None).unwrap();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("chunk", |b| {
        b.iter(|| {
            let mut bytes = Vec::with_capacity(encoded.len());
            codec
                .serialize(&mut bytes, black_box(&mut chunk), None)
                .unwrap();
            black_box(bytes)
        })
    });
    group.finish();
}

fn decode_chunk(c: &mut Criterion) {
    let codec = bench_codec();
    let mut chunk = sample_chunk();
    let mut bytes = Vec::new();
    codec.serialize(&mut bytes, &mut chunk, None).unwrap();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("chunk", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(bytes.as_slice()));
            let back: Chunk = codec.deserialize(&mut cursor, None).unwrap().unwrap();
            black_box(back)
        })
    });
    group.finish();
}

fn encode_plain_values(c: &mut Criterion) {
    let codec = bench_codec();
    let values: Vec<u64> = (0..4096).collect();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes((values.len() * 8 + 4) as u64));
    group.bench_function("plain_u64_vec", |b| {
        b.iter(|| {
            let mut bytes = Vec::with_capacity(values.len() * 8 + 64);
            let mut writer = codec.writer(&mut bytes, None).unwrap();
            writer.write_value(black_box(&values)).unwrap();
            drop(writer);
            black_box(bytes)
        })
    });
    group.finish();
}

criterion_group!(benches, encode_chunk, decode_chunk, encode_plain_values);
criterion_main!(benches);
