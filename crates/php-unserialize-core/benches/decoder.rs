//! Benchmarks for the PHP unserialize decoder.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use php_unserialize_core::decode;

fn simple_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("simple_types");

    let cases: [(&str, &[u8]); 4] = [
        ("null", b"N;"),
        ("bool", b"b:1;"),
        ("int", b"i:1234567890;"),
        ("float", b"d:3.141592653589793;"),
    ];
    for (name, data) in cases {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| decode(black_box(data))));
    }

    group.finish();
}

fn strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("strings");

    let sizes = [
        ("short_5b", 5),
        ("medium_100b", 100),
        ("large_10kb", 10_000),
        ("huge_1mb", 1_000_000),
    ];
    for (name, len) in sizes {
        let data = format!("s:{}:\"{}\";", len, "x".repeat(len));
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| decode(black_box(data))));
    }

    // Payload full of delimiters must not slow the length-exact slice.
    let tricky = format!("s:3000:\"{}\";", "\";}".repeat(1000));
    let tricky = tricky.as_bytes();
    group.throughput(Throughput::Bytes(tricky.len() as u64));
    group.bench_function("delimiters_3kb", |b| b.iter(|| decode(black_box(tricky))));

    group.finish();
}

fn arrays(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrays");

    let empty = b"a:0:{}";
    group.throughput(Throughput::Bytes(empty.len() as u64));
    group.bench_function("empty", |b| b.iter(|| decode(black_box(empty))));

    for (name, n) in [("list_10", 10), ("list_100", 100), ("list_1000", 1000)] {
        let items: String = (0..n).map(|i| format!("i:{};i:{};", i, i * 2)).collect();
        let data = format!("a:{}:{{{}}}", n, items);
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| decode(black_box(data))));
    }

    // Same shape, but the last key breaks the sequence and forces a map.
    let gapped: String = {
        let items: String = (0..999).map(|i| format!("i:{};i:{};", i, i)).collect();
        format!("a:1000:{{{}i:5000;i:0;}}", items)
    };
    let gapped = gapped.as_bytes();
    group.throughput(Throughput::Bytes(gapped.len() as u64));
    group.bench_function("gapped_1000", |b| b.iter(|| decode(black_box(gapped))));

    let assoc: String = {
        let items: String = (0..100)
            .map(|i| {
                let key = format!("key_{}", i);
                format!("s:{}:\"{}\";i:{};", key.len(), key, i)
            })
            .collect();
        format!("a:100:{{{}}}", items)
    };
    let assoc = assoc.as_bytes();
    group.throughput(Throughput::Bytes(assoc.len() as u64));
    group.bench_function("assoc_100", |b| b.iter(|| decode(black_box(assoc))));

    group.finish();
}

fn nested_structures(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");

    for (name, depth) in [("depth_10", 10), ("depth_50", 50)] {
        let mut data = String::from("s:4:\"leaf\";");
        for i in 0..depth {
            let key = format!("k{}", i % 10);
            data = format!("a:1:{{s:{}:\"{}\";{}}}", key.len(), key, data);
        }
        let data = data.as_bytes();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| b.iter(|| decode(black_box(data))));
    }

    group.finish();
}

fn real_world(c: &mut Criterion) {
    let mut group = c.benchmark_group("real_world");

    let form_data = br#"a:3:{s:6:"fields";a:3:{i:0;a:3:{s:4:"type";s:4:"text";s:5:"label";s:4:"Name";s:8:"required";b:1;}i:1;a:3:{s:4:"type";s:5:"email";s:5:"label";s:5:"Email";s:8:"required";b:1;}i:2;a:3:{s:4:"type";s:8:"textarea";s:5:"label";s:7:"Message";s:8:"required";b:0;}}s:8:"settings";a:2:{s:11:"submit_text";s:6:"Submit";s:15:"success_message";s:10:"Thank you!";}s:11:"permissions";a:3:{i:0;s:4:"read";i:1;s:5:"write";i:2;s:6:"delete";}}"#;
    group.throughput(Throughput::Bytes(form_data.len() as u64));
    group.bench_function("form_data", |b| b.iter(|| decode(black_box(form_data))));

    let session = br#"O:7:"Session":3:{s:2:"id";s:8:"a1b2c3d4";s:4:"user";O:4:"User":2:{s:4:"name";s:5:"Alice";s:5:"roles";a:2:{i:0;s:5:"admin";i:1;s:6:"editor";}}s:7:"expires";i:1735689600;}"#;
    group.throughput(Throughput::Bytes(session.len() as u64));
    group.bench_function("session_object", |b| b.iter(|| decode(black_box(session))));

    group.finish();
}

#[cfg(feature = "serde")]
fn json_conversion(c: &mut Criterion) {
    use php_unserialize_core::json::to_json_string;

    let mut group = c.benchmark_group("json");

    let data = br#"a:3:{s:4:"name";s:5:"Alice";s:3:"age";i:30;s:4:"tags";a:2:{i:0;s:5:"admin";i:1;s:6:"active";}}"#;

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("decode_and_convert", |b| {
        b.iter(|| {
            let (value, _) = decode(black_box(data)).unwrap();
            to_json_string(&value).unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    simple_types,
    strings,
    arrays,
    nested_structures,
    real_world,
);

#[cfg(feature = "serde")]
criterion_group!(serde_benches, json_conversion);

#[cfg(feature = "serde")]
criterion_main!(benches, serde_benches);

#[cfg(not(feature = "serde"))]
criterion_main!(benches);
