use criterion::{black_box, criterion_group, criterion_main, Criterion};
use matcher::{compare, normalize};
use serde_json::json;

fn bench_compare(c: &mut Criterion) {
    let left = json!({
        "audioHash": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        "drmHash": "unsupported",
        "canvasHash": "60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752",
        "storageSalt": "5f0c3e4f2b8a4c1d9e7f6a5b4c3d2e1f",
        "privateFlag": false,
        "deviceInfo": {
            "userAgent": "Mozilla/5.0 (X11; Linux x86_64)",
            "screenRes": "2560x1440",
            "deviceMemory": 8,
            "hardwareConcurrency": 16,
        },
        "localeInfo": {"timezone": "UTC", "language": "en-US", "languages": ["en-US", "en"]},
    });
    let mut right = left.clone();
    right["canvasHash"] = json!("unavailable");
    let left_text = left.to_string();

    let mut group = c.benchmark_group("compare");
    group.bench_function("records", |b| {
        b.iter(|| compare(black_box(left.clone()), black_box(right.clone())))
    });
    group.bench_function("json_text_vs_record", |b| {
        b.iter(|| compare(black_box(left_text.as_str()), black_box(right.clone())))
    });
    group.bench_function("identifiers", |b| {
        b.iter(|| compare(black_box("abc123"), black_box("abc123")))
    });
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let text = r#"{"identifier":"abc","components":{"audioHash":"unavailable"}}"#;
    c.bench_function("normalize_json_text", |b| b.iter(|| normalize(black_box(text))));
    c.bench_function("normalize_malformed", |b| {
        b.iter(|| normalize(black_box("{\"audioHash\": ")))
    });
}

criterion_group!(benches, bench_compare, bench_normalize);
criterion_main!(benches);
