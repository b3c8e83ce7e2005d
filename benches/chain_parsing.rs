//! Benchmarks for request parsing
//!
//! Tests performance of turning request paths into validated action chains.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ih_engine::estimate_jpeg_quality;
use ih_pipeline::{parse_request, ImageProcessor, PROCESS_QUERY_KEY};
use std::collections::HashMap;
use std::io::Cursor;

const CHAINS: &[(&str, &str)] = &[
    ("single", "image/resize,w_100"),
    (
        "typical",
        "image/resize,m_fill,w_300,h_200/quality,q_80/format,webp",
    ),
    (
        "long",
        "image/resize,w_800,limit_0/crop,x_10,y_10,w_600,h_400,g_center/rotate,90/bright,20/contrast,-10/sharpen,100/rounded-corners,r_30/quality,Q_75/format,jpg",
    ),
];

fn bench_parse_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_query");
    for (name, chain) in CHAINS {
        let query = HashMap::from([(PROCESS_QUERY_KEY.to_string(), chain.to_string())]);
        group.bench_with_input(BenchmarkId::from_parameter(name), &query, |b, query| {
            b.iter(|| parse_request(black_box("/photos/2024/cat.jpg"), black_box(query)))
        });
    }
    group.finish();
}

fn bench_parse_path(c: &mut Criterion) {
    let empty = HashMap::new();
    let mut group = c.benchmark_group("parse_path");
    for (name, chain) in CHAINS {
        let path = format!("/photos/2024/cat%20one.jpg/@{chain}");
        group.bench_with_input(BenchmarkId::from_parameter(name), &path, |b, path| {
            b.iter(|| parse_request(black_box(path), black_box(&empty)))
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let processor = ImageProcessor::builtin();
    let empty = HashMap::new();
    let mut group = c.benchmark_group("validate_chain");
    for (name, chain) in CHAINS {
        let parsed = parse_request(&format!("/a.jpg/@{chain}"), &empty).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &parsed, |b, parsed| {
            b.iter(|| processor.validate(black_box(&parsed.actions)))
        });
    }
    group.finish();
}

fn bench_estimate_quality(c: &mut Criterion) {
    let img = image::DynamicImage::new_rgb8(64, 64);
    let mut buf = Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 82)
        .encode_image(&img)
        .unwrap();
    let jpeg = buf.into_inner();

    c.bench_function("estimate_jpeg_quality", |b| {
        b.iter(|| estimate_jpeg_quality(black_box(&jpeg)))
    });
}

criterion_group!(
    benches,
    bench_parse_query,
    bench_parse_path,
    bench_validate,
    bench_estimate_quality
);
criterion_main!(benches);
