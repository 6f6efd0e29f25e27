use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvgate_detect::{Classifier, DetectorConfig, DetectorVariant};
use std::hint::black_box;

const CSV_ROW_COUNTS: &[usize] = &[10, 1_000, 100_000];

fn build_csv(rows: usize) -> Vec<u8> {
    let mut out = String::from("id,name,email,amount,date\n");
    for i in 0..rows {
        out.push_str(&format!(
            "{},User {},user{}@example.com,{}.{:02},2024-01-{:02}\n",
            i,
            i,
            i,
            i * 3,
            i % 100,
            i % 28 + 1
        ));
    }
    out.into_bytes()
}

fn build_json(items: usize) -> Vec<u8> {
    let entries: Vec<String> = (0..items)
        .map(|i| format!(r#"{{"id": {}, "name": "item {}", "tags": ["a", "b"]}}"#, i, i))
        .collect();
    format!("[{}]", entries.join(",\n")).into_bytes()
}

fn build_html() -> Vec<u8> {
    let mut out = String::from("<!DOCTYPE html>\n<html><head><title>Report</title></head><body>\n");
    for i in 0..200 {
        out.push_str(&format!("<p>Paragraph {}, with a comma.</p>\n", i));
    }
    out.push_str("</body></html>\n");
    out.into_bytes()
}

fn build_prose() -> Vec<u8> {
    "The quick brown fox jumps over the lazy dog, twice.\n"
        .repeat(500)
        .into_bytes()
}

fn binary_headers() -> Vec<(&'static str, Vec<u8>)> {
    let mut pdf = b"%PDF-1.7\n".to_vec();
    pdf.extend(std::iter::repeat(0xAB).take(64 * 1024));

    let mut jpeg = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00\x01".to_vec();
    jpeg.extend(std::iter::repeat(0x5A).take(64 * 1024));

    let mut tar = vec![0u8; 1024];
    tar[257..262].copy_from_slice(b"ustar");

    vec![("pdf", pdf), ("jpeg", jpeg), ("tar", tar)]
}

fn bench_csv(c: &mut Criterion) {
    let classifier = Classifier::default();
    let mut group = c.benchmark_group("classify_csv");

    for &rows in CSV_ROW_COUNTS {
        let data = build_csv(rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &data, |b, data| {
            b.iter(|| classifier.classify(black_box(data), Some("bench.csv")))
        });
    }

    group.finish();
}

fn bench_text(c: &mut Criterion) {
    let classifier = Classifier::default();
    let mut group = c.benchmark_group("classify_text");

    let inputs = [
        ("json", build_json(1_000), "data.json"),
        ("html", build_html(), "page.html"),
        ("prose", build_prose(), "notes.txt"),
    ];
    for (name, data, filename) in &inputs {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), data, |b, data| {
            b.iter(|| classifier.classify(black_box(data), Some(*filename)))
        });
    }

    group.finish();
}

fn bench_binary(c: &mut Criterion) {
    let signature = Classifier::default();
    let buffer_probe = Classifier::new(&DetectorConfig {
        variant: DetectorVariant::BufferProbe,
        ..DetectorConfig::default()
    })
    .expect("default config is valid");

    let mut group = c.benchmark_group("classify_binary");
    for (name, data) in binary_headers() {
        group.bench_with_input(BenchmarkId::new("signature", name), &data, |b, data| {
            b.iter(|| signature.classify(black_box(data), Some("upload.bin")))
        });
        group.bench_with_input(BenchmarkId::new("buffer_probe", name), &data, |b, data| {
            b.iter(|| buffer_probe.classify(black_box(data), Some("upload.bin")))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_csv, bench_text, bench_binary);
criterion_main!(benches);
