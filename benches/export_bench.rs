//! Export throughput benchmarks.
//!
//! Measures flattening search documents into rows and serialising the rows
//! to CSV, plus the webplayer message encoding of the same result set.
//!
//! # Groups
//!
//! | Group | What it measures |
//! |-------|-----------------|
//! | `flatten` | Rows/s for document flattening at 10k/100k documents |
//! | `csv` | Rows/s for flatten + CSV serialisation at 10k/100k documents |
//! | `message` | Documents/s for webplayer message encoding |
//!
//! # Viewing results
//!
//! ```sh
//! cargo bench --bench export_bench
//! open target/criterion/report/index.html
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use searchui_core::config::ExportConfig;
use searchui_core::export::{flatten_documents, CsvExportSpec};
use searchui_core::message::encode_message;
use searchui_core::SearchDocument;
use std::hint::black_box;

/// `n` documents with an id, a title, and a three-valued tag field.
fn documents(n: usize) -> Vec<SearchDocument> {
    (0..n)
        .map(|i| {
            let mut doc = SearchDocument::default();
            doc.fields.insert(".id".into(), vec![i.to_string()]);
            doc.fields.insert("id".into(), vec![i.to_string()]);
            doc.fields
                .insert("title".into(), vec![format!("Document \"{i}\", part; one")]);
            doc.fields.insert(
                "tags".into(),
                vec!["alpha".into(), "beta".into(), "gamma".into()],
            );
            doc
        })
        .collect()
}

const COUNTS: [usize; 2] = [10_000, 100_000];

// ---------------------------------------------------------------------------
// Flatten
// ---------------------------------------------------------------------------

fn flatten_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    for n in COUNTS {
        let docs = documents(n);
        group.throughput(Throughput::Elements((n * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &docs, |b, docs| {
            b.iter(|| black_box(flatten_documents(docs, ".id", "id")).len());
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv");
    let cfg = ExportConfig::default();
    for n in COUNTS {
        let docs = documents(n);
        group.throughput(Throughput::Elements((n * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &docs, |b, docs| {
            b.iter(|| {
                let spec = CsvExportSpec::from_documents(docs, "bench", &cfg);
                black_box(spec.to_csv().ok().flatten().map(|s| s.len()))
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Webplayer message
// ---------------------------------------------------------------------------

fn message_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("message");
    for n in COUNTS {
        let docs = documents(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &docs, |b, docs| {
            b.iter(|| black_box(encode_message("bench", docs, "title")).len());
        });
    }
    group.finish();
}

criterion_group!(benches, flatten_bench, csv_bench, message_bench);
criterion_main!(benches);
