//! Benchmark – `csvmodem::CsvParser` over varying chunk sizes.
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use csvmodem::{CsvEvent, CsvParser, ParserOptions};

/// Produce a deterministic CSV document of `rows` lines. Every fourth field
/// is quoted and contains an embedded delimiter, so quote handling shows up
/// in every measurement, and every eighth row is a comment.
fn make_csv_payload(rows: usize) -> String {
    let mut s = String::with_capacity(rows * 32);
    for row in 0..rows {
        if row % 8 == 7 {
            s.push_str("# periodic checkpoint comment\n");
            continue;
        }
        for col in 0..6 {
            if col > 0 {
                s.push(',');
            }
            if col % 4 == 3 {
                s.push_str("\"quoted, field\"");
            } else {
                s.push_str("value");
            }
        }
        s.push('\n');
    }
    s
}

/// Parse the whole payload at the given chunk size and return the event
/// count so Criterion can black-box the work.
fn run_parser(payload: &[u8], chunk_size: usize) -> usize {
    let parser = CsvParser::new(
        payload,
        ParserOptions {
            chunk_size,
            ..Default::default()
        },
    )
    .expect("options are valid");

    let mut produced = 0usize;
    let mut fields = 0usize;
    for event in parser {
        match event.expect("payload is well formed") {
            CsvEvent::Field { .. } => {
                produced += 1;
                fields += 1;
            }
            _ => produced += 1,
        }
    }
    assert!(fields > 0);
    produced
}

fn bench_parse_throughput(c: &mut Criterion) {
    let payload = make_csv_payload(4_000);
    let bytes = payload.as_bytes();

    let mut group = c.benchmark_group("parse_chunked");
    for &chunk_size in &[16usize, 256, 4_096, 65_536] {
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &chunk_size,
            |b, &size| {
                b.iter(|| {
                    let count = run_parser(black_box(bytes), size);
                    black_box(count);
                });
            },
        );
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(5))
            .measurement_time(Duration::from_secs(10));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_parse_throughput }
criterion_main!(benches);
