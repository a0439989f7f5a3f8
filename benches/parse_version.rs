use std::str::from_utf8;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foreman::parser::grammar::http_version;

const VERSIONS: [&[u8]; 2] = [b"HTTP/1.1", b"HTTP/1.0"];

fn benchmark(c: &mut Criterion) {
    for input in VERSIONS {
        c.bench_with_input(
            BenchmarkId::new("version", from_utf8(input).unwrap()),
            black_box(input),
            |b, i| {
                b.iter(|| http_version(black_box(i)));
            },
        );
    }
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
