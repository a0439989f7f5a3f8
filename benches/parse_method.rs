use std::str::from_utf8;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use foreman::parser::grammar::method;

const METHODS: [&[u8]; 4] = [b"GET", b"HEAD", b"POST", b"OPTIONS"];

fn benchmark(c: &mut Criterion) {
    for input in METHODS {
        c.bench_with_input(
            BenchmarkId::new("method", from_utf8(input).unwrap()),
            black_box(input),
            |b, i| {
                b.iter(|| method(black_box(i)));
            },
        );
    }
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
