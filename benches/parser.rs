use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use foreman::parser::tokenizer::tokenize_http_request;

const REQ: &[u8] = b"\
GET /api/v1.0/weather/forecast HTTP/1.1\r\n\
Host: www.example.org\r\n\r\n";

const REQ_MED: &[u8] = b"\
GET /api/v1.0/weather/forecast HTTP/1.1\r\n\
Accept: */*\r\n\
Accept-Encoding: gzip,deflate,br\r\n\
Accept-Language: en-US,en;q=0.5\r\n\
Cache-Control: no-cache\r\n\
Connection: keep-alive\r\n\
Host: www.example.org\r\n\
Pragma: no-cache\r\n\
Referer: https://www.example.org\r\n\
User-Agent: Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/109.0\r\n\r\n";

const REQ_POST: &[u8] = b"POST /upload HTTP/1.1\r\n\
Host: www.example.org\r\n\
Content-Type: application/x-www-form-urlencoded\r\n\
Content-Length: 11\r\n\r\n\
hello=world";

fn benchmark(c: &mut Criterion) {
    let inputs = [REQ, REQ_MED, REQ_POST];

    let mut group = c.benchmark_group("parse");
    for &input in inputs.iter() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokenize_http_request", input.len()), input, |b, i| {
            b.iter(|| tokenize_http_request(i));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
