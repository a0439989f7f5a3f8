#![no_main]

use foreman::http::HttpRequest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut request = HttpRequest::new("./public");
    let _ = request.parse(data);
});
