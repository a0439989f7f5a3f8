//! End-to-end scenarios from the specification's testable-properties section,
//! driven directly against [`BuiltinProcessor`] rather than through a live
//! supervisor/worker pair — the fork/fd-transfer machinery is exercised by
//! `src/supervisor.rs` and `src/worker.rs`'s own unit tests, which can poke at
//! real file descriptors without needing a second process on the wire.

use std::fs;
use std::io::Write;

use foreman::http::{BuiltinProcessor, HttpProcessor};
use foreman::store::KeyValueStore;

struct ScratchDir(std::path::PathBuf);

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn public_dir(name: &str) -> (ScratchDir, String) {
    let dir = std::env::temp_dir().join(format!(
        "foreman-scenarios-{name}-{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    (ScratchDir(dir.clone()), dir.to_str().unwrap().to_string())
}

#[test]
fn happy_get_serves_index_html() {
    let (_dir, public) = public_dir("happy-get");
    fs::File::create(format!("{public}/index.html"))
        .unwrap()
        .write_all(b"hi")
        .unwrap();

    let processor = BuiltinProcessor;
    let response = processor.handle(&public, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", None);

    assert_eq!(
        b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 2\r\n\r\nhi".as_slice(),
        response.as_slice()
    );
}

#[test]
fn directory_traversal_get_is_forbidden() {
    let (_dir, public) = public_dir("traversal");
    let processor = BuiltinProcessor;
    let response = processor.handle(&public, b"GET /../etc/passwd HTTP/1.1\r\n\r\n", None);
    let text = String::from_utf8_lossy(&response);

    assert!(text.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    assert!(text.contains("Content-Length: 0\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[test]
fn missing_file_get_is_not_found() {
    let (_dir, public) = public_dir("missing");
    let processor = BuiltinProcessor;
    let response = processor.handle(&public, b"GET /nope HTTP/1.1\r\n\r\n", None);

    assert!(response.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    assert!(response.ends_with(b"\r\n\r\n"));
}

#[test]
fn head_omits_body_but_reports_its_length() {
    let (_dir, public) = public_dir("head");
    fs::File::create(format!("{public}/index.html"))
        .unwrap()
        .write_all(b"hi")
        .unwrap();

    let processor = BuiltinProcessor;
    let response = processor.handle(&public, b"HEAD /index.html HTTP/1.1\r\n\r\n", None);
    let text = String::from_utf8_lossy(&response);

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Length: 2\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[test]
fn post_persists_body_and_serves_get_semantics() {
    let (_dir, public) = public_dir("post");
    let store_path = std::env::temp_dir().join(format!(
        "foreman-scenarios-post-store-{}",
        std::process::id()
    ));
    let _ = fs::remove_file(&store_path);
    let store = KeyValueStore::open(&store_path).unwrap();

    let processor = BuiltinProcessor;
    let response = processor.handle(
        &public,
        b"POST /k HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
        Some(&store),
    );

    // "./public/k" doesn't exist, so GET-semantics fall through to 404.
    assert!(response.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(Some(b"hello".to_vec()), store.get("/k"));

    let _ = fs::remove_file(&store_path);
}

#[test]
fn unknown_method_is_internal_server_error() {
    let (_dir, public) = public_dir("unknown-method");
    let processor = BuiltinProcessor;
    let response = processor.handle(&public, b"PATCH / HTTP/1.1\r\n\r\n", None);
    assert!(response.starts_with(b"HTTP/1.1 500 Internal Server Error\r\n"));
}

#[test]
fn malformed_request_line_falls_back_to_the_literal_500() {
    let processor = BuiltinProcessor;
    let response = processor.handle("./public", b"not a request at all", None);
    assert_eq!(foreman::http::FALLBACK_500.as_bytes(), response.as_slice());
}
