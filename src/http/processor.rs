//! The replaceable unit of HTTP request handling.
//!
//! A processing module is conceptually six entry points —
//! `request_init`/`request_parse`/`request_process`/`response_write`/
//! `request_destroy`/`response_destroy` — chained together to turn a raw
//! request buffer into a raw response buffer. [`HttpProcessor`] is the safe-Rust
//! shape of that whole chain: either this crate's own implementation
//! ([`BuiltinProcessor`]) or a hot-reloaded shared object
//! ([`crate::loader::LoadedModule`]) can sit behind it, and the supervisor's
//! call sites don't change when the loader swaps one for the other.

use crate::store::KeyValueStore;

use super::handlers;
use super::request::HttpRequest;
use super::response::FALLBACK_500;

/// Turns a raw request buffer into a raw response buffer.
pub trait HttpProcessor: Send {
    /// Runs `request_init` + `request_parse` + `request_process` +
    /// `response_write` (+ the matching `*_destroy` calls) over `raw`, scoped to
    /// `public_dir`. Never fails outwardly: a malformed request or any internal
    /// error yields the literal [`FALLBACK_500`] response instead of an `Err`,
    /// matching this server's policy of always emitting *something* well-formed
    /// back to the client.
    fn handle(&self, public_dir: &str, raw: &[u8], store: Option<&KeyValueStore>) -> Vec<u8>;
}

/// The statically-linked processor used before any hot-reloadable module has
/// ever been loaded, and whenever the configured library path does not exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProcessor;

impl HttpProcessor for BuiltinProcessor {
    fn handle(&self, public_dir: &str, raw: &[u8], store: Option<&KeyValueStore>) -> Vec<u8> {
        let mut request = HttpRequest::new(public_dir);
        if request.parse(raw).is_err() {
            return FALLBACK_500.as_bytes().to_vec();
        }

        let response = handlers::process(&request, store);
        response.write(&request)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_processor_serves_index_rewrite_as_404_without_a_public_dir() {
        let processor = BuiltinProcessor;
        let bytes = processor.handle("./nonexistent-public-dir", b"GET / HTTP/1.1\r\n\r\n", None);
        assert!(bytes.starts_with(b"HTTP/1.1 404"));
    }

    #[test]
    fn builtin_processor_falls_back_to_500_on_malformed_request() {
        let processor = BuiltinProcessor;
        let bytes = processor.handle("./public", b"not a request", None);
        assert_eq!(FALLBACK_500.as_bytes(), bytes.as_slice());
    }
}
