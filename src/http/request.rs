//! HTTP request model and parsing.

use crate::error::{Error, Result};
use crate::parser::tokenizer::tokenize_http_request;
use crate::parser::{Method, Version};

use super::headers::HttpHeaders;

/// A parsed HTTP request, scoped to the public directory it will be resolved
/// against.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Root directory GET/HEAD/POST targets are resolved relative to.
    pub public_dir: String,
    /// The request method.
    pub method: Method,
    /// The request target, rewritten from a bare `/` to `/index.html`.
    pub uri: String,
    /// The request's declared HTTP version.
    pub version: Version,
    /// Request headers in wire order.
    pub headers: HttpHeaders,
    /// The request body, empty for methods that don't carry one.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates an empty request scoped to `public_dir`.
    pub fn new(public_dir: impl Into<String>) -> Self {
        Self {
            public_dir: public_dir.into(),
            method: Method::Unknown,
            uri: String::new(),
            version: Version::Unknown,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    /// Parses `raw` (the bytes read off the client socket) into `self`,
    /// overwriting any previous contents. A bare `/` target is rewritten to
    /// `/index.html`.
    pub fn parse(&mut self, raw: &[u8]) -> Result<()> {
        let tokens = tokenize_http_request(raw).ok_or(Error::Malformed)?;

        self.method = Method::from_token(tokens.method);
        self.version = Version::from_token(tokens.version);
        self.uri = if tokens.uri == b"/" {
            "/index.html".to_string()
        } else {
            String::from_utf8_lossy(tokens.uri).into_owned()
        };

        self.headers = HttpHeaders::new();
        for line in split_header_lines(tokens.headers) {
            if let Some((key, value)) = line.split_once(": ") {
                self.headers.add(key, value);
            }
        }

        self.body = tokens.body.to_vec();

        Ok(())
    }

    /// Structural directory-traversal check over `self.uri`: walks `/`-delimited
    /// segments, incrementing a running counter for each non-`".."` segment and
    /// decrementing it for each `".."`. Invalid as soon as the counter ever drops
    /// below zero, not merely at the end of the walk — `/a/../b` stays at or
    /// above zero throughout and is accepted, while `/../x` and `/a/../../x` dip
    /// below zero mid-walk and are rejected even though later segments would
    /// otherwise balance the count back out.
    pub fn uri_is_valid(&self) -> bool {
        let mut net_traversals: i64 = 0;
        for segment in self.uri.split('/').filter(|s| !s.is_empty()) {
            net_traversals += if segment != ".." { 1 } else { -1 };
            if net_traversals < 0 {
                return false;
            }
        }
        true
    }
}

fn split_header_lines(block: &[u8]) -> impl Iterator<Item = &str> {
    std::str::from_utf8(block)
        .unwrap_or("")
        .split("\r\n")
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_splits_method_uri_version_headers_body() {
        let mut req = HttpRequest::new("./public");
        req.parse(b"GET /index.html HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(Method::Get, req.method);
        assert_eq!("/index.html", req.uri);
        assert_eq!(Version::H1_1, req.version);
        assert_eq!(Some("x"), req.headers.get("Host"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn parse_rewrites_bare_slash_to_index() {
        let mut req = HttpRequest::new("./public");
        req.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!("/index.html", req.uri);
    }

    #[test]
    fn parse_captures_post_body() {
        let mut req = HttpRequest::new("./public");
        req.parse(b"POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello")
            .unwrap();
        assert_eq!(b"hello", req.body.as_slice());
    }

    #[test]
    fn parse_rejects_malformed_request_line() {
        let mut req = HttpRequest::new("./public");
        assert!(req.parse(b"not a request\r\n\r\n").is_err());
    }

    #[test]
    fn uri_is_valid_accepts_internal_backtrack() {
        let mut req = HttpRequest::new("./public");
        req.uri = "/a/../b".to_string();
        assert!(req.uri_is_valid());
    }

    #[test]
    fn uri_is_valid_rejects_unbalanced_backtrack() {
        let mut req = HttpRequest::new("./public");
        req.uri = "/../../x".to_string();
        assert!(!req.uri_is_valid());
    }

    #[test]
    fn uri_is_valid_rejects_traversal_that_dips_negative_before_recovering() {
        // A later segment balancing the count back to zero doesn't excuse
        // climbing above the root first.
        let mut req = HttpRequest::new("./public");
        req.uri = "/../x".to_string();
        assert!(!req.uri_is_valid());
    }
}
