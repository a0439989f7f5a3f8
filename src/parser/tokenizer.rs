// Copyright 2022 Ryan Seipp
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Splits a raw request buffer into its five logical spans (method, request-uri,
//! version, header block, body) by running the grammar productions over it and
//! noting where each production started and stopped.

use super::combinators::{many, sequence};
use super::grammar::{http_header, http_version, method, request_uri};
use super::primitives::{crlf, sp};

/// Borrowed spans of an unparsed HTTP/1.x request, each referencing the original
/// buffer handed to [`tokenize_http_request`].
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTokens<'a> {
    /// The request-line method token, e.g. `b"GET"`.
    pub method: &'a [u8],
    /// The request-line target, e.g. `b"/index.html"`.
    pub uri: &'a [u8],
    /// The request-line version token, e.g. `b"HTTP/1.1"`.
    pub version: &'a [u8],
    /// The raw header block, one `field-name: field-value\r\n` per line, not yet
    /// split into individual headers.
    pub headers: &'a [u8],
    /// Everything following the header block's terminating CRLF.
    pub body: &'a [u8],
}

/// Tokenizes the request line: `Method SP Request-URI SP HTTP-Version CRLF`.
/// Returns the three spans and the number of bytes consumed (including the
/// trailing CRLF), or `None` if the request line does not match the grammar.
pub fn tokenize_request_line(request: &[u8]) -> Option<(&[u8], &[u8], &[u8], usize)> {
    let method_len = method(request)?;
    let mut pos = method_len;

    let sp1 = many(Box::new(sp), 1, None)(&request[pos..])?;
    pos += sp1;

    let uri_start = pos;
    let uri_len = request_uri(&request[pos..])?;
    pos += uri_len;
    let uri = &request[uri_start..pos];

    let sp2 = many(Box::new(sp), 1, None)(&request[pos..])?;
    pos += sp2;

    let version_start = pos;
    let version_len = http_version(&request[pos..])?;
    pos += version_len;
    let version = &request[version_start..pos];

    let crlf_len = crlf(&request[pos..])?;
    pos += crlf_len;

    Some((&request[..method_len], uri, version, pos))
}

/// Tokenizes the header block following the request line: `*( HTTP-header )`
/// terminated by a lone CRLF. Returns the header-block span (not including the
/// terminating blank line) and total bytes consumed (including it).
pub fn tokenize_headers(request: &[u8]) -> Option<(&[u8], usize)> {
    let headers_len = many(Box::new(http_header), 0, None)(request)?;
    let terminator = crlf(&request[headers_len..])?;
    Some((&request[..headers_len], headers_len + terminator))
}

/// Tokenizes a full HTTP request buffer into its five spans.
pub fn tokenize_http_request(request: &[u8]) -> Option<RequestTokens<'_>> {
    let (method, uri, version, line_len) = tokenize_request_line(request)?;
    let rest = &request[line_len..];
    let (headers, headers_len) = tokenize_headers(rest)?;
    let body = &rest[headers_len..];

    Some(RequestTokens {
        method,
        uri,
        version,
        headers,
        body,
    })
}

/// Used only to exercise `sequence` directly against the request-line grammar in
/// tests; production code uses the span-tracking variant above.
#[cfg(test)]
fn request_line_matches(request: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(method),
        Box::new(many(Box::new(sp), 1, None)),
        Box::new(request_uri),
        Box::new(many(Box::new(sp), 1, None)),
        Box::new(http_version),
        Box::new(crlf),
    ])(request)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tokenize_request_line_splits_method_uri_version() {
        let (method, uri, version, consumed) =
            tokenize_request_line(b"GET /index.html HTTP/1.1\r\nHost: x\r\n").unwrap();
        assert_eq!(b"GET", method);
        assert_eq!(b"/index.html", uri);
        assert_eq!(b"HTTP/1.1", version);
        assert_eq!(b"GET /index.html HTTP/1.1\r\n".len(), consumed);
    }

    #[test]
    fn tokenize_request_line_rejects_missing_crlf() {
        assert_eq!(None, tokenize_request_line(b"GET / HTTP/1.1"));
    }

    #[test]
    fn request_line_matches_whole_sequence() {
        assert_eq!(
            Some(26),
            request_line_matches(b"GET /index.html HTTP/1.1\r\n")
        );
    }

    #[test]
    fn tokenize_headers_stops_at_blank_line() {
        let (headers, consumed) =
            tokenize_headers(b"Host: x\r\nContent-Length: 0\r\n\r\nbody-follows").unwrap();
        assert_eq!(b"Host: x\r\nContent-Length: 0\r\n", headers);
        assert_eq!(b"Host: x\r\nContent-Length: 0\r\n\r\n".len(), consumed);
    }

    #[test]
    fn tokenize_http_request_splits_all_five_spans() {
        let raw = b"POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let tokens = tokenize_http_request(raw).unwrap();
        assert_eq!(b"POST", tokens.method);
        assert_eq!(b"/upload", tokens.uri);
        assert_eq!(b"HTTP/1.1", tokens.version);
        assert_eq!(b"Content-Length: 5\r\n", tokens.headers);
        assert_eq!(b"hello", tokens.body);
    }
}
