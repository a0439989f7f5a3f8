//! HTTP response model and wire serialization.

use crate::parser::{Status, Version};

use super::headers::HttpHeaders;
use super::request::HttpRequest;

/// A literal, always-valid fallback response, used when response synthesis
/// itself fails. Matches the predecessor's hardcoded emergency string exactly.
pub const FALLBACK_500: &str = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n";

/// A response awaiting serialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Version echoed onto the status line.
    pub version: Version,
    /// Response status.
    pub status: Status,
    /// Response headers in wire order.
    pub headers: HttpHeaders,
    /// Response body. Ignored on write for HEAD requests and for statuses in
    /// `400..511` (see [`Status::suppresses_body`]).
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response carrying only a status line and headers, no body.
    pub fn with_status(version: Version, status: Status) -> Self {
        Self {
            version,
            status,
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    /// Serializes the response onto the wire: status line, headers, a blank
    /// line, then the body unless `request`'s method is HEAD or this response's
    /// status suppresses a body.
    pub fn write(&self, request: &HttpRequest) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.extend_from_slice(
            format!("{} {} {}\r\n", self.version, self.status.code(), self.status.reason_phrase())
                .as_bytes(),
        );

        for header in self.headers.iter() {
            buf.extend_from_slice(format!("{}: {}\r\n", header.key, header.value).as_bytes());
        }

        buf.extend_from_slice(b"\r\n");

        if request.method != crate::parser::Method::Head && !self.status.suppresses_body() {
            buf.extend_from_slice(&self.body);
        }

        buf
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Method;

    fn request_with_method(method: Method) -> HttpRequest {
        let mut req = HttpRequest::new("./public");
        req.method = method;
        req.version = Version::H1_1;
        req
    }

    #[test]
    fn write_includes_status_line_headers_and_body() {
        let mut resp = HttpResponse::with_status(Version::H1_1, Status::Ok);
        resp.headers.add("Content-Length", "5");
        resp.body = b"hello".to_vec();
        let bytes = resp.write(&request_with_method(Method::Get));
        assert_eq!(
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello".as_slice(),
            bytes.as_slice()
        );
    }

    #[test]
    fn write_omits_body_for_head_requests() {
        let mut resp = HttpResponse::with_status(Version::H1_1, Status::Ok);
        resp.body = b"hello".to_vec();
        let bytes = resp.write(&request_with_method(Method::Head));
        assert!(!bytes.ends_with(b"hello"));
    }

    #[test]
    fn write_omits_body_for_error_statuses() {
        let mut resp = HttpResponse::with_status(Version::H1_1, Status::NotFound);
        resp.body = b"should not appear".to_vec();
        let bytes = resp.write(&request_with_method(Method::Get));
        assert!(!bytes.ends_with(b"should not appear"));
    }
}
