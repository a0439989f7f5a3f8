//! HTTP status codes and their reason phrases.

use std::fmt::Display;

/// A subset of RFC-registered status codes, restricted to the ones this server's
/// handlers and error paths can produce.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 100
    Continue = 100,
    /// 101
    SwitchingProtocols = 101,
    /// 200
    Ok = 200,
    /// 201
    Created = 201,
    /// 202
    Accepted = 202,
    /// 204
    NoContent = 204,
    /// 301
    MovedPermanently = 301,
    /// 302
    Found = 302,
    /// 304
    NotModified = 304,
    /// 400
    BadRequest = 400,
    /// 401
    Unauthorized = 401,
    /// 403
    Forbidden = 403,
    /// 404
    NotFound = 404,
    /// 405
    MethodNotAllowed = 405,
    /// 408
    RequestTimeout = 408,
    /// 411
    LengthRequired = 411,
    /// 413
    ContentTooLarge = 413,
    /// 414
    UriTooLong = 414,
    /// 415
    UnsupportedMediaType = 415,
    /// 500
    InternalServerError = 500,
    /// 501
    NotImplemented = 501,
    /// 502
    BadGateway = 502,
    /// 503
    ServiceUnavailable = 503,
    /// 504
    GatewayTimeout = 504,
    /// 505
    HttpVersionNotSupported = 505,
    /// 511
    NetworkAuthenticationRequired = 511,
}

impl Status {
    /// The numeric status code, e.g. `404`.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// The reason phrase associated with this status, e.g. `"Not Found"`. Ported
    /// from the fixed lookup table this server's predecessor carried.
    pub fn reason_phrase(self) -> &'static str {
        match self {
            Status::Continue => "Continue",
            Status::SwitchingProtocols => "Switching Protocols",
            Status::Ok => "OK",
            Status::Created => "Created",
            Status::Accepted => "Accepted",
            Status::NoContent => "No Content",
            Status::MovedPermanently => "Moved Permanently",
            Status::Found => "Found",
            Status::NotModified => "Not Modified",
            Status::BadRequest => "Bad Request",
            Status::Unauthorized => "Unauthorized",
            Status::Forbidden => "Forbidden",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::RequestTimeout => "Request Timeout",
            Status::LengthRequired => "Length Required",
            Status::ContentTooLarge => "Content Too Large",
            Status::UriTooLong => "URI Too Long",
            Status::UnsupportedMediaType => "Unsupported Media Type",
            Status::InternalServerError => "Internal Server Error",
            Status::NotImplemented => "Not Implemented",
            Status::BadGateway => "Bad Gateway",
            Status::ServiceUnavailable => "Service Unavailable",
            Status::GatewayTimeout => "Gateway Timeout",
            Status::HttpVersionNotSupported => "HTTP Version Not Supported",
            Status::NetworkAuthenticationRequired => "Network Authentication Required",
        }
    }

    /// Whether a response carrying this status suppresses its body. Mirrors the
    /// predecessor's write-path check exactly: `400 <= status < 511`, which is
    /// an off-by-one against the informal "400 through 511 inclusive" description
    /// elsewhere in this system — `511` itself still writes a body. Preserved
    /// rather than corrected.
    pub fn suppresses_body(self) -> bool {
        let code = self.code();
        (400..511).contains(&code)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} {}", self.code(), self.reason_phrase()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reason_phrase_matches_known_codes() {
        assert_eq!("OK", Status::Ok.reason_phrase());
        assert_eq!("Not Found", Status::NotFound.reason_phrase());
        assert_eq!("Internal Server Error", Status::InternalServerError.reason_phrase());
    }

    #[test]
    fn suppresses_body_excludes_511_itself() {
        assert!(Status::BadRequest.suppresses_body());
        assert!(!Status::Ok.suppresses_body());
        assert!(!Status::NetworkAuthenticationRequired.suppresses_body());
    }

    #[test]
    fn display_writes_code_and_reason() {
        assert_eq!("404 Not Found", Status::NotFound.to_string());
    }
}
