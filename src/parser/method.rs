//! Representation of the requested HTTP method.

use std::fmt::Display;

/// The method named in a request line. Only GET, HEAD, and POST are handled by
/// [`crate::http::handlers`]; everything else parses as `Unknown` and is answered
/// with `500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Retrieve a resource.
    Get,
    /// Retrieve a resource's headers without its body.
    Head,
    /// Submit a body, persisting it against the request URI.
    Post,
    /// Any method token this server does not implement a handler for.
    Unknown,
}

impl Method {
    /// Looks up a method by its exact wire token (`"GET"`, `"HEAD"`, `"POST"`).
    /// Anything else, including a present-but-unsupported method token, maps to
    /// [`Method::Unknown`].
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"GET" => Method::Get,
            b"HEAD" => Method::Head,
            b"POST" => Method::Post,
            _ => Method::Unknown,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Unknown => "UNKNOWN",
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_token_recognizes_supported_methods() {
        assert_eq!(Method::Get, Method::from_token(b"GET"));
        assert_eq!(Method::Head, Method::from_token(b"HEAD"));
        assert_eq!(Method::Post, Method::from_token(b"POST"));
    }

    #[test]
    fn from_token_falls_back_to_unknown() {
        assert_eq!(Method::Unknown, Method::from_token(b"PATCH"));
    }
}
