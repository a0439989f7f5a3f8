//! Representation of the requested HTTP version.

use std::fmt::Display;

/// The version named in a request or response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// HTTP/1.0
    H1_0,
    /// HTTP/1.1
    H1_1,
    /// A version token this server does not speak.
    Unknown,
}

impl Version {
    /// Looks up a version by its exact wire token (`"HTTP/1.0"`, `"HTTP/1.1"`).
    pub fn from_token(token: &[u8]) -> Self {
        match token {
            b"HTTP/1.0" => Version::H1_0,
            b"HTTP/1.1" => Version::H1_1,
            _ => Version::Unknown,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::H1_0 => "HTTP/1.0",
            Self::H1_1 => "HTTP/1.1",
            Self::Unknown => "HTTP/1.1",
        })
    }
}
