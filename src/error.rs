//! Crate-wide error type.

use thiserror::Error;

/// Every failure mode produced by this crate's supervisor, workers, parser, and
/// hot-reload loader funnels through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument was out of range or otherwise unusable (bad port,
    /// empty path, zero-sized buffer).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An allocation failed. Rust generally aborts rather than returning from an
    /// allocation failure, but the variant is kept so syscall wrappers that observe
    /// `ENOMEM` have somewhere to put it.
    #[error("out of memory")]
    OutOfMemory,

    /// A syscall or filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The parser combinators rejected the input at or above the top-level grammar
    /// production.
    #[error("malformed request")]
    Malformed,

    /// A requested resource does not exist on disk.
    #[error("not found")]
    NotFound,

    /// A URI failed the directory-traversal structural check.
    #[error("forbidden")]
    Forbidden,

    /// A worker slot already has an assigned client.
    #[error("worker busy")]
    Busy,

    /// The hot-reload loader could not resolve every required entry point, or could
    /// not open the backing artifact at all.
    #[error("failed to load processing module: {0}")]
    ModuleLoadFailed(String),

    /// A blocking call was interrupted by a signal (`EINTR`). Callers retry; this
    /// variant should never reach a caller outside the syscall wrapper that raised it.
    #[error("interrupted")]
    Interrupted,
}

impl Error {
    /// True when `err` wraps an `io::Error` with `ErrorKind::Interrupted` or raw
    /// `EINTR`, the two shapes a raw `libc` call can surface it as.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Error::Interrupted => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
