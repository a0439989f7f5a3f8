//! HTTP request/response model, file-serving handlers, and the replaceable
//! processing-module interface those handlers sit behind.

pub mod handlers;
pub mod headers;
pub mod mime;
pub mod processor;
pub mod request;
pub mod response;

pub use headers::{HttpHeader, HttpHeaders};
pub use processor::{BuiltinProcessor, HttpProcessor};
pub use request::HttpRequest;
pub use response::{HttpResponse, FALLBACK_500};
