//! Request dispatch: GET/HEAD/POST file serving, plus POST's body persistence.

use std::fs;

use crate::parser::{Method, Status};
use crate::store::KeyValueStore;

use super::mime::mime_type;
use super::request::HttpRequest;
use super::response::HttpResponse;

/// Dispatches `request` to the handler for its method, optionally persisting a
/// POST body into `store`. `store` is `None` when no key/value store has been
/// configured; POST then behaves exactly like GET.
pub fn process(request: &HttpRequest, store: Option<&KeyValueStore>) -> HttpResponse {
    match request.method {
        Method::Get => handle_get(request),
        Method::Head => handle_head(request),
        Method::Post => handle_post(request, store),
        Method::Unknown => HttpResponse::with_status(request.version, Status::InternalServerError),
    }
}

/// Serves a file out of `request.public_dir`, enforcing [`HttpRequest::uri_is_valid`]
/// and setting `Content-Type`/`Content-Length` from the file that was read (or
/// `0` on any failure path, mirroring the predecessor's "remake Content-Length
/// unconditionally, even on error" behavior).
fn handle_get(request: &HttpRequest) -> HttpResponse {
    if !request.uri_is_valid() {
        return finish(HttpResponse::with_status(request.version, Status::Forbidden), None);
    }

    let filepath = format!("{}{}", request.public_dir, request.uri);

    let body = match fs::read(&filepath) {
        Ok(body) => body,
        Err(_) => return finish(HttpResponse::with_status(request.version, Status::NotFound), None),
    };

    let mut response = HttpResponse::with_status(request.version, Status::Ok);
    response.headers.set("Content-Type", mime_type(&filepath));
    finish(response, Some(body))
}

fn handle_head(request: &HttpRequest) -> HttpResponse {
    let mut response = handle_get(request);
    response.body.clear();
    response
}

/// Behaves like GET and, when the request carries a non-empty body, persists
/// `(uri -> body)` into `store`. This extends the predecessor's `handle_post`,
/// which was a bare alias for `handle_get` with no persistence at all — see
/// DESIGN.md.
fn handle_post(request: &HttpRequest, store: Option<&KeyValueStore>) -> HttpResponse {
    if let (Some(store), false) = (store, request.body.is_empty()) {
        let _ = store.put(&request.uri, &request.body);
    }
    handle_get(request)
}

fn finish(mut response: HttpResponse, body: Option<Vec<u8>>) -> HttpResponse {
    let body_len = body.as_ref().map(Vec::len).unwrap_or(0);
    response.body = body.unwrap_or_default();
    response.headers.set("Content-Length", body_len.to_string());
    response
}
