//! MIME type lookup by file extension.

/// Returns the MIME type for `filepath` based on its extension, falling back to
/// `application/octet-stream` for unknown or missing extensions. Ported from the
/// predecessor's fixed `get_mime_type` lookup chain.
pub fn mime_type(filepath: &str) -> &'static str {
    let ext = match filepath.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => return "application/octet-stream",
    };

    match ext.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "html" => "text/html",
        "js" => "application/javascript",
        "json" => "application/json",
        "css" => "text/css",
        "png" => "image/png",
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "swf" => "application/x-shockwave-flash",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mime_type_matches_known_extensions() {
        assert_eq!("text/html", mime_type("/index.html"));
        assert_eq!("image/jpeg", mime_type("/photo.JPG"));
    }

    #[test]
    fn mime_type_falls_back_for_unknown_extensions() {
        assert_eq!("application/octet-stream", mime_type("/data.bin"));
        assert_eq!("application/octet-stream", mime_type("/no-extension"));
    }
}
