//! HTTP response handlers.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tiny_http::{Header, Request, Response, StatusCode};

use crate::embed;
use crate::utils::mime;

/// Respond with a static file, injecting the live-reload client tag into
/// HTML documents when the reload channel is active.
pub fn respond_file(request: Request, path: &Path, reload_active: bool) -> Result<()> {
    let content_type = mime::from_path(path);

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = if reload_active && mime::is_html(content_type) {
        inject_livereload(&body)
    } else {
        body
    };

    send_body(request, 200, content_type, body)
}

/// Respond with 404 (custom `404.html` from the output tree when present).
pub fn respond_not_found(request: Request, output_dir: &Path, reload_active: bool) -> Result<()> {
    use mime::types::{HTML, PLAIN};

    let custom = output_dir.join("404.html");
    if custom.is_file()
        && let Ok(body) = fs::read(&custom)
    {
        let body = if reload_active {
            inject_livereload(&body)
        } else {
            body
        };
        return send_body(request, 404, HTML, body);
    }

    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with the live-reload client script from memory.
pub fn respond_livereload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = embed::LIVERELOAD_JS.render(&embed::LivereloadVars { ws_port });
    send_body(
        request,
        200,
        mime::types::JAVASCRIPT,
        body.into_bytes(),
    )
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(
        request,
        503,
        mime::types::PLAIN,
        b"503 Service Unavailable".to_vec(),
    )
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).expect("static header is valid")
}

/// Inject the live-reload script tag before `</body>`.
fn inject_livereload(content: &[u8]) -> Vec<u8> {
    let tag = embed::livereload_tag();
    let tag_bytes = tag.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    if let Some(pos) = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        let mut result = Vec::with_capacity(content.len() + tag_bytes.len());
        result.extend_from_slice(&content[..pos]);
        result.extend_from_slice(tag_bytes);
        result.extend_from_slice(&content[pos..]);
        return result;
    }

    // No </body> found, append to end (browsers handle this gracefully)
    let mut result = Vec::with_capacity(content.len() + tag_bytes.len());
    result.extend_from_slice(content);
    result.extend_from_slice(tag_bytes);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>hi</p></body></html>";
        let out = inject_livereload(html);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(&format!(
            "<script src=\"{}\"></script></body>",
            embed::LIVERELOAD_URL
        )));
    }

    #[test]
    fn test_inject_case_insensitive() {
        let html = b"<HTML><BODY></BODY></HTML>";
        let out = String::from_utf8(inject_livereload(html)).unwrap();
        assert!(out.contains("livereload"));
    }

    #[test]
    fn test_inject_appends_without_body() {
        let html = b"<p>fragment</p>";
        let out = String::from_utf8(inject_livereload(html)).unwrap();
        assert!(out.ends_with("</script>"));
    }
}
