//! Development server with live reload support.
//!
//! Serves the output tree over HTTP, starts the WebSocket reload
//! channel and the filesystem watcher, and keeps running until the
//! process is terminated.

mod debounce;
mod response;
mod watch;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tiny_http::{Request, Server};

use crate::config::{Config, cfg};
use crate::core::{is_shutdown, register_server};
use crate::reload::{self, Clients};
use crate::{embed, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Start serving the output tree. Blocks until process termination.
pub fn serve(config: Arc<Config>) -> Result<()> {
    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, _shutdown_rx) = crossbeam::channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    let ws_port = if config.serve.notify {
        let (port, clients) = reload::start(config.serve.ws_port)?;
        crate::debug!("reload"; "ws://localhost:{}", port);
        let _watcher = watch::spawn(Arc::clone(&config), clients);
        Some(port)
    } else {
        // Rebuild on change without pushing notifications
        let _watcher = watch::spawn(Arc::clone(&config), Clients::new());
        None
    };

    log!("serve"; "http://{}", addr);
    run_request_loop(&server, ws_port);
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(
    interface: std::net::IpAddr,
    base_port: u16,
) -> Result<(Server, SocketAddr)> {
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to bind after {} attempts (ports {}-{}): {}",
                    MAX_PORT_RETRIES,
                    base_port,
                    port,
                    e
                ));
            }
        }
    }
    unreachable!()
}

fn run_request_loop(server: &Server, ws_port: Option<u16>) {
    // Use thread pool to handle requests concurrently so a slow response
    // does not block the rest of the page's assets
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        pool.spawn(move || {
            let config = cfg();
            if let Err(e) = handle_request(request, &config, ws_port) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &Config, ws_port: Option<u16>) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    // Serve the live-reload client from memory
    if let Some(port) = ws_port
        && request.url() == embed::LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    let output_dir = config.output_dir();
    match resolve_path(request.url(), &output_dir) {
        Some(path) => response::respond_file(request, &path, ws_port.is_some()),
        None => response::respond_not_found(request, &output_dir, ws_port.is_some()),
    }
}

/// Map a request url to a file below the output tree.
///
/// Rejects traversal segments; directories resolve to their index.html.
fn resolve_path(url: &str, output_dir: &Path) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("/");

    let mut resolved = output_dir.to_path_buf();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ => resolved.push(segment),
        }
    }

    if resolved.is_dir() {
        resolved.push("index.html");
    }
    resolved.is_file().then_some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_root_to_index() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();

        let path = resolve_path("/", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("index.html"));
    }

    #[test]
    fn test_resolve_nested_file_with_query() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("styles")).unwrap();
        fs::write(dir.path().join("styles/main.css"), "body{}").unwrap();

        let path = resolve_path("/styles/main.css?v=2", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("styles/main.css"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_path("/../secret.txt", dir.path()), None);
        assert_eq!(resolve_path("/a/../../b", dir.path()), None);
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_path("/nope.html", dir.path()), None);
    }
}
