//! WebSocket server for live reload.
//!
//! Accepts browser connections on a dedicated port and broadcasts
//! [`ReloadMessage`]s pushed by the watcher. Dead clients are dropped on
//! the next broadcast.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Shared handle to the connected browser clients.
#[derive(Clone, Default)]
pub struct Clients {
    inner: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of connected clients.
    pub fn count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Broadcast a message to every connected client, dropping clients
    /// whose sockets have gone away.
    pub fn broadcast(&self, msg: &ReloadMessage) {
        let json = msg.to_json();
        let mut clients = self.inner.lock();
        clients.retain_mut(|ws| ws.send(Message::Text(json.clone().into())).is_ok());
    }

    fn register(&self, mut ws: WebSocket<TcpStream>) {
        // Greet first so the client can verify protocol compatibility
        let hello = ReloadMessage::connected().to_json();
        if ws.send(Message::Text(hello.into())).is_ok() {
            self.inner.lock().push(ws);
        }
    }
}

/// Start the WebSocket server on `base_port` (retrying successive ports
/// when in use). Returns the actually bound port and the shared client
/// handle for broadcasting.
pub fn start(base_port: u16) -> Result<(u16, Clients)> {
    let (listener, actual_port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    let clients = Clients::new();

    let acceptor = clients.clone();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            if crate::core::is_shutdown() {
                break;
            }
            match stream {
                Ok(stream) => match tungstenite::accept(stream) {
                    Ok(ws) => {
                        crate::debug!("reload"; "client connected");
                        acceptor.register(ws);
                    }
                    Err(e) => {
                        crate::debug!("reload"; "handshake failed: {}", e);
                    }
                },
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    Ok((actual_port, clients))
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
