//! Live reload channel: message protocol and WebSocket server.

mod message;
mod server;

pub use message::ReloadMessage;
pub use server::{Clients, start};
