//! Live Reload Message Protocol
//!
//! Defines the JSON message format for WebSocket communication between
//! the development server and browser clients.
//!
//! # Message Types
//!
//! - `reload`: Trigger full page reload
//! - `css`: Inject updated CSS (no reload, no layout flash)
//! - `ping`/`pong`: Keep connection alive

use serde::{Deserialize, Serialize};

/// Live reload message sent over WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Full page reload
    Reload {
        /// Optional reason for reload
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// CSS-only update (fast path - the page swaps the stylesheet in place)
    Css {
        /// Stylesheet href fragment the client should match
        target: String,
        /// New CSS content
        content: String,
    },

    /// Keep-alive ping (server → client)
    Ping {
        /// Timestamp for latency measurement
        ts: u64,
    },

    /// Keep-alive pong (client → server)
    Pong {
        /// Echo back the timestamp
        ts: u64,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl ReloadMessage {
    /// Create a reload message
    pub fn reload() -> Self {
        Self::Reload { reason: None }
    }

    /// Create a reload message with reason
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    /// Create a css hot-swap message
    pub fn css(target: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Css {
            target: target.into(),
            content: content.into(),
        }
    }

    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create a ping message
    pub fn ping() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self::Ping { ts }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_message() {
        let msg = ReloadMessage::reload_with_reason("views changed");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"reload""#));
        assert!(json.contains(r#""reason":"views changed""#));
    }

    #[test]
    fn test_reload_without_reason_omits_field() {
        let json = ReloadMessage::reload().to_json();
        assert!(!json.contains("reason"));
    }

    #[test]
    fn test_css_round_trip() {
        let msg = ReloadMessage::css("main.css", "body{color:red}");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"css""#));

        let parsed = ReloadMessage::from_json(&json).unwrap();
        match parsed {
            ReloadMessage::Css { target, content } => {
                assert_eq!(target, "main.css");
                assert_eq!(content, "body{color:red}");
            }
            _ => panic!("Expected Css message"),
        }
    }

    #[test]
    fn test_connected_carries_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}
