//! Embedded static resources.
//!
//! The live-reload client script is minified at build time (see
//! `build.rs`) and served from memory by the dev server with the actual
//! WebSocket port injected.

mod template;

pub use template::{Template, TemplateVars};

/// URL the dev server serves the live-reload client from.
pub const LIVERELOAD_URL: &str = "/__atelier/livereload.js";

/// Variables for the live-reload client script.
pub struct LivereloadVars {
    pub ws_port: u16,
}

impl TemplateVars for LivereloadVars {
    fn apply(&self, content: &str) -> String {
        content.replace("__ATELIER_WS_PORT__", &self.ws_port.to_string())
    }
}

/// Live-reload client, minified by the build script.
pub const LIVERELOAD_JS: Template<LivereloadVars> =
    Template::new(include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")));

/// Script tag referencing the served client, injected before `</body>`.
pub fn livereload_tag() -> String {
    format!(r#"<script src="{LIVERELOAD_URL}"></script>"#)
}
