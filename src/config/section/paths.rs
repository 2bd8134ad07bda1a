//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "src"      # source tree root, relative to the project root
//! output = "dist"     # output tree root, relative to the project root
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source and output tree roots.
///
/// The per-category layout below these roots is fixed (views/, styles/,
/// js/, vendor/, img/, fonts/); see the path table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source tree root.
    pub source: PathBuf,

    /// Output tree root, wiped and repopulated by every full build.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            output: PathBuf::from("dist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert_eq!(config.paths.output, PathBuf::from("dist"));
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\nsource = \"web\"\noutput = \"public\"");
        assert_eq!(config.paths.source, PathBuf::from("web"));
        assert_eq!(config.paths.output, PathBuf::from("public"));
    }
}
