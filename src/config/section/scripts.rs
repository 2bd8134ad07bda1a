//! `[scripts]` section configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Script pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Script entry point, relative to the source root.
    pub entry: PathBuf,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("js/index.js"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_scripts_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.scripts.entry, PathBuf::from("js/index.js"));
    }

    #[test]
    fn test_scripts_override() {
        let config = test_parse_config("[scripts]\nentry = \"js/app.js\"");
        assert_eq!(config.scripts.entry, PathBuf::from("js/app.js"));
    }
}
