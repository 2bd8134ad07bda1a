//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! entry = "styles/main.scss"  # Sass entry point, relative to the source root
//!
//! [styles.targets]
//! ie = 9                      # minimum supported major versions
//! safari = 9
//! ```

use std::path::PathBuf;

use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

/// Stylesheet pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Sass entry point, relative to the source root. Partials pulled in
    /// via `@use`/`@import` resolve relative to this file.
    pub entry: PathBuf,

    /// Browser support matrix driving vendor prefixing.
    pub targets: TargetsConfig,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("styles/main.scss"),
            targets: TargetsConfig::default(),
        }
    }
}

/// Minimum supported major browser versions.
///
/// A field left unset means the browser is not part of the support
/// matrix and no prefixes are generated for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub android: Option<u16>,
    pub chrome: Option<u16>,
    pub edge: Option<u16>,
    pub firefox: Option<u16>,
    pub ie: Option<u16>,
    pub ios_saf: Option<u16>,
    pub opera: Option<u16>,
    pub safari: Option<u16>,
    pub samsung: Option<u16>,
}

impl Default for TargetsConfig {
    /// Wide legacy matrix, down to IE 7.
    fn default() -> Self {
        Self {
            android: Some(4),
            chrome: Some(30),
            edge: Some(12),
            firefox: Some(30),
            ie: Some(7),
            ios_saf: Some(7),
            opera: Some(20),
            safari: Some(7),
            samsung: Some(4),
        }
    }
}

impl TargetsConfig {
    /// Convert to the css transformer's browser targets (versions are
    /// encoded as `major << 16`).
    pub fn to_browsers(&self) -> Browsers {
        let v = |major: Option<u16>| major.map(|m| (m as u32) << 16);
        Browsers {
            android: v(self.android),
            chrome: v(self.chrome),
            edge: v(self.edge),
            firefox: v(self.firefox),
            ie: v(self.ie),
            ios_saf: v(self.ios_saf),
            opera: v(self.opera),
            safari: v(self.safari),
            samsung: v(self.samsung),
            ..Browsers::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_styles_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.styles.entry, PathBuf::from("styles/main.scss"));
        assert_eq!(config.styles.targets.ie, Some(7));
    }

    #[test]
    fn test_styles_targets_override() {
        let config = test_parse_config("[styles.targets]\nie = 11\nchrome = 90");
        assert_eq!(config.styles.targets.ie, Some(11));
        assert_eq!(config.styles.targets.chrome, Some(90));
        // untouched fields keep defaults
        assert_eq!(config.styles.targets.safari, Some(7));
    }

    #[test]
    fn test_to_browsers_encoding() {
        let config = test_parse_config("[styles.targets]\nie = 9");
        let browsers = config.styles.targets.to_browsers();
        assert_eq!(browsers.ie, Some(9 << 16));
    }
}
