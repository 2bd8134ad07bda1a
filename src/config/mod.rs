//! Configuration management for `atelier.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[paths]`   | Source and output tree roots                    |
//! | `[serve]`   | Development server (port, interface, notify)    |
//! | `[styles]`  | Sass entry point and browser support matrix     |
//! | `[scripts]` | Script entry point                              |
//! | `[images]`  | Optimization qualities and the webp marker      |
//! | `[sprite]`  | Svg sprite id prefix and file name              |
//!
//! Every section is optional; missing sections take defaults that match
//! the conventional `src/` -> `dist/` layout.

pub mod section;
mod table;

pub use section::{
    ImagesConfig, PathsConfig, ScriptsConfig, ServeConfig, SpriteConfig, StylesConfig,
    TargetsConfig,
};
pub use table::{PathEntry, PathTable};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

/// Configuration load failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration structure representing atelier.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root directory - parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source and output roots
    pub paths: PathsConfig,

    /// Development server settings
    pub serve: ServeConfig,

    /// Stylesheet pipeline settings
    pub styles: StylesConfig,

    /// Script pipeline settings
    pub scripts: ScriptsConfig,

    /// Image optimization settings
    pub images: ImagesConfig,

    /// Svg sprite settings
    pub sprite: SpriteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            paths: PathsConfig::default(),
            serve: ServeConfig::default(),
            styles: StylesConfig::default(),
            scripts: ScriptsConfig::default(),
            images: ImagesConfig::default(),
            sprite: SpriteConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the given config file path.
    ///
    /// A missing file is not an error: the conventional defaults apply
    /// and the project root is the current directory. The project root
    /// of an existing file is its parent directory.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let mut config = if config_path.exists() {
            Self::from_path(config_path)?
        } else {
            Self::default()
        };

        config.root = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // The marker is spliced into glob patterns, so keep it to plain
        // filename characters.
        let marker = &self.images.webp_marker;
        if marker.is_empty()
            || !marker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Invalid(format!(
                "images.webp_marker must be non-empty alphanumeric/_/- (got {marker:?})"
            )));
        }

        if self.images.jpeg_quality == 0 || self.images.jpeg_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "images.jpeg_quality must be 1-100 (got {})",
                self.images.jpeg_quality
            )));
        }

        for entry in [&self.styles.entry, &self.scripts.entry] {
            if entry.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "entry points must be relative to the source root (got {})",
                    entry.display()
                )));
            }
        }
        Ok(())
    }

    /// Absolute source tree root.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.paths.source)
    }

    /// Absolute output tree root.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.paths.output)
    }

    /// Compiled path table for this configuration.
    pub fn path_table(&self) -> PathTable {
        PathTable::new(self)
    }
}

// ============================================================================
// Global handle
// ============================================================================

static CONFIG: OnceLock<ArcSwap<Config>> = OnceLock::new();

/// Install the global configuration and return a handle to it.
pub fn init_config(config: Config) -> Arc<Config> {
    let arc = Arc::new(config);
    let swap = CONFIG.get_or_init(|| ArcSwap::from(Arc::clone(&arc)));
    swap.store(Arc::clone(&arc));
    arc
}

/// Get the global configuration.
///
/// Panics if `init_config` has not run; the CLI entry point installs the
/// configuration before anything else touches it.
pub fn cfg() -> Arc<Config> {
    CONFIG
        .get()
        .expect("config not initialized")
        .load_full()
}

// ============================================================================
// Test support
// ============================================================================

/// Parse a toml snippet into a Config rooted at the current directory.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let mut config: Config = toml::from_str(content).expect("test config parses");
    config.root = PathBuf::from(".");
    config
}
