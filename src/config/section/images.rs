//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! jpeg_quality = 80           # lossy target for production jpeg re-encoding
//! webp_quality = 90
//! webp_alpha_quality = 90
//! webp_marker = "_webp"       # filename suffix selecting webp conversion sources
//! ```

use serde::{Deserialize, Serialize};

/// Image optimization settings.
///
/// All of these only take effect in production mode; development copies
/// images through unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// JPEG re-encoding quality (1-100).
    pub jpeg_quality: u8,

    /// WebP quality target. The encoder in use is lossless, so this is
    /// recorded for tooling parity only.
    pub webp_quality: u8,

    /// WebP alpha channel quality target (see `webp_quality`).
    pub webp_alpha_quality: u8,

    /// Filename stem suffix marking webp conversion sources
    /// (`hero_webp.png` -> `hero.webp`).
    pub webp_marker: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            webp_quality: 90,
            webp_alpha_quality: 90,
            webp_marker: "_webp".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_images_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.images.jpeg_quality, 80);
        assert_eq!(config.images.webp_quality, 90);
        assert_eq!(config.images.webp_marker, "_webp");
    }

    #[test]
    fn test_images_override() {
        let config = test_parse_config("[images]\njpeg_quality = 60\nwebp_marker = \"-webp\"");
        assert_eq!(config.images.jpeg_quality, 60);
        assert_eq!(config.images.webp_marker, "-webp");
    }
}
