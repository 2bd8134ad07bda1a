//! `[sprite]` section configuration.

use serde::{Deserialize, Serialize};

/// Svg sprite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Id prefix for each stacked symbol (`<prefix>-<stem>`).
    pub prefix: String,

    /// Output file name, written into the source image tree.
    pub file: String,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            prefix: "s".to_string(),
            file: "sprite.svg".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_sprite_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.sprite.prefix, "s");
        assert_eq!(config.sprite.file, "sprite.svg");
    }

    #[test]
    fn test_sprite_override() {
        let config = test_parse_config("[sprite]\nprefix = \"icon\"");
        assert_eq!(config.sprite.prefix, "icon");
    }
}
