//! Configuration section definitions.

mod images;
mod paths;
mod scripts;
mod serve;
mod sprite;
mod styles;

pub use images::ImagesConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use sprite::SpriteConfig;
pub use styles::{StylesConfig, TargetsConfig};
