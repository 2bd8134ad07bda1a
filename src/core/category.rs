//! Asset categories.

use std::fmt;

/// One asset category: a source glob set, a destination directory and a
/// transformation chain of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// HTML documents with include directives (`views/*.html`).
    Templates,
    /// Sass entry point compiled to a stylesheet.
    Styles,
    /// Script entry point.
    Scripts,
    /// Pre-built third-party files, copied verbatim.
    Vendor,
    /// Raster and vector images, recompressed in production.
    Images,
    /// Images carrying the webp marker suffix, converted to WebP.
    Webp,
    /// Font files, copied verbatim.
    Fonts,
    /// Stacked svg sprite assembled back into the source image tree.
    Sprite,
}

impl Category {
    /// Every category, in the order the orchestration runs them.
    pub const ALL: [Category; 8] = [
        Category::Templates,
        Category::Styles,
        Category::Scripts,
        Category::Vendor,
        Category::Images,
        Category::Webp,
        Category::Fonts,
        Category::Sprite,
    ];

    /// The categories a full build fans out to. The sprite task is not
    /// among them: it writes into the source image tree (which the
    /// images task reads) and is invoked ad hoc instead.
    pub const BUILD_SET: [Category; 7] = [
        Category::Templates,
        Category::Styles,
        Category::Scripts,
        Category::Vendor,
        Category::Images,
        Category::Webp,
        Category::Fonts,
    ];

    /// Short name used for CLI selection and log prefixes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Templates => "views",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Vendor => "vendor",
            Self::Images => "images",
            Self::Webp => "webp",
            Self::Fonts => "fonts",
            Self::Sprite => "sprite",
        }
    }

    /// Parse a category name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
        assert_eq!(Category::from_name("unknown"), None);
    }
}
