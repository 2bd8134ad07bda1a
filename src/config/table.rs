//! The path table: category -> source globs, destination, watch globs.
//!
//! Every task derives its inputs and outputs from this table; nothing
//! else in the pipeline hardcodes a path. Changing the asset layout
//! means changing this table and nothing else.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::core::Category;
use crate::utils::fs::walk_files;

use super::Config;

/// Routing priority for watcher events. Narrow matchers come before the
/// broad ones (webp before images, everything before the `**/*.html`
/// templates watch).
const ROUTE_ORDER: [Category; 7] = [
    Category::Webp,
    Category::Styles,
    Category::Scripts,
    Category::Vendor,
    Category::Fonts,
    Category::Images,
    Category::Templates,
];

/// How a category's source files are selected.
enum Sources {
    /// A single entry file (styles, scripts).
    Entry(PathBuf),
    /// Glob matchers applied to the whole source tree.
    Globs(GlobSet),
}

/// One category's paths.
pub struct PathEntry {
    pub category: Category,
    sources: Sources,
    excludes: Option<GlobSet>,
    /// Directory (relative to the source root) stripped from a source
    /// path when computing its destination.
    base: &'static str,
    /// Absolute destination directory.
    pub dest: PathBuf,
    watch: Option<GlobSet>,
}

/// Compiled lookup from category to paths.
pub struct PathTable {
    source_root: PathBuf,
    entries: Vec<PathEntry>,
}

impl PathTable {
    pub fn new(config: &Config) -> Self {
        let source = config.source_dir();
        let output = config.output_dir();
        let marker = &config.images.webp_marker;

        let webp_glob = format!("img/**/*{marker}.{{jpg,jpeg,png}}");
        let webp_exclude = format!("img/**/*{marker}.*");

        let entries = vec![
            PathEntry {
                category: Category::Templates,
                sources: Sources::Globs(glob_set(&["views/*.html"])),
                excludes: None,
                base: "views",
                dest: output.clone(),
                watch: Some(glob_set(&["**/*.html"])),
            },
            PathEntry {
                category: Category::Styles,
                sources: Sources::Entry(source.join(&config.styles.entry)),
                excludes: None,
                base: "styles",
                dest: output.join("styles"),
                watch: Some(glob_set(&["styles/**/*.scss"])),
            },
            PathEntry {
                category: Category::Scripts,
                sources: Sources::Entry(source.join(&config.scripts.entry)),
                excludes: None,
                base: "js",
                dest: output.join("js"),
                watch: Some(glob_set(&["js/**/*.js"])),
            },
            PathEntry {
                category: Category::Vendor,
                sources: Sources::Globs(glob_set(&["vendor/**"])),
                excludes: None,
                base: "vendor",
                dest: output.join("vendor"),
                watch: Some(glob_set(&["vendor/**"])),
            },
            PathEntry {
                category: Category::Images,
                sources: Sources::Globs(glob_set(&[
                    "img/**/*.{jpg,jpeg,png,gif,svg,ico}",
                    "img/icons/**",
                ])),
                excludes: Some(glob_set(&["img/favicon.*", &webp_exclude])),
                base: "img",
                dest: output.join("img"),
                watch: Some(glob_set(&["img/**/*.{jpg,jpeg,png,gif,svg}"])),
            },
            PathEntry {
                category: Category::Webp,
                sources: Sources::Globs(glob_set(&[&webp_glob])),
                excludes: None,
                base: "img",
                dest: output.join("img"),
                watch: Some(glob_set(&[&webp_glob])),
            },
            PathEntry {
                category: Category::Fonts,
                sources: Sources::Globs(glob_set(&["fonts/**/*.{ttf,otf,woff,woff2}"])),
                excludes: None,
                base: "fonts",
                dest: output.join("fonts"),
                watch: Some(glob_set(&["fonts/**/*.{ttf,otf,woff,woff2}"])),
            },
            // The sprite is a build-time artifact written back into the
            // source image tree, not shipped by this task. Not watched:
            // its output would retrigger the images watch.
            PathEntry {
                category: Category::Sprite,
                sources: Sources::Globs(glob_set(&["img/svg/*.svg"])),
                excludes: None,
                base: "img/svg",
                dest: source.join("img"),
                watch: None,
            },
        ];

        Self {
            source_root: source,
            entries,
        }
    }

    /// Absolute source tree root.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Look up a category's paths.
    pub fn entry(&self, category: Category) -> &PathEntry {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .expect("every category has a table entry")
    }

    /// Collect the source files for a category, sorted.
    ///
    /// Entry-file categories (styles, scripts) fail when the entry is
    /// missing; glob categories return an empty list for an absent tree.
    pub fn source_files(&self, category: Category) -> Result<Vec<PathBuf>> {
        let entry = self.entry(category);
        match &entry.sources {
            Sources::Entry(path) => {
                if !path.is_file() {
                    return Err(anyhow!("entry point {} not found", path.display()));
                }
                Ok(vec![path.clone()])
            }
            Sources::Globs(set) => {
                let mut matched = Vec::new();
                for file in walk_files(&self.source_root)? {
                    let Ok(rel) = file.strip_prefix(&self.source_root) else {
                        continue;
                    };
                    if !set.is_match(rel) {
                        continue;
                    }
                    if let Some(excludes) = &entry.excludes
                        && excludes.is_match(rel)
                    {
                        continue;
                    }
                    matched.push(file);
                }
                Ok(matched)
            }
        }
    }

    /// Destination path for a category source file: the source path
    /// relative to the category base, re-rooted at the destination.
    pub fn dest_for(&self, category: Category, source: &Path) -> Result<PathBuf> {
        let entry = self.entry(category);
        let rel = source
            .strip_prefix(&self.source_root)
            .with_context(|| format!("{} is outside the source tree", source.display()))?;
        let rel = rel.strip_prefix(entry.base).unwrap_or(rel);
        Ok(entry.dest.join(rel))
    }

    /// Route a changed file to the category whose watch glob matches it.
    pub fn category_for_change(&self, path: &Path) -> Option<Category> {
        let rel = path.strip_prefix(&self.source_root).ok()?;
        ROUTE_ORDER.iter().copied().find(|&category| {
            self.entry(category)
                .watch
                .as_ref()
                .is_some_and(|set| set.is_match(rel))
        })
    }
}

/// Compile a fixed pattern list. The patterns are table constants (plus
/// the validated webp marker), so failure is a programming error.
fn glob_set(patterns: &[&str]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).expect("valid glob pattern"));
    }
    builder.build().expect("valid glob set")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::fs;
    use tempfile::TempDir;

    fn table_in(dir: &Path) -> PathTable {
        let mut config = test_parse_config("");
        config.root = dir.to_path_buf();
        PathTable::new(&config)
    }

    #[test]
    fn test_dest_for_strips_base() {
        let dir = TempDir::new().unwrap();
        let table = table_in(dir.path());
        let src = dir.path().join("src/img/icons/arrow.png");

        let dest = table.dest_for(Category::Images, &src).unwrap();
        assert_eq!(dest, dir.path().join("dist/img/icons/arrow.png"));
    }

    #[test]
    fn test_templates_dest_is_output_root() {
        let dir = TempDir::new().unwrap();
        let table = table_in(dir.path());
        let src = dir.path().join("src/views/index.html");

        let dest = table.dest_for(Category::Templates, &src).unwrap();
        assert_eq!(dest, dir.path().join("dist/index.html"));
    }

    #[test]
    fn test_sprite_dest_in_source_tree() {
        let dir = TempDir::new().unwrap();
        let table = table_in(dir.path());
        assert_eq!(
            table.entry(Category::Sprite).dest,
            dir.path().join("src/img")
        );
    }

    #[test]
    fn test_source_files_respects_excludes() {
        let dir = TempDir::new().unwrap();
        let img = dir.path().join("src/img");
        fs::create_dir_all(&img).unwrap();
        fs::write(img.join("logo.png"), "").unwrap();
        fs::write(img.join("favicon.png"), "").unwrap();
        fs::write(img.join("hero_webp.png"), "").unwrap();

        let table = table_in(dir.path());
        let files = table.source_files(Category::Images).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["logo.png"]);

        let webp = table.source_files(Category::Webp).unwrap();
        assert_eq!(webp.len(), 1);
        assert!(webp[0].ends_with("hero_webp.png"));
    }

    #[test]
    fn test_icons_matched_regardless_of_extension() {
        let dir = TempDir::new().unwrap();
        let icons = dir.path().join("src/img/icons");
        fs::create_dir_all(&icons).unwrap();
        fs::write(icons.join("cursor.cur"), "").unwrap();

        let table = table_in(dir.path());
        let files = table.source_files(Category::Images).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_entry_point_errors() {
        let dir = TempDir::new().unwrap();
        let table = table_in(dir.path());
        assert!(table.source_files(Category::Styles).is_err());
    }

    #[test]
    fn test_change_routing() {
        let dir = TempDir::new().unwrap();
        let table = table_in(dir.path());
        let src = dir.path().join("src");

        assert_eq!(
            table.category_for_change(&src.join("styles/base/_mixins.scss")),
            Some(Category::Styles)
        );
        assert_eq!(
            table.category_for_change(&src.join("views/partials/header.html")),
            Some(Category::Templates)
        );
        // webp marker wins over the images watch
        assert_eq!(
            table.category_for_change(&src.join("img/hero_webp.png")),
            Some(Category::Webp)
        );
        assert_eq!(
            table.category_for_change(&src.join("img/hero.png")),
            Some(Category::Images)
        );
        // vendor html is vendor, not templates
        assert_eq!(
            table.category_for_change(&src.join("vendor/lib/widget.html")),
            Some(Category::Vendor)
        );
        assert_eq!(table.category_for_change(&src.join("README.md")), None);
    }
}
