//! Styles task: Sass -> grouped media queries -> vendor prefixes ->
//! minify (production) or source map (development).

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::Targets;
use lightningcss::traits::ToCss;
use parcel_sourcemap::SourceMap;

use crate::config::{Config, PathTable};
use crate::core::{Category, Mode};
use crate::log;
use crate::utils::fs::write_file;

use super::TaskReport;

/// Subdirectory (below the styles destination) for development maps.
const MAP_DIR: &str = "maps";

/// A compiled stylesheet ready to be written.
pub struct CompiledStyles {
    /// Output file name (`main.css` or `main.min.css`).
    pub file_name: String,
    pub css: String,
    /// Source map JSON, development mode only.
    pub map: Option<String>,
}

pub fn run(mode: Mode, config: &Config, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(Category::Styles)?;
    let dest = &table.entry(Category::Styles).dest;
    let mut count = 0;

    for entry in &files {
        let compiled = compile(entry, mode, config)?;
        write_file(&dest.join(&compiled.file_name), &compiled.css)?;
        if let Some(map) = &compiled.map {
            write_file(
                &dest.join(MAP_DIR).join(format!("{}.map", compiled.file_name)),
                map,
            )?;
        }
        count += 1;
    }

    log!("styles"; "{} file(s)", count);
    Ok(TaskReport {
        category: Category::Styles,
        files: count,
    })
}

/// Output file name for the given entry and mode.
pub fn output_name(entry: &Path, mode: Mode) -> String {
    let stem = entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("main");
    if mode.is_production() {
        format!("{stem}.min.css")
    } else {
        format!("{stem}.css")
    }
}

/// Run the full style chain on one entry point.
pub fn compile(entry: &Path, mode: Mode, config: &Config) -> Result<CompiledStyles> {
    let css = grass::from_path(entry, &grass::Options::default())
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("sass compilation of {}", entry.display()))?;

    let mut sheet = StyleSheet::parse(&css, ParserOptions::default())
        .map_err(|e| anyhow!("{e}"))?;

    group_media_rules(&mut sheet.rules.0);

    sheet
        .minify(MinifyOptions {
            targets: targets(config),
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let file_name = output_name(entry, mode);

    if mode.is_production() {
        let result = sheet
            .to_css(PrinterOptions {
                minify: true,
                targets: targets(config),
                ..PrinterOptions::default()
            })
            .map_err(|e| anyhow!("{e}"))?;
        return Ok(CompiledStyles {
            file_name,
            css: result.code,
            map: None,
        });
    }

    let mut source_map = SourceMap::new("/");
    source_map.add_source(&entry.display().to_string());
    let _ = source_map.set_source_content(0, &css);

    let result = sheet
        .to_css(PrinterOptions {
            source_map: Some(&mut source_map),
            targets: targets(config),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let map = source_map.to_json(None).map_err(|e| anyhow!("{e}"))?;
    let css = format!(
        "{}\n/*# sourceMappingURL={MAP_DIR}/{file_name}.map */\n",
        result.code
    );

    Ok(CompiledStyles {
        file_name,
        css,
        map: Some(map),
    })
}

fn targets(config: &Config) -> Targets {
    Targets {
        browsers: Some(config.styles.targets.to_browsers()),
        ..Targets::default()
    }
}

/// Merge `@media` rules with identical queries, appending the merged
/// blocks after the plain rules in first-seen order. Scattered blocks
/// for the same breakpoint collapse into one.
fn group_media_rules<'i>(rules: &mut Vec<CssRule<'i>>) {
    let mut grouped: Vec<CssRule<'i>> = Vec::with_capacity(rules.len());
    let mut media: Vec<(String, CssRule<'i>)> = Vec::new();

    for rule in rules.drain(..) {
        match rule {
            CssRule::Media(m) => {
                let key = m
                    .query
                    .to_css_string(PrinterOptions::default())
                    .unwrap_or_default();
                if let Some((_, CssRule::Media(existing))) =
                    media.iter_mut().find(|(k, _)| *k == key)
                {
                    existing.rules.0.extend(m.rules.0);
                } else {
                    media.push((key, CssRule::Media(m)));
                }
            }
            other => grouped.push(other),
        }
    }

    grouped.extend(media.into_iter().map(|(_, rule)| rule));
    *rules = grouped;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_entry(dir: &TempDir, content: &str) -> PathBuf {
        let entry = dir.path().join("main.scss");
        fs::write(&entry, content).unwrap();
        entry
    }

    #[test]
    fn test_output_name() {
        let entry = PathBuf::from("styles/main.scss");
        assert_eq!(output_name(&entry, Mode::Development), "main.css");
        assert_eq!(output_name(&entry, Mode::Production), "main.min.css");
    }

    #[test]
    fn test_compile_development_emits_map() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(&dir, "$c: #fff;\nbody { color: $c; }\n");
        let config = test_parse_config("");

        let out = compile(&entry, Mode::Development, &config).unwrap();
        assert_eq!(out.file_name, "main.css");
        assert!(out.map.is_some());
        assert!(out.css.contains("sourceMappingURL=maps/main.css.map"));
        assert!(out.css.contains("color"));
    }

    #[test]
    fn test_compile_production_minifies_without_map() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(&dir, "body { color: #ffffff; }\n");
        let config = test_parse_config("");

        let out = compile(&entry, Mode::Production, &config).unwrap();
        assert_eq!(out.file_name, "main.min.css");
        assert!(out.map.is_none());
        assert!(!out.css.contains("sourceMappingURL"));
        // minified output has no spaces around the declaration
        assert!(out.css.contains("body{"));
    }

    #[test]
    fn test_media_queries_merged() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(
            &dir,
            "@media (min-width: 600px) { .a { color: red; } }\n\
             .b { color: blue; }\n\
             @media (min-width: 600px) { .c { color: green; } }\n",
        );
        let config = test_parse_config("");

        let out = compile(&entry, Mode::Development, &config).unwrap();
        let occurrences = out.css.matches("min-width").count();
        assert_eq!(occurrences, 1, "media blocks not merged:\n{}", out.css);
    }

    #[test]
    fn test_compile_error_surfaces() {
        let dir = TempDir::new().unwrap();
        let entry = write_entry(&dir, "body { color: $undefined; }\n");
        let config = test_parse_config("");

        assert!(compile(&entry, Mode::Development, &config).is_err());
    }
}
