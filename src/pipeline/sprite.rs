//! Svg sprite task: combine `img/svg/*.svg` into one stacked sprite.
//!
//! The sprite is written back into the source image tree as a build-time
//! artifact for template/style authoring (`<img src="img/sprite.svg#s-arrow">`);
//! the images task then ships it like any other source svg.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::config::{Config, PathTable};
use crate::core::Category;
use crate::log;
use crate::utils::fs::write_file;

use super::TaskReport;

/// Stack-mode display rule: only the targeted symbol renders.
const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:inline}";

pub fn run(config: &Config, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(Category::Sprite)?;
    if files.is_empty() {
        log!("sprite"; "no svg sources, skipped");
        return Ok(TaskReport {
            category: Category::Sprite,
            files: 0,
        });
    }

    let sprite = build_sprite(&files, &config.sprite.prefix)?;
    let dest = table.entry(Category::Sprite).dest.join(&config.sprite.file);
    write_file(&dest, sprite)?;

    log!("sprite"; "{} symbol(s) -> {}", files.len(), config.sprite.file);
    Ok(TaskReport {
        category: Category::Sprite,
        files: files.len(),
    })
}

/// Assemble the stacked sprite document.
fn build_sprite(files: &[std::path::PathBuf], prefix: &str) -> Result<String> {
    let mut out = String::from(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n",
    );
    out.push_str(&format!("<style>{STACK_STYLE}</style>\n"));

    for file in files {
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("unrepresentable file name: {}", file.display()))?;
        let content = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let symbol = stacked_symbol(&content, &format!("{prefix}-{stem}"))
            .with_context(|| format!("failed to parse {}", file.display()))?;
        out.push_str(&symbol);
        out.push('\n');
    }

    out.push_str("</svg>\n");
    Ok(out)
}

/// Re-wrap one source document as a stacked symbol with the given id.
fn stacked_symbol(content: &str, id: &str) -> Result<String> {
    let view_box = root_view_box(content)?;
    let inner = root_inner(content)?;

    let mut open = format!("<svg id=\"{id}\"");
    if let Some(vb) = view_box {
        open.push_str(&format!(" viewBox=\"{vb}\""));
    }
    Ok(format!("{open}>{inner}</svg>"))
}

/// viewBox attribute of the root `<svg>` element, if declared.
fn root_view_box(content: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(content);
    loop {
        match reader.read_event().map_err(|e| anyhow!("invalid svg: {e}"))? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"svg" => {
                for attr in e.attributes().with_checks(false).flatten() {
                    if attr.key.as_ref() == b"viewBox" {
                        return Ok(Some(
                            attr.unescape_value()
                                .map_err(|e| anyhow!("invalid viewBox: {e}"))?
                                .into_owned(),
                        ));
                    }
                }
                return Ok(None);
            }
            Event::Eof => return Err(anyhow!("no root <svg> element")),
            _ => {}
        }
    }
}

/// Raw markup between the root `<svg ...>` tag and its closing tag.
fn root_inner(content: &str) -> Result<&str> {
    let open_start = content
        .find("<svg")
        .ok_or_else(|| anyhow!("no root <svg> element"))?;
    let open_end = content[open_start..]
        .find('>')
        .map(|i| open_start + i)
        .ok_or_else(|| anyhow!("unterminated <svg> tag"))?;

    // Self-closing root carries no content
    if content[..open_end].ends_with('/') {
        return Ok("");
    }

    let close = content
        .rfind("</svg>")
        .ok_or_else(|| anyhow!("missing </svg>"))?;
    Ok(content[open_end + 1..close].trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_root_view_box() {
        let svg = r#"<svg viewBox="0 0 24 24" xmlns="x"><path d="M0 0"/></svg>"#;
        assert_eq!(root_view_box(svg).unwrap(), Some("0 0 24 24".to_string()));
        assert_eq!(root_view_box("<svg><g/></svg>").unwrap(), None);
        assert!(root_view_box("<div/>").is_err());
    }

    #[test]
    fn test_root_inner() {
        let svg = r#"<svg viewBox="0 0 1 1"><circle r="1"/></svg>"#;
        assert_eq!(root_inner(svg).unwrap(), r#"<circle r="1"/>"#);
        assert_eq!(root_inner("<svg/>").unwrap(), "");
    }

    #[test]
    fn test_build_sprite_ids_and_order() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("arrow.svg");
        let b = dir.path().join("bell.svg");
        fs::write(&a, r#"<svg viewBox="0 0 10 10"><path d="M0 0"/></svg>"#).unwrap();
        fs::write(&b, r#"<svg><circle r="2"/></svg>"#).unwrap();

        let files: Vec<PathBuf> = vec![a, b];
        let sprite = build_sprite(&files, "s").unwrap();

        assert!(sprite.contains(r#"id="s-arrow""#));
        assert!(sprite.contains(r#"id="s-bell""#));
        assert!(sprite.contains(r#"viewBox="0 0 10 10""#));
        assert!(sprite.contains(":target"));
        let arrow_pos = sprite.find("s-arrow").unwrap();
        let bell_pos = sprite.find("s-bell").unwrap();
        assert!(arrow_pos < bell_pos);
    }
}
