//! Templates task: include resolution and production reference rewrite.
//!
//! Root documents live in `views/`; fragments anywhere below the source
//! root can be pulled in with an include directive on its own line:
//!
//! ```html
//! <!--= partials/header.html -->
//! //= partials/footer.html
//! ```
//!
//! Paths resolve relative to the including file and nest recursively.
//! In production the compiled documents additionally have references to
//! the style/script entry outputs rewritten to their `.min` variants.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::config::{Config, PathTable};
use crate::core::{Category, Mode};
use crate::log;
use crate::utils::fs::{rel_display, write_file};

use super::TaskReport;

/// Include nesting limit, guards against directive cycles.
const MAX_INCLUDE_DEPTH: usize = 16;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:<!--=\s*(?<html>\S+)\s*-->|//=\s*(?<line>\S+))\s*$")
        .expect("valid directive pattern")
});

pub fn run(mode: Mode, config: &Config, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(Category::Templates)?;
    let mut count = 0;

    for file in &files {
        let rendered = render(file, mode, config)
            .with_context(|| rel_display(file, table.source_root()))?;
        let dest = table.dest_for(Category::Templates, file)?;
        write_file(&dest, rendered)?;
        count += 1;
    }

    log!("views"; "{} file(s)", count);
    Ok(TaskReport {
        category: Category::Templates,
        files: count,
    })
}

/// Compile one root document.
fn render(path: &Path, mode: Mode, config: &Config) -> Result<String> {
    let content = resolve_includes(path, 0)?;
    Ok(if mode.is_production() {
        rewrite_entry_refs(content, config)
    } else {
        content
    })
}

/// Inline include directives, recursively.
fn resolve_includes(path: &Path, depth: usize) -> Result<String> {
    if depth > MAX_INCLUDE_DEPTH {
        bail!(
            "include depth exceeded at {} (directive cycle?)",
            path.display()
        );
    }

    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        match parse_directive(line) {
            Some(include) => {
                let target = dir.join(include);
                let inlined = resolve_includes(&target, depth + 1)
                    .with_context(|| format!("included from {}", path.display()))?;
                out.push_str(inlined.trim_end_matches('\n'));
                out.push('\n');
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

/// Parse an include directive line, returning the referenced path.
fn parse_directive(line: &str) -> Option<&str> {
    let captures = DIRECTIVE.captures(line)?;
    captures
        .name("html")
        .or_else(|| captures.name("line"))
        .map(|m| m.as_str())
}

/// Rewrite references to the development style/script outputs into their
/// minified names.
fn rewrite_entry_refs(content: String, config: &Config) -> String {
    let mut out = content;
    let pairs = [
        rewrite_pair(&config.styles.entry, "css"),
        rewrite_pair(&config.scripts.entry, "js"),
    ];
    for (from, to) in pairs.into_iter().flatten() {
        out = out.replace(&from, &to);
    }
    out
}

/// `(main.css, main.min.css)` for an entry point and output extension.
fn rewrite_pair(entry: &Path, ext: &str) -> Option<(String, String)> {
    let stem = entry.file_stem()?.to_str()?;
    Some((format!("{stem}.{ext}"), format!("{stem}.min.{ext}")))
}
