//! Per-category transform tasks and their orchestration.
//!
//! A full build is clean -> every category task fanned out on the rayon
//! pool -> aggregate failure report. Categories share no mutable state
//! and write to disjoint destination subtrees, so no ordering holds
//! between them; only clean is sequenced strictly first.

pub mod fonts;
pub mod images;
pub mod scripts;
pub mod sprite;
pub mod styles;
pub mod templates;
pub mod vendor;
pub mod webp;


use anyhow::{Result, bail};
use rayon::prelude::*;

use crate::config::{Config, PathTable};
use crate::core::{Category, Mode};
use crate::log;
use crate::utils::fs::{clean_dir, copy_file};

/// What a task run produced.
pub struct TaskReport {
    pub category: Category,
    pub files: usize,
}

/// Wipe the output tree. Must complete before any category task writes;
/// the orchestration sequences it, no locking involved.
pub fn clean(config: &Config) -> Result<()> {
    let output = config.output_dir();
    log!("clean"; "{}", output.display());
    clean_dir(&output)
}

/// Run a single category task.
pub fn run_task(
    category: Category,
    mode: Mode,
    config: &Config,
    table: &PathTable,
) -> Result<TaskReport> {
    match category {
        Category::Templates => templates::run(mode, config, table),
        Category::Styles => styles::run(mode, config, table),
        Category::Scripts => scripts::run(mode, table),
        Category::Vendor => vendor::run(table),
        Category::Images => images::run(mode, config, table),
        Category::Webp => webp::run(config, table),
        Category::Fonts => fonts::run(table),
        Category::Sprite => sprite::run(config, table),
    }
}

/// Full orchestration run: clean, then every category in parallel.
///
/// All tasks run to completion even when some fail; the first failure
/// count is reported so a one-shot build exits nonzero.
pub fn build(mode: Mode, config: &Config) -> Result<()> {
    let table = config.path_table();
    clean(config)?;

    let results: Vec<(Category, Result<TaskReport>)> = Category::BUILD_SET
        .par_iter()
        .map(|&category| (category, run_task(category, mode, config, &table)))
        .collect();

    let mut failed = 0;
    for (category, result) in results {
        if let Err(e) = result {
            failed += 1;
            log!("error"; "{category}: {e:#}");
        }
    }
    if failed > 0 {
        bail!("{failed} task(s) failed");
    }

    log!("build"; "done ({})", mode.label());
    Ok(())
}

/// Ad-hoc single-category run (no clean, no server).
pub fn run_single(category: Category, mode: Mode, config: &Config) -> Result<TaskReport> {
    let table = config.path_table();
    run_task(category, mode, config, &table)
}

/// Byte-for-byte copy of a category's sources into its destination.
fn passthrough(category: Category, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(category)?;
    for file in &files {
        let dest = table.dest_for(category, file)?;
        copy_file(file, &dest)?;
    }

    log!(category.name(); "{} file(s)", files.len());
    Ok(TaskReport {
        category,
        files: files.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_passthrough_preserves_bytes() {
        let dir = TempDir::new().unwrap();
        let fonts = dir.path().join("src/fonts");
        fs::create_dir_all(&fonts).unwrap();
        let payload = b"\x00\x01binary font bytes\xff";
        fs::write(fonts.join("body.woff2"), payload).unwrap();

        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();
        let table = config.path_table();

        let report = passthrough(Category::Fonts, &table).unwrap();
        assert_eq!(report.files, 1);
        let copied = fs::read(dir.path().join("dist/fonts/body.woff2")).unwrap();
        assert_eq!(copied, payload);
    }

    #[test]
    fn test_passthrough_empty_tree() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.root = dir.path().to_path_buf();
        let table = config.path_table();

        let report = passthrough(Category::Vendor, &table).unwrap();
        assert_eq!(report.files, 0);
    }
}
