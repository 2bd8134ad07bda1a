//! Scripts task: oxc parse, minify (production) or source map
//! (development).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::PathTable;
use crate::core::{Category, Mode};
use crate::log;
use crate::utils::fs::write_file;

use super::TaskReport;

/// A processed script ready to be written.
pub struct CompiledScripts {
    /// Output file name (`index.js` or `index.min.js`).
    pub file_name: String,
    pub code: String,
    /// `(file name, JSON)` of the external source map, development only.
    pub map: Option<(String, String)>,
}

pub fn run(mode: Mode, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(Category::Scripts)?;
    let dest = &table.entry(Category::Scripts).dest;
    let mut count = 0;

    for entry in &files {
        let compiled = compile(entry, mode)?;
        write_file(&dest.join(&compiled.file_name), &compiled.code)?;
        if let Some((map_name, map)) = &compiled.map {
            write_file(&dest.join(map_name), map)?;
        }
        count += 1;
    }

    log!("scripts"; "{} file(s)", count);
    Ok(TaskReport {
        category: Category::Scripts,
        files: count,
    })
}

/// Output file name for the given entry and mode.
pub fn output_name(entry: &Path, mode: Mode) -> String {
    let stem = entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("index");
    if mode.is_production() {
        format!("{stem}.min.js")
    } else {
        format!("{stem}.js")
    }
}

/// Process one entry point.
pub fn compile(entry: &Path, mode: Mode) -> Result<CompiledScripts> {
    let source = fs::read_to_string(entry)
        .with_context(|| format!("failed to read {}", entry.display()))?;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, &source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        bail!("{} failed to parse: {:?}", entry.display(), ret.errors);
    }
    let mut program = ret.program;

    let file_name = output_name(entry, mode);

    if mode.is_production() {
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let minified = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(minified.scoping)
            .build(&program)
            .code;
        return Ok(CompiledScripts {
            file_name,
            code,
            map: None,
        });
    }

    let map_name = format!("{file_name}.map");
    let ret = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: Some(PathBuf::from(&file_name)),
            ..CodegenOptions::default()
        })
        .build(&program);

    let mut code = ret.code;
    let map = ret.map.map(|m| (map_name.clone(), m.to_json_string()));
    if map.is_some() {
        code.push_str(&format!("//# sourceMappingURL={map_name}\n"));
    }

    Ok(CompiledScripts {
        file_name,
        code,
        map,
    })
}
