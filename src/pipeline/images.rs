//! Images task: format-specific recompression in production, verbatim
//! copy in development.
//!
//! Production chain by extension:
//! - png: lossless re-encode at best compression
//! - jpg/jpeg: lossy re-encode at the configured quality
//! - gif: frame-preserving re-encode
//! - svg: structural cleanup (comments, empty attributes, whitespace
//!   text, attribute-less groups) keeping viewBox, namespaces,
//!   stroke/fill and ids intact
//! - anything else (ico, cursors under img/icons/): verbatim copy

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{AnimationDecoder, DynamicImage};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use rayon::prelude::*;

use crate::config::{Config, PathTable};
use crate::core::{Category, Mode};
use crate::log;
use crate::utils::fs::{copy_file, rel_display, write_file};

use super::TaskReport;

pub fn run(mode: Mode, config: &Config, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(Category::Images)?;

    files
        .par_iter()
        .map(|file| {
            let dest = table.dest_for(Category::Images, file)?;
            if mode.is_production() {
                optimize(file, &dest, config)
                    .with_context(|| rel_display(file, table.source_root()))
            } else {
                copy_file(file, &dest)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    log!("images"; "{} file(s)", files.len());
    Ok(TaskReport {
        category: Category::Images,
        files: files.len(),
    })
}

/// Dispatch one file through its format's optimizer.
fn optimize(src: &Path, dst: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    let ext = src
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => recode_png(src, dst),
        Some("jpg" | "jpeg") => recode_jpeg(src, dst, config.images.jpeg_quality),
        Some("gif") => recode_gif(src, dst),
        Some("svg") => {
            let content = fs::read_to_string(src)?;
            write_file(dst, optimize_svg(&content)?)
        }
        _ => copy_file(src, dst),
    }
}

fn recode_png(src: &Path, dst: &Path) -> Result<()> {
    let img = image::open(src)?;
    let out = BufWriter::new(File::create(dst)?);
    let encoder = PngEncoder::new_with_quality(out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(())
}

fn recode_jpeg(src: &Path, dst: &Path, quality: u8) -> Result<()> {
    // Drop any alpha channel, the jpeg encoder only takes rgb/luma
    let img = DynamicImage::ImageRgb8(image::open(src)?.to_rgb8());
    let mut out = BufWriter::new(File::create(dst)?);
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)?;
    Ok(())
}

fn recode_gif(src: &Path, dst: &Path) -> Result<()> {
    let decoder = GifDecoder::new(BufReader::new(File::open(src)?))?;
    let frames = decoder.into_frames().collect_frames()?;

    let mut encoder = GifEncoder::new_with_speed(BufWriter::new(File::create(dst)?), 10);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(frames)?;
    Ok(())
}

/// Structural svg cleanup.
///
/// Keeps viewBox, namespace declarations, stroke/fill declarations and
/// ids untouched; strips comments, empty attributes and whitespace-only
/// text; unwraps `<g>` elements that carry no attributes.
pub fn optimize_svg(input: &str) -> Result<String> {
    let mut reader = Reader::from_str(input);
    let mut writer = Writer::new(Vec::new());
    // For each open <g>, whether it was unwrapped
    let mut unwrapped_groups: Vec<bool> = Vec::new();

    loop {
        match reader.read_event().map_err(|e| anyhow!("invalid svg: {e}"))? {
            Event::Eof => break,
            Event::Comment(_) => {}
            Event::Text(t) => {
                let bytes: &[u8] = t.as_ref();
                if !bytes.iter().all(u8::is_ascii_whitespace) {
                    writer.write_event(Event::Text(t))?;
                }
            }
            Event::Start(e) => {
                let (cleaned, attr_count) = clean_start(&e)?;
                if e.name().as_ref() == b"g" {
                    let unwrap = attr_count == 0;
                    unwrapped_groups.push(unwrap);
                    if unwrap {
                        continue;
                    }
                }
                writer.write_event(Event::Start(cleaned))?;
            }
            Event::End(e) => {
                if e.name().as_ref() == b"g"
                    && unwrapped_groups.pop().unwrap_or(false)
                {
                    continue;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) => {
                let (cleaned, attr_count) = clean_start(&e)?;
                // An attribute-less empty group renders nothing
                if e.name().as_ref() == b"g" && attr_count == 0 {
                    continue;
                }
                writer.write_event(Event::Empty(cleaned))?;
            }
            other => writer.write_event(other)?,
        }
    }

    String::from_utf8(writer.into_inner()).context("svg output is not utf-8")
}

/// Rebuild a start tag without its empty attributes.
fn clean_start(e: &BytesStart) -> Result<(BytesStart<'static>, usize)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    let mut count = 0;

    for attr in e.attributes().with_checks(false).flatten() {
        if attr.value.is_empty() {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned().into());
        out.push_attribute((key.as_str(), value.as_ref()));
        count += 1;
    }

    Ok((out, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::TempDir;

    fn write_png(path: &Path) {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(8, 8, |x, y| Rgba([x as u8 * 16, y as u8 * 16, 128, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_recode_png_round_trips() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("out.png");
        write_png(&src);

        recode_png(&src, &dst).unwrap();
        let img = image::open(&dst).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn test_recode_jpeg_strips_alpha() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("out.jpg");
        write_png(&src);

        recode_jpeg(&src, &dst, 80).unwrap();
        let img = image::open(&dst).unwrap();
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn test_optimize_svg_strips_comments_and_empty() {
        let input = r#"<svg viewBox="0 0 10 10" xmlns="http://www.w3.org/2000/svg"><!-- note --><rect id="r" class="" width="10" height="10"/></svg>"#;
        let out = optimize_svg(input).unwrap();
        assert!(!out.contains("note"));
        assert!(!out.contains("class"));
        assert!(out.contains(r#"viewBox="0 0 10 10""#));
        assert!(out.contains(r#"id="r""#));
        assert!(out.contains("xmlns"));
    }

    #[test]
    fn test_optimize_svg_collapses_bare_groups() {
        let input = r#"<svg><g><g fill="red"><circle r="1"/></g></g></svg>"#;
        let out = optimize_svg(input).unwrap();
        // the outer attribute-less group is unwrapped, the styled one stays
        assert_eq!(out.matches("<g").count(), 1);
        assert!(out.contains(r#"fill="red""#));
    }

    #[test]
    fn test_optimize_svg_drops_whitespace_text() {
        let input = "<svg>\n  <rect width=\"1\" height=\"1\"/>\n</svg>";
        let out = optimize_svg(input).unwrap();
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_optimize_svg_keeps_real_text() {
        let input = r#"<svg><text x="1">label</text></svg>"#;
        let out = optimize_svg(input).unwrap();
        assert!(out.contains("label"));
    }
}
