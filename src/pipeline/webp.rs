//! WebP task: convert marker-suffixed sources to lossless WebP.
//!
//! `img/hero_webp.png` becomes `dist/img/hero.webp`; the marker is
//! stripped from the stem so templates reference the clean name.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use image::codecs::webp::WebPEncoder;
use rayon::prelude::*;

use crate::config::{Config, PathTable};
use crate::core::Category;
use crate::log;
use crate::utils::fs::rel_display;

use super::TaskReport;

pub fn run(config: &Config, table: &PathTable) -> Result<TaskReport> {
    let files = table.source_files(Category::Webp)?;
    let marker = &config.images.webp_marker;

    files
        .par_iter()
        .map(|file| {
            let mapped = table.dest_for(Category::Webp, file)?;
            let name = mapped
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("unrepresentable file name: {}", file.display()))?;
            let out_name = output_name(name, marker)
                .ok_or_else(|| anyhow!("{name} does not carry the {marker} marker"))?;
            let dest = mapped.with_file_name(out_name);
            convert(file, &dest).with_context(|| rel_display(file, table.source_root()))
        })
        .collect::<Result<Vec<_>>>()?;

    log!("webp"; "{} file(s)", files.len());
    Ok(TaskReport {
        category: Category::Webp,
        files: files.len(),
    })
}

/// `hero_webp.png` -> `hero.webp` (for marker `_webp`).
fn output_name(file_name: &str, marker: &str) -> Option<String> {
    let (stem, _ext) = file_name.rsplit_once('.')?;
    let stem = stem.strip_suffix(marker)?;
    Some(format!("{stem}.webp"))
}

/// Encode one image as lossless WebP.
fn convert(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // The encoder takes rgb/rgba input only
    let img = DynamicImage::ImageRgba8(image::open(src)?.to_rgba8());
    let out = BufWriter::new(File::create(dst)?);
    img.write_with_encoder(WebPEncoder::new_lossless(out))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};
    use tempfile::TempDir;

    #[test]
    fn test_output_name() {
        assert_eq!(
            output_name("hero_webp.png", "_webp"),
            Some("hero.webp".to_string())
        );
        assert_eq!(
            output_name("photo_webp.jpeg", "_webp"),
            Some("photo.webp".to_string())
        );
        assert_eq!(output_name("plain.png", "_webp"), None);
        assert_eq!(output_name("noext", "_webp"), None);
    }

    #[test]
    fn test_convert_produces_webp() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a_webp.png");
        let dst = dir.path().join("a.webp");

        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(4, 4, |_, _| Rgba([10, 20, 30, 255]));
        img.save(&src).unwrap();

        convert(&src, &dst).unwrap();
        let out = image::open(&dst).unwrap();
        assert_eq!((out.width(), out.height()), (4, 4));
    }
}
