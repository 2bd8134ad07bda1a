//! Filesystem helpers shared by the pipeline tasks.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Remove every entry under `dir`, keeping (or creating) the directory
/// itself. No-op when the directory is already empty.
pub fn clean_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        return Ok(());
    }

    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

/// Copy `src` to `dst`, creating parent directories as needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} -> {}", src.display(), dst.display()))?;
    Ok(())
}

/// Write `content` to `dst`, creating parent directories as needed.
pub fn write_file(dst: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(dst, content).with_context(|| format!("failed to write {}", dst.display()))
}

/// Walk `root` and return every file below it, sorted for deterministic
/// task output. Returns an empty list when the root does not exist.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in jwalk::WalkDir::new(root).sort(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Relative display form of `path` under `root` (falls back to the full
/// path when `path` is elsewhere).
pub fn rel_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_dir_missing_creates() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dist");
        clean_dir(&target).unwrap();
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_dir_removes_entries() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("dist");
        fs::create_dir_all(target.join("styles")).unwrap();
        fs::write(target.join("index.html"), "old").unwrap();
        fs::write(target.join("styles/main.css"), "old").unwrap();

        clean_dir(&target).unwrap();
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, "payload").unwrap();

        let dst = dir.path().join("deep/nested/a.txt");
        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
    }

    #[test]
    fn test_walk_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("sub/c.txt"), "").unwrap();

        let files = walk_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| rel_display(p, dir.path()))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub/c.txt"]);
    }

    #[test]
    fn test_walk_files_missing_root() {
        let dir = TempDir::new().unwrap();
        let files = walk_files(&dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }
}
