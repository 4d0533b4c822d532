//! Filesystem helpers shared by the generators.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Write `contents` to `path` atomically: the full payload goes to a
/// temporary sibling first and is renamed into place, so a failed run never
/// leaves a partial file at the destination. Parent directories are created.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Collect all `.wav` files under `dir`, recursively. The result is sorted
/// so downstream seeded selection is reproducible across platforms.
pub fn collect_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_wav_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_wav_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_wav_into(&path, files)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
        {
            files.push(path);
        }
    }
    Ok(())
}
