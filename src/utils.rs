use crate::result::Result;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Copy a file or directory recursively
pub fn copy_recursively(source: &Path, destination: &Path) -> Result<()> {
    if source.is_dir() {
        ensure_dir(destination)?;

        for entry in fs::read_dir(source)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let src_path = entry.path();
            let dst_path = destination.join(entry.file_name());

            if file_type.is_dir() {
                copy_recursively(&src_path, &dst_path)?;
            } else if file_type.is_symlink() && !src_path.is_file() {
                // linked directories and dangling links are not followed
                debug!("Skipping link {}", src_path.display());
            } else {
                fs::copy(&src_path, &dst_path)?;
            }
        }
    } else {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination)?;
    }

    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `results.zip` -> `results`; other paths are returned unchanged
pub fn strip_zip_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("zip") => path.with_extension(""),
        _ => path.to_path_buf(),
    }
}
