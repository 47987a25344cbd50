//! Recursive directory copying for template and resource trees

use crate::error::{Result, SdkError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What to do when a destination file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Existing files are an error
    Create,
    /// Existing files are replaced
    Overwrite,
}

/// Copy `source` into `destination` recursively.
/// Returns the destination paths of the copied files.
pub fn copy_dir(source: &Path, destination: &Path, mode: CopyMode) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        return Err(SdkError::template(
            source,
            "source directory not found",
        ));
    }

    fs::create_dir_all(destination)
        .map_err(|e| SdkError::template_io(destination, "failed to create directory", e))?;

    let mut copied = Vec::new();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
            SdkError::template(path, e.to_string())
        })?;

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| SdkError::template(entry.path(), e.to_string()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| SdkError::template_io(&target, "failed to create directory", e))?;
            continue;
        }

        copy_file(entry.path(), &target, mode)?;
        copied.push(target);
    }

    Ok(copied)
}

/// Copy the files directly inside `source` that satisfy `filter`.
/// A missing `source` copies nothing.
pub fn copy_matching_files<F>(
    source: &Path,
    destination: &Path,
    mode: CopyMode,
    filter: F,
) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    if !source.is_dir() {
        debug!("Skipping {}: not present", source.display());
        return Ok(Vec::new());
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(source)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SdkError::template(source, e.to_string()))?;
        if !entry.file_type().is_file() || !filter(entry.path()) {
            continue;
        }

        fs::create_dir_all(destination)
            .map_err(|e| SdkError::template_io(destination, "failed to create directory", e))?;
        let target = destination.join(entry.file_name());
        copy_file(entry.path(), &target, mode)?;
        copied.push(target);
    }

    Ok(copied)
}

/// Copy one file honouring `mode`
pub fn copy_file(source: &Path, target: &Path, mode: CopyMode) -> Result<()> {
    if mode == CopyMode::Create && target.exists() {
        return Err(SdkError::template(target, "file already exists"));
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SdkError::template_io(parent, "failed to create directory", e))?;
    }

    fs::copy(source, target).map_err(|e| SdkError::template_io(target, "failed to copy file", e))?;
    debug!("Copied {}", target.display());
    Ok(())
}
