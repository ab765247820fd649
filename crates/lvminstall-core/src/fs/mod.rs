//! Filesystem primitives shared across install stages.

use std::path::Path;

use crate::error::{IoContext, Result};

/// Version-control metadata directories never copied into an install.
const VCS_DIRS: [&str; 2] = [".git", ".svn"];

/// Copy a directory tree, excluding version-control metadata.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)
        .io_context(|| format!("Failed to create directory: {}", dst.display()))?;
    let entries = std::fs::read_dir(src)
        .io_context(|| format!("Failed to read directory: {}", src.display()))?;
    for entry in entries {
        let entry = entry.io_context(|| format!("Failed to read entry in {}", src.display()))?;
        let file_name = entry.file_name();
        if VCS_DIRS.iter().any(|vcs| file_name == *vcs) {
            continue;
        }
        let src_path = entry.path();
        let dst_path = dst.join(&file_name);
        let file_type = entry
            .file_type()
            .io_context(|| format!("Failed to stat {}", src_path.display()))?;
        if file_type.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).io_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = std::fs::read_link(src)
        .io_context(|| format!("Failed to read symlink {}", src.display()))?;
    std::os::unix::fs::symlink(&target, dst)
        .io_context(|| format!("Failed to create symlink {}", dst.display()))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst)
        .map(|_| ())
        .io_context(|| format!("Failed to copy {}", src.display()))
}

/// Remove a directory tree if it exists. Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_dir_all(path)
        .io_context(|| format!("Failed to remove directory: {}", path.display()))?;
    Ok(true)
}
