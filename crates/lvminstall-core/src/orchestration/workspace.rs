//! Scratch workspace with scoped cleanup.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{IoContext, Result};

/// Length of the URL hash in scratch directory prefixes.
const HASH_LEN: usize = 12;

/// Records the process working directory and owns a scratch directory.
///
/// The scratch directory is always freshly created, so concurrent installs
/// of the same product never share one. On drop the original working
/// directory is restored and the scratch directory is removed unless it
/// is kept. Nothing else is ever removed.
#[derive(Debug)]
pub struct ScratchWorkspace {
    original_dir: PathBuf,
    scratch: Option<TempDir>,
    keep: bool,
}

impl ScratchWorkspace {
    /// Create a new scratch directory under `base` for one product version
    /// and record the current directory.
    pub fn create(base: &Path, name: &str, version: &str, url: &str, keep: bool) -> Result<Self> {
        let original_dir = current_dir()?;
        std::fs::create_dir_all(base)
            .io_context(|| format!("Failed to create {}", base.display()))?;
        let scratch = tempfile::Builder::new()
            .prefix(&scratch_prefix(name, version, url))
            .tempdir_in(base)
            .io_context(|| format!("Failed to create a scratch directory in {}", base.display()))?;
        debug!(path = %scratch.path().display(), "Created scratch directory");
        Ok(Self {
            original_dir,
            scratch: Some(scratch),
            keep,
        })
    }

    /// Record the current directory without creating anything, for
    /// installs that build in place.
    pub fn in_place() -> Result<Self> {
        Ok(Self {
            original_dir: current_dir()?,
            scratch: None,
            keep: true,
        })
    }

    pub fn original_dir(&self) -> &Path {
        &self.original_dir
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    /// Make `dir` the process working directory until drop.
    pub fn enter(&self, dir: &Path) -> Result<()> {
        std::env::set_current_dir(dir)
            .io_context(|| format!("Failed to change directory to {}", dir.display()))
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.original_dir) {
            warn!(
                path = %self.original_dir.display(),
                error = %e,
                "Failed to restore working directory"
            );
        }
        let Some(scratch) = self.scratch.take() else {
            return;
        };
        if self.keep {
            let path = scratch.keep();
            info!(path = %path.display(), "Keeping scratch directory");
            return;
        }
        let path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}

/// `<name>-<version>-<hash of url>-`, the prefix of every scratch
/// directory for one source, with `/` in branch versions flattened.
pub fn scratch_prefix(name: &str, version: &str, url: &str) -> String {
    let hash = blake3::hash(url.as_bytes()).to_hex().to_string();
    let version = version.replace('/', "-");
    format!("{name}-{version}-{}-", &hash[..HASH_LEN])
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().io_context(|| "Failed to read the current directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_prefix_is_stable_and_flat() {
        let a = scratch_prefix("lvmutil", "branches/dev", "https://x/lvmutil.git");
        let b = scratch_prefix("lvmutil", "branches/dev", "https://x/lvmutil.git");
        let c = scratch_prefix("lvmutil", "branches/dev", "https://y/lvmutil.git");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("lvmutil-branches-dev-"));
        assert!(!a.contains('/'));
        assert_eq!(a.len(), "lvmutil-branches-dev-".len() + HASH_LEN + 1);
    }

    #[test]
    fn workspaces_for_one_source_never_collide() {
        let base = TempDir::new().unwrap();
        let url = "https://x/lvmutil.git";
        let first = ScratchWorkspace::create(base.path(), "lvmutil", "1.0.0", url, false).unwrap();
        let first_dir = first.scratch_dir().unwrap().to_path_buf();
        std::fs::write(first_dir.join("live"), "checkout").unwrap();

        let second =
            ScratchWorkspace::create(base.path(), "lvmutil", "1.0.0", url, false).unwrap();
        let second_dir = second.scratch_dir().unwrap().to_path_buf();
        assert_ne!(first_dir, second_dir);
        assert!(first_dir.join("live").is_file());

        drop(second);
        assert!(!second_dir.exists());
        assert!(first_dir.join("live").is_file());
        drop(first);
        assert!(!first_dir.exists());
    }

    #[test]
    fn kept_workspace_survives_drop() {
        let base = TempDir::new().unwrap();
        let workspace =
            ScratchWorkspace::create(base.path(), "lvmutil", "1.0.0", "https://x", true).unwrap();
        let dir = workspace.scratch_dir().unwrap().to_path_buf();
        drop(workspace);
        assert!(dir.is_dir());
    }
}
