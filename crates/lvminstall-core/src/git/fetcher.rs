//! Git fetcher for cloning development heads and unpacking tag archives.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, info};

use super::GitSpec;
use crate::error::{InstallError, IoContext, Result};
use crate::process::{CommandRunner, CommandSpec, run_checked};
use crate::remote::HttpClient;

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Directory holding the product's source tree
    pub working_dir: PathBuf,
    /// Checked-out commit, when the source is a clone
    pub commit_sha: Option<String>,
}

/// Fetches git-hosted products into a scratch directory.
#[derive(Debug)]
pub struct GitFetcher<'a> {
    runner: &'a dyn CommandRunner,
    http: &'a dyn HttpClient,
    git: String,
}

impl<'a> GitFetcher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, http: &'a dyn HttpClient) -> Self {
        Self {
            runner,
            http,
            git: "git".to_string(),
        }
    }

    /// Clone `spec` into `dest`, which must not exist yet.
    pub fn clone_into(&self, spec: &GitSpec, dest: &Path) -> Result<FetchResult> {
        let dest_str = dest.to_str().ok_or_else(|| InstallError::Fetch {
            url: spec.repo_url.clone(),
            reason: format!("Invalid clone destination: {}", dest.display()),
        })?;
        let cmd = CommandSpec::new(&self.git).args(spec.clone_args(dest_str));
        info!(url = %spec.repo_url, branch = ?spec.branch, "Cloning repository");
        run_checked(self.runner, &cmd).map_err(|e| InstallError::Fetch {
            url: spec.repo_url.clone(),
            reason: e.to_string(),
        })?;

        let commit_sha = match head_commit(dest) {
            Ok(sha) => Some(sha),
            Err(e) => {
                debug!(error = %e, "Could not read HEAD of clone");
                None
            }
        };

        Ok(FetchResult {
            working_dir: dest.to_path_buf(),
            commit_sha,
        })
    }

    /// Download a `.tar.gz` archive and unpack it under `scratch_dir`.
    ///
    /// Returns the archive's single top-level directory (GitHub names it
    /// `<name>-<version>`), or `scratch_dir` itself for flat archives.
    pub fn download_archive(&self, url: &str, scratch_dir: &Path) -> Result<FetchResult> {
        info!(url, "Downloading archive");
        let bytes = self.http.download(url)?;
        unpack_tarball(&bytes, scratch_dir).map_err(|e| InstallError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let working_dir =
            single_top_level_dir(scratch_dir)?.unwrap_or_else(|| scratch_dir.to_path_buf());
        Ok(FetchResult {
            working_dir,
            commit_sha: None,
        })
    }
}

/// Resolve the commit checked out in a working tree.
pub fn head_commit(repo_dir: &Path) -> std::result::Result<String, git2::Error> {
    let repo = git2::Repository::open(repo_dir)?;
    let commit = repo.head()?.peel_to_commit()?;
    Ok(commit.id().to_string())
}

fn unpack_tarball(bytes: &[u8], dest: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest)?;
    let decoder = GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest)
}

fn single_top_level_dir(dir: &Path) -> Result<Option<PathBuf>> {
    let entries: Vec<_> = std::fs::read_dir(dir)
        .io_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()
        .io_context(|| format!("Failed to read directory: {}", dir.display()))?;
    match entries.as_slice() {
        [only] if only.path().is_dir() => Ok(Some(only.path())),
        _ => Ok(None),
    }
}
