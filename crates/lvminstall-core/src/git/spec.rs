//! Git clone specification.

use serde::{Deserialize, Serialize};

use crate::source::{ResolvedSource, SourceKind};

/// What to clone for a development-head install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSpec {
    /// Clone URL (e.g., "https://github.com/desihub/lvmutil.git")
    pub repo_url: String,
    /// Branch to check out; `None` keeps the remote default.
    pub branch: Option<String>,
}

impl GitSpec {
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Build a spec for sources that are fetched by cloning.
    pub fn from_source(source: &ResolvedSource) -> Option<Self> {
        match &source.kind {
            SourceKind::GitHead { branch } => Some(Self {
                repo_url: source.url.clone(),
                branch: branch.clone(),
            }),
            _ => None,
        }
    }

    /// Arguments for `git clone` into `dest`, without the program name.
    pub fn clone_args(&self, dest: &str) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if let Some(branch) = &self.branch {
            args.push("--branch".to_string());
            args.push(branch.clone());
        }
        args.push(self.repo_url.clone());
        args.push(dest.to_string());
        args
    }
}
