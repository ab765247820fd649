//! Snapshot of the process environment consumed by the installer.
//!
//! Reading variables once into [`EnvSnapshot`] keeps the resolver and
//! planner deterministic: tests build a snapshot by hand instead of
//! mutating the real process environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const NERSC_HOST_VAR: &str = "NERSC_HOST";
pub const MODULESHOME_VAR: &str = "MODULESHOME";
pub const PRODUCT_ROOT_VAR: &str = "LVM_PRODUCT_ROOT";
pub const DESICONDA_VAR: &str = "DESICONDA";
pub const USER_VAR: &str = "USER";
pub const PYTHONPATH_VAR: &str = "PYTHONPATH";

/// Anaconda version used when `DESICONDA` is unset or unparseable.
pub const DEFAULT_ANACONDA_VERSION: &str = "current";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvSnapshot {
    pub nersc_host: Option<String>,
    pub moduleshome: Option<PathBuf>,
    pub product_root: Option<PathBuf>,
    pub desiconda: Option<String>,
    pub user: Option<String>,
    pub pythonpath: Option<String>,
}

impl EnvSnapshot {
    pub fn from_process() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            nersc_host: var(NERSC_HOST_VAR),
            moduleshome: var(MODULESHOME_VAR).map(PathBuf::from),
            product_root: var(PRODUCT_ROOT_VAR).map(PathBuf::from),
            desiconda: var(DESICONDA_VAR),
            user: var(USER_VAR),
            pythonpath: var(PYTHONPATH_VAR),
        }
    }

    pub fn with_nersc_host(mut self, host: impl Into<String>) -> Self {
        self.nersc_host = Some(host.into());
        self
    }

    pub fn with_moduleshome(mut self, path: impl Into<PathBuf>) -> Self {
        self.moduleshome = Some(path.into());
        self
    }

    pub fn with_product_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.product_root = Some(path.into());
        self
    }

    pub fn with_desiconda(mut self, path: impl Into<String>) -> Self {
        self.desiconda = Some(path.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_pythonpath(mut self, path: impl Into<String>) -> Self {
        self.pythonpath = Some(path.into());
        self
    }

    /// True when running on a NERSC host.
    pub fn on_nersc(&self) -> bool {
        self.nersc_host.is_some()
    }

    /// Derive the desiconda version from `DESICONDA`.
    ///
    /// The version is the path segment between the first `desiconda/` and
    /// the first `/code`. Matching is case-sensitive, so a path spelled with
    /// `/CODE` yields [`DEFAULT_ANACONDA_VERSION`].
    pub fn anaconda_version(&self) -> String {
        self.desiconda
            .as_deref()
            .and_then(extract_anaconda_version)
            .unwrap_or_else(|| DEFAULT_ANACONDA_VERSION.to_string())
    }
}

fn extract_anaconda_version(path: &str) -> Option<String> {
    const START: &str = "desiconda/";
    const END: &str = "/code";

    let start = path.find(START)? + START.len();
    let end = path.find(END)?;
    // Inverted markers slice to nothing, same as an unset variable.
    if end <= start {
        return None;
    }
    Some(path[start..end].to_string())
}
