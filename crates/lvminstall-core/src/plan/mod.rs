//! Install planning.
//!
//! [`InstallPlanner`] turns options and the environment snapshot into the
//! install and module directories; [`InstallPlan`] records every resolved
//! input before the build phase starts.

mod planner;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::build::BuildTypes;
use crate::source::{ResolvedSource, SourceKind};

pub use planner::{CODE_DIR, InstallPlanner, MODULEFILES_DIR, STARTUP_ANACONDA_VERSION};

/// Everything the build phase needs, fixed once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallPlan {
    pub product: String,
    pub version: String,
    pub source_url: String,
    pub source_kind: SourceKind,
    pub install_dir: PathBuf,
    /// `None` when no module file is installed.
    pub module_dir: Option<PathBuf>,
    pub build_types: BuildTypes,
    /// Checked-out tree; `None` until a fetch has happened.
    pub working_dir: Option<PathBuf>,
}

impl InstallPlan {
    pub fn new(source: &ResolvedSource, install_dir: PathBuf) -> Self {
        Self {
            product: source.name().to_string(),
            version: source.version.clone(),
            source_url: source.url.clone(),
            source_kind: source.kind.clone(),
            install_dir,
            module_dir: None,
            build_types: BuildTypes::default(),
            working_dir: None,
        }
    }

    pub fn with_module_dir(mut self, module_dir: Option<PathBuf>) -> Self {
        self.module_dir = module_dir;
        self
    }

    pub fn with_build_types(mut self, build_types: BuildTypes) -> Self {
        self.build_types = build_types;
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    /// `<module_dir>/<product>/<version>`, when modules are installed.
    pub fn module_file(&self) -> Option<PathBuf> {
        self.module_dir
            .as_ref()
            .map(|dir| dir.join(&self.product).join(&self.version))
    }
}
