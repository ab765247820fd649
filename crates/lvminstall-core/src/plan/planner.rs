//! Install and module directory planning.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{ConfigOverrides, Registry};
use crate::env::EnvSnapshot;
use crate::error::{InstallError, Result};
use crate::fs::remove_dir_if_exists;

/// Subdirectory of an install root holding products.
pub const CODE_DIR: &str = "code";
/// Subdirectory of a NERSC host directory holding module files.
pub const MODULEFILES_DIR: &str = "modulefiles";
/// Anaconda version whose host directory carries `desimodules`.
pub const STARTUP_ANACONDA_VERSION: &str = "startup";

const DESIMODULES: &str = "desimodules";

/// Computes install and module directories.
#[derive(Debug, Clone)]
pub struct InstallPlanner<'a> {
    registry: &'a Registry,
    overrides: &'a ConfigOverrides,
    env: &'a EnvSnapshot,
    root: Option<PathBuf>,
    anaconda: Option<String>,
    knl: bool,
    module_dir: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    force: bool,
}

impl<'a> InstallPlanner<'a> {
    pub fn new(
        registry: &'a Registry,
        overrides: &'a ConfigOverrides,
        env: &'a EnvSnapshot,
    ) -> Self {
        Self {
            registry,
            overrides,
            env,
            root: None,
            anaconda: None,
            knl: false,
            module_dir: None,
            base_dir: None,
            force: false,
        }
    }

    /// Explicit install root, taking precedence over `LVM_PRODUCT_ROOT`.
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root;
        self
    }

    /// Explicit anaconda version, taking precedence over `DESICONDA`.
    pub fn with_anaconda(mut self, anaconda: Option<String>) -> Self {
        self.anaconda = anaconda;
        self
    }

    pub fn with_knl(mut self, knl: bool) -> Self {
        self.knl = knl;
        self
    }

    /// Explicit module directory, used everywhere.
    pub fn with_module_dir(mut self, module_dir: Option<PathBuf>) -> Self {
        self.module_dir = module_dir;
        self
    }

    /// Directory relative roots and module directories are resolved
    /// against, normally the one the install was started from.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Architecture marker substituted into host templates.
    pub fn knl(&self) -> &'static str {
        if self.knl { "knl" } else { "" }
    }

    pub fn anaconda_version(&self) -> String {
        self.anaconda
            .clone()
            .unwrap_or_else(|| self.env.anaconda_version())
    }

    /// NERSC host from the environment, when it has a directory template.
    pub fn nersc_host(&self) -> Option<&str> {
        self.env
            .nersc_host
            .as_deref()
            .filter(|host| self.registry.is_known_host(host))
    }

    /// Default install root on `host`.
    pub fn default_nersc_dir(&self, host: &str) -> Option<PathBuf> {
        self.registry
            .host_template(host)
            .map(|t| t.render(self.knl(), &self.anaconda_version()))
    }

    /// Resolve the install root.
    ///
    /// An explicit or environment root wins when it is an existing
    /// directory; otherwise the NERSC host default applies.
    pub fn install_root(&self) -> Result<PathBuf> {
        let candidate = self
            .root
            .clone()
            .or_else(|| self.env.product_root.clone())
            .map(|root| self.absolute(root));
        if let Some(root) = &candidate {
            if root.is_dir() {
                return Ok(root.clone());
            }
            debug!(root = %root.display(), "Install root is not a directory");
        }
        if let Some(dir) = self.nersc_host().and_then(|host| self.default_nersc_dir(host)) {
            return Ok(dir);
        }
        match candidate {
            Some(root) => Err(InstallError::InstallRootMissing { root }),
            None => Err(InstallError::NoInstallRoot),
        }
    }

    /// `<root>/code/<product>/<version>`, without touching the filesystem
    /// beyond resolving the root.
    pub fn install_dir(&self, product: &str, version: &str) -> Result<PathBuf> {
        Ok(self
            .install_root()?
            .join(CODE_DIR)
            .join(product)
            .join(version))
    }

    /// Apply the overwrite policy to `install_dir`: an existing directory
    /// is an error, or is removed when forced.
    pub fn claim_install_dir(&self, install_dir: &Path) -> Result<()> {
        if !install_dir.exists() {
            return Ok(());
        }
        if !self.force {
            return Err(InstallError::InstallDirExists {
                path: install_dir.to_path_buf(),
            });
        }
        info!(path = %install_dir.display(), "Removing existing install directory");
        remove_dir_if_exists(install_dir)?;
        Ok(())
    }

    /// Compute the install directory and make it available.
    pub fn set_install_dir(&self, product: &str, version: &str) -> Result<PathBuf> {
        let install_dir = self.install_dir(product, version)?;
        self.claim_install_dir(&install_dir)?;
        Ok(install_dir)
    }

    /// Module directory for `product`, or `None` when module files are not
    /// installed.
    pub fn module_dir(&self, product: &str) -> Option<PathBuf> {
        if let Some(dir) = &self.module_dir {
            return Some(self.absolute(dir.clone()));
        }
        self.nersc_module_dir(product)
    }

    /// Module directory on the current NERSC host.
    pub fn nersc_module_dir(&self, product: &str) -> Option<PathBuf> {
        let host = self.env.nersc_host.as_deref()?;
        if let Some(dir) = self.overrides.module_dir(host) {
            return Some(self.absolute(dir.to_path_buf()));
        }
        let template = self.registry.host_template(host)?;
        let anaconda = if product == DESIMODULES {
            STARTUP_ANACONDA_VERSION.to_string()
        } else {
            self.anaconda_version()
        };
        Some(template.render(self.knl(), &anaconda).join(MODULEFILES_DIR))
    }

    fn absolute(&self, path: PathBuf) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }
}
