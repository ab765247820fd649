//! Install options and their sanity check.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::env::EnvSnapshot;
use crate::error::{InstallError, Result};

/// Product installed by `--bootstrap`.
pub const BOOTSTRAP_PRODUCT: &str = "lvmutil";
/// Version installed by `--bootstrap` when none is given.
pub const BOOTSTRAP_VERSION: &str = "master";

/// Options for the install command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    /// Product identifier, `name` or `owner/name`
    pub product: Option<String>,
    /// Version: a tag, `master`, `trunk` or `branches/<name>`
    pub version: Option<String>,
    /// Anaconda version used in NERSC directory templates
    pub anaconda: Option<String>,
    /// Install lvmutil from the current directory
    pub bootstrap: bool,
    /// INI file with `[Known Products]` and `[Module Processing]` overrides
    pub config_file: Option<PathBuf>,
    /// Symlink the install into other NERSC hosts' trees
    pub cross_install: bool,
    /// Make this version the default module version
    pub default: bool,
    /// Remove an existing install directory first
    pub force: bool,
    /// Force the `make` build step
    pub force_build_type: bool,
    /// Keep the scratch checkout after the install
    pub keep: bool,
    /// Use the KNL directory layout on cori
    pub knl: bool,
    /// Install module files here instead of the host default
    pub moduledir: Option<PathBuf>,
    /// Module system home, overriding `MODULESHOME`
    pub moduleshome: Option<PathBuf>,
    /// Install root, overriding `LVM_PRODUCT_ROOT`
    pub root: Option<PathBuf>,
    /// Resolve, validate, fetch and plan without installing
    pub test: bool,
    /// Subversion username, defaulting to `USER`
    pub username: Option<String>,
}

impl InstallOptions {
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: Some(product.into()),
            version: Some(version.into()),
            ..Self::default()
        }
    }

    /// Options for a self-install of lvmutil.
    pub fn bootstrap() -> Self {
        Self {
            bootstrap: true,
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_anaconda(mut self, anaconda: impl Into<String>) -> Self {
        self.anaconda = Some(anaconda.into());
        self
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_moduledir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.moduledir = Some(dir.into());
        self
    }

    pub fn with_moduleshome(mut self, dir: impl Into<PathBuf>) -> Self {
        self.moduleshome = Some(dir.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    pub fn with_keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    pub fn with_knl(mut self, knl: bool) -> Self {
        self.knl = knl;
        self
    }

    pub fn with_test(mut self, test: bool) -> Self {
        self.test = test;
        self
    }

    pub fn with_cross_install(mut self, cross_install: bool) -> Self {
        self.cross_install = cross_install;
        self
    }

    pub fn with_force_build_type(mut self, force: bool) -> Self {
        self.force_build_type = force;
        self
    }

    /// Module system home: explicit option, else `MODULESHOME`.
    pub fn moduleshome_or_env(&self, env: &EnvSnapshot) -> Option<PathBuf> {
        self.moduleshome.clone().or_else(|| env.moduleshome.clone())
    }

    /// Validate option combinations and fill in defaults.
    ///
    /// Bootstrap installs lvmutil (at `master` unless a version is given)
    /// as the default version and needs the module system; every other
    /// install needs both a product and a version.
    pub fn sanity_check(mut self, env: &EnvSnapshot) -> Result<Self> {
        if self.bootstrap {
            self.default = true;
            self.product.get_or_insert_with(|| BOOTSTRAP_PRODUCT.to_string());
            self.version.get_or_insert_with(|| BOOTSTRAP_VERSION.to_string());
            if self.moduleshome_or_env(env).is_none() {
                return Err(InstallError::ModulesNotSetUp);
            }
            info!("Selected lvmutil/{} bootstrap install", self.version_str());
        }
        if self.product_str().is_empty() || self.version_str().is_empty() {
            return Err(InstallError::MissingProductVersion);
        }
        if self.username.is_none() {
            self.username = env.user.clone();
        }
        Ok(self)
    }

    /// Make every path option absolute against `base`, the directory the
    /// install was started from. `MODULESHOME` is folded into
    /// `moduleshome` first.
    pub fn resolve_paths(mut self, env: &EnvSnapshot, base: &Path) -> Self {
        let absolute = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        };
        self.moduleshome = self.moduleshome_or_env(env).map(absolute);
        self.root = self.root.map(absolute);
        self.moduledir = self.moduledir.map(absolute);
        self.config_file = self.config_file.map(absolute);
        self
    }

    pub fn product_str(&self) -> &str {
        self.product.as_deref().unwrap_or_default()
    }

    pub fn version_str(&self) -> &str {
        self.version.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_product_or_version_is_rejected() {
        let env = EnvSnapshot::default();
        let err = InstallOptions::default().sanity_check(&env).unwrap_err();
        assert_eq!(err.to_string(), "You must specify a product and a version!");

        let options = InstallOptions {
            product: Some("lvmutil".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            options.sanity_check(&env),
            Err(InstallError::MissingProductVersion)
        ));
    }

    #[test]
    fn bootstrap_fills_product_and_needs_modules() {
        let err = InstallOptions::bootstrap()
            .sanity_check(&EnvSnapshot::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "You do not appear to have Modules set up.");

        let env = EnvSnapshot::default().with_moduleshome("/usr/share/Modules");
        let options = InstallOptions::bootstrap().sanity_check(&env).unwrap();
        assert_eq!(options.product.as_deref(), Some("lvmutil"));
        assert_eq!(options.version.as_deref(), Some("master"));
        assert!(options.default);
    }

    #[test]
    fn bootstrap_keeps_explicit_version() {
        let options = InstallOptions {
            version: Some("1.9.5".to_string()),
            bootstrap: true,
            ..Default::default()
        }
        .with_moduleshome("/usr/share/Modules");
        let options = options.sanity_check(&EnvSnapshot::default()).unwrap();
        assert_eq!(options.version_str(), "1.9.5");
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let env = EnvSnapshot::default().with_moduleshome("Modules");
        let options = InstallOptions::new("lvmutil", "1.0.0")
            .with_root("software")
            .with_moduledir("modulefiles")
            .with_config_file("/etc/lvminstall.ini")
            .resolve_paths(&env, Path::new("/home/alice"));

        assert_eq!(options.root.as_deref(), Some(Path::new("/home/alice/software")));
        assert_eq!(
            options.moduledir.as_deref(),
            Some(Path::new("/home/alice/modulefiles"))
        );
        assert_eq!(
            options.config_file.as_deref(),
            Some(Path::new("/etc/lvminstall.ini"))
        );
        assert_eq!(
            options.moduleshome.as_deref(),
            Some(Path::new("/home/alice/Modules"))
        );
    }

    #[test]
    fn username_defaults_to_user() {
        let env = EnvSnapshot::default().with_user("alice");
        let options = InstallOptions::new("desiAdmin", "trunk")
            .sanity_check(&env)
            .unwrap();
        assert_eq!(options.username.as_deref(), Some("alice"));

        let options = InstallOptions::new("desiAdmin", "trunk")
            .with_username("bob")
            .sanity_check(&env)
            .unwrap();
        assert_eq!(options.username.as_deref(), Some("bob"));
    }
}
