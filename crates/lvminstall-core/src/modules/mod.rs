//! Environment-module support.
//!
//! The module system itself is external: this module only checks that it
//! is initialized, reads dependencies out of module files, and writes the
//! generated module file plus its optional `.version` default marker.

mod template;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{InstallError, IoContext, Result};

pub use template::{DEFAULT_TEMPLATE, ModuleKeywords, load_template, product_template};

/// Suffix of dependencies that only exist on NERSC hosts.
const NERSC_ONLY_SUFFIX: &str = "-hpcp";

/// An initialized module system, identified by its `MODULESHOME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSystem {
    moduleshome: PathBuf,
}

impl ModuleSystem {
    /// Check that `moduleshome` holds an initialized module system.
    pub fn start(moduleshome: &Path) -> Result<Self> {
        let init = moduleshome.join("init");
        if !init.exists() {
            return Err(InstallError::ModulesInit {
                moduleshome: moduleshome.to_path_buf(),
            });
        }
        debug!(moduleshome = %moduleshome.display(), "Modules initialized");
        Ok(Self {
            moduleshome: moduleshome.to_path_buf(),
        })
    }

    pub fn moduleshome(&self) -> &Path {
        &self.moduleshome
    }
}

/// Dependencies declared by `module load` lines in `modulefile`.
///
/// Off NERSC, `-hpcp` dependencies are dropped.
pub fn dependencies(modulefile: &Path, on_nersc: bool) -> Result<Vec<String>> {
    if !modulefile.exists() {
        return Err(InstallError::ModulefileMissing {
            path: modulefile.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(modulefile)
        .io_context(|| format!("Failed to read {}", modulefile.display()))?;
    Ok(parse_dependencies(&content, on_nersc))
}

fn parse_dependencies(content: &str, on_nersc: bool) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("module load"))
        .filter_map(|line| line.split_whitespace().nth(2))
        .filter(|dep| on_nersc || !dep.ends_with(NERSC_ONLY_SUFFIX))
        .map(str::to_string)
        .collect()
}

/// Write a rendered module file, creating its product directory.
pub fn install_module_file(module_file: &Path, content: &str) -> Result<()> {
    if let Some(parent) = module_file.parent() {
        std::fs::create_dir_all(parent)
            .io_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(module_file, content)
        .io_context(|| format!("Failed to write {}", module_file.display()))?;
    info!(path = %module_file.display(), "Installed module file");
    Ok(())
}

/// Mark `version` as the default by writing `.version` into
/// `product_module_dir`.
pub fn write_default_version(product_module_dir: &Path, version: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(product_module_dir)
        .io_context(|| format!("Failed to create {}", product_module_dir.display()))?;
    let path = product_module_dir.join(".version");
    let content = format!("#%Module1.0\nset ModulesVersion \"{version}\"\n");
    std::fs::write(&path, content).io_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), version, "Set default module version");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NERSC_DEPS: &str = "\
#%Module1.0
module load astropy-hpcp
module load setuptools-hpcp
module load lvmutil/1.0.0
prereq python
";

    const GENERIC_DEPS: &str = "\
#%Module1.0
module load astropy
module load setuptools-hpcp
module load lvmutil/1.0.0
";

    #[test]
    fn start_requires_init_dir() {
        let temp = TempDir::new().unwrap();
        let err = ModuleSystem::start(Path::new("/fake/modules/directory")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not initialize Modules with MODULESHOME=/fake/modules/directory!"
        );

        std::fs::create_dir(temp.path().join("init")).unwrap();
        let modules = ModuleSystem::start(temp.path()).unwrap();
        assert_eq!(modules.moduleshome(), temp.path());
    }

    #[test]
    fn missing_modulefile_is_an_error() {
        let err = dependencies(Path::new("foo/bar/baz.module"), false).unwrap_err();
        assert_eq!(err.to_string(), "Modulefile foo/bar/baz.module does not exist!");
    }

    #[test]
    fn nersc_keeps_hpcp_dependencies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nersc.module");
        std::fs::write(&path, NERSC_DEPS).unwrap();

        assert_eq!(
            dependencies(&path, true).unwrap(),
            vec!["astropy-hpcp", "setuptools-hpcp", "lvmutil/1.0.0"]
        );
    }

    #[test]
    fn generic_drops_hpcp_dependencies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("generic.module");
        std::fs::write(&path, GENERIC_DEPS).unwrap();

        assert_eq!(
            dependencies(&path, false).unwrap(),
            vec!["astropy", "lvmutil/1.0.0"]
        );
    }

    #[test]
    fn writes_module_file_and_default_version() {
        let temp = TempDir::new().unwrap();
        let module_file = temp.path().join("lvmutil/1.0.0");

        install_module_file(&module_file, "#%Module1.0\n").unwrap();
        assert_eq!(std::fs::read_to_string(&module_file).unwrap(), "#%Module1.0\n");

        let path = write_default_version(&temp.path().join("lvmutil"), "1.0.0").unwrap();
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "#%Module1.0\nset ModulesVersion \"1.0.0\"\n"
        );
    }
}
