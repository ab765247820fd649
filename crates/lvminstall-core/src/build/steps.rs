//! Runs build steps for a detected [`BuildTypes`] set.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{BuildType, BuildTypes};
use crate::error::{IoContext, Result};
use crate::fs::copy_tree;
use crate::process::{CommandRunner, CommandSpec, run_checked};

/// Python directory name used when the interpreter is never consulted.
pub const DEFAULT_PYVERSION: &str = "python3";

/// Prints `python<major>.<minor>`, the `lib/` subdirectory setuptools uses.
pub const PYVERSION_SCRIPT: &str =
    "import sys; print('python{0}.{1}'.format(*sys.version_info[:2]))";

#[derive(Debug)]
pub struct Builder<'a> {
    runner: &'a dyn CommandRunner,
    python: String,
    make: String,
    pythonpath: Option<String>,
}

impl<'a> Builder<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            python: "python".to_string(),
            make: "make".to_string(),
            pythonpath: None,
        }
    }

    /// Existing `PYTHONPATH` to extend for `setup.py` installs.
    pub fn with_pythonpath(mut self, pythonpath: Option<String>) -> Self {
        self.pythonpath = pythonpath;
        self
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    /// Ask the interpreter for its `python<major>.<minor>` name.
    pub fn python_version(&self) -> Result<String> {
        let spec = CommandSpec::new(&self.python).args(["-c", PYVERSION_SCRIPT]);
        let output = run_checked(self.runner, &spec)?;
        Ok(output.stdout.trim().to_string())
    }

    /// Run every step in `types` in priority order. Returns the commands
    /// executed, for reporting.
    pub fn run(
        &self,
        types: &BuildTypes,
        working_dir: &Path,
        install_dir: &Path,
        pyversion: &str,
    ) -> Result<Vec<String>> {
        let mut executed = Vec::new();
        // make and src run where the tree ended up.
        let build_dir = if types.copies_tree() {
            install_dir
        } else {
            working_dir
        };

        for build_type in types.iter() {
            info!(step = %build_type, "Running build step");
            match build_type {
                BuildType::Plain => self.plain(types, working_dir, install_dir)?,
                BuildType::Py => {
                    let spec = self.python_install(working_dir, install_dir, pyversion)?;
                    run_checked(self.runner, &spec)?;
                    executed.push(spec.to_string());
                }
                BuildType::Make => {
                    let spec = CommandSpec::new(&self.make)
                        .arg("install")
                        .current_dir(build_dir);
                    run_checked(self.runner, &spec)?;
                    executed.push(spec.to_string());
                }
                BuildType::Src => {
                    let spec = CommandSpec::new(&self.make)
                        .args(["-C", "src", "all"])
                        .current_dir(build_dir);
                    run_checked(self.runner, &spec)?;
                    executed.push(spec.to_string());
                }
            }
        }
        Ok(executed)
    }

    fn plain(&self, types: &BuildTypes, working_dir: &Path, install_dir: &Path) -> Result<()> {
        if types.copies_tree() {
            debug!(from = %working_dir.display(), to = %install_dir.display(), "Copying tree");
            copy_tree(working_dir, install_dir)
        } else {
            std::fs::create_dir_all(install_dir).io_context(|| {
                format!("Failed to create install directory: {}", install_dir.display())
            })
        }
    }

    fn python_install(
        &self,
        working_dir: &Path,
        install_dir: &Path,
        pyversion: &str,
    ) -> Result<CommandSpec> {
        let site_packages = site_packages(install_dir, pyversion);
        std::fs::create_dir_all(&site_packages)
            .io_context(|| format!("Failed to create {}", site_packages.display()))?;
        let pythonpath = match &self.pythonpath {
            Some(existing) => format!("{}:{existing}", site_packages.display()),
            None => site_packages.display().to_string(),
        };
        Ok(CommandSpec::new(&self.python)
            .args([
                "setup.py".to_string(),
                "install".to_string(),
                format!("--prefix={}", install_dir.display()),
            ])
            .current_dir(working_dir)
            .env("PYTHONPATH", pythonpath))
    }
}

/// `<install_dir>/lib/<pyversion>/site-packages`.
pub fn site_packages(install_dir: &Path, pyversion: &str) -> PathBuf {
    install_dir.join("lib").join(pyversion).join("site-packages")
}
