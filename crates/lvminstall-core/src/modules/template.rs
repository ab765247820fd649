//! Module file templates.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::build::{BuildType, BuildTypes};
use crate::error::{IoContext, Result};

/// Template used when a product ships no `etc/<product>.module`.
pub const DEFAULT_TEMPLATE: &str = r#"#%Module1.0
# The first line of this file tells Modules that this is a module file.
# DO NOT ALTER IT!
#
# ABOUT THIS MODULE
#
proc ModulesHelp { } {
    global product version
    puts stderr "This module adds $product/$version to your environment."
}
#
# Define variables
#
set product {name}
set version {version}
conflict $product
#
# module-whatis is what shows up in module whatis
#
module-whatis "Sets up $product/$version in your environment."
#
# Set environment
#
set PRODUCT_DIR {product_root}/$version
setenv [string toupper $product] $PRODUCT_DIR
{needs_bin}prepend-path PATH $PRODUCT_DIR/bin
{needs_python}prepend-path PYTHONPATH $PRODUCT_DIR/lib/{pyversion}/site-packages
{needs_trunk_py}prepend-path PYTHONPATH $PRODUCT_DIR/py
{needs_ld_lib}prepend-path LD_LIBRARY_PATH $PRODUCT_DIR/lib
{needs_idl}prepend-path IDL_PATH +$PRODUCT_DIR/pro
"#;

/// A line prefix that comments the line out.
const DISABLED: &str = "# ";

/// Values substituted into a module template.
///
/// The `needs_*` fields are line prefixes: empty to enable the line,
/// `"# "` to comment it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleKeywords {
    pub name: String,
    pub version: String,
    /// `<root>/code/<product>`, the parent of every installed version.
    pub product_root: PathBuf,
    pub needs_bin: &'static str,
    pub needs_python: &'static str,
    pub needs_trunk_py: &'static str,
    pub needs_ld_lib: &'static str,
    pub needs_idl: &'static str,
    pub pyversion: String,
}

impl ModuleKeywords {
    /// Derive keywords from the product tree at `tree`.
    ///
    /// Python code is reached through `lib/<pyversion>/site-packages` for
    /// tagged `setup.py` installs and through `py/` otherwise.
    pub fn from_tree(
        name: &str,
        version: &str,
        install_dir: &Path,
        tree: &Path,
        build_types: &BuildTypes,
        development: bool,
        pyversion: &str,
    ) -> Self {
        let enabled = |on: bool| if on { "" } else { DISABLED };
        let has_py = build_types.contains(BuildType::Py) || tree.join("py").is_dir();
        let site_packages = build_types.contains(BuildType::Py) && !development;

        Self {
            name: name.to_string(),
            version: version.to_string(),
            product_root: install_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| install_dir.to_path_buf()),
            needs_bin: enabled(tree.join("bin").is_dir()),
            needs_python: enabled(site_packages),
            needs_trunk_py: enabled(has_py && !site_packages),
            needs_ld_lib: enabled(tree.join("lib").is_dir()),
            needs_idl: enabled(tree.join("pro").is_dir()),
            pyversion: pyversion.to_string(),
        }
    }

    /// Substitute every `{keyword}` in `template`.
    pub fn render(&self, template: &str) -> String {
        let product_root = self.product_root.display().to_string();
        [
            ("{name}", self.name.as_str()),
            ("{version}", self.version.as_str()),
            ("{product_root}", product_root.as_str()),
            ("{needs_bin}", self.needs_bin),
            ("{needs_python}", self.needs_python),
            ("{needs_trunk_py}", self.needs_trunk_py),
            ("{needs_ld_lib}", self.needs_ld_lib),
            ("{needs_idl}", self.needs_idl),
            ("{pyversion}", self.pyversion.as_str()),
        ]
        .into_iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(key, value)
        })
    }
}

/// Path of the module template a product ships, `etc/<product>.module`.
pub fn product_template(tree: &Path, product: &str) -> PathBuf {
    tree.join("etc").join(format!("{product}.module"))
}

/// Read the product's own template, falling back to [`DEFAULT_TEMPLATE`].
pub fn load_template(tree: &Path, product: &str) -> Result<String> {
    let path = product_template(tree, product);
    if !path.is_file() {
        return Ok(DEFAULT_TEMPLATE.to_string());
    }
    std::fs::read_to_string(&path).io_context(|| format!("Failed to read {}", path.display()))
}
