//! Override file schema.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// INI section mapping product names to base URLs.
pub const KNOWN_PRODUCTS_SECTION: &str = "Known Products";
/// INI section mapping NERSC host names to module directories.
pub const MODULE_PROCESSING_SECTION: &str = "Module Processing";

/// Settings read from an optional `--configuration` INI file.
///
/// ```ini
/// [Known Products]
/// my_new_product = https://github.com/me/my_new_product
///
/// [Module Processing]
/// edison = /project/projectdirs/desi/test/modules
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    /// Product name -> base URL. Supersedes every built-in URL template.
    #[serde(default)]
    pub known_products: BTreeMap<String, String>,
    /// NERSC host -> module directory.
    #[serde(default)]
    pub module_dirs: BTreeMap<String, PathBuf>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.known_products.insert(name.into(), url.into());
        self
    }

    pub fn with_module_dir(mut self, host: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.module_dirs.insert(host.into(), dir.into());
        self
    }

    pub fn product_url(&self, name: &str) -> Option<&str> {
        self.known_products.get(name).map(String::as_str)
    }

    pub fn module_dir(&self, host: &str) -> Option<&Path> {
        self.module_dirs.get(host).map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.known_products.is_empty() && self.module_dirs.is_empty()
    }
}
