//! INI parser for the override file.

use std::path::{Path, PathBuf};

use ini::Ini;

use super::schema::{ConfigOverrides, KNOWN_PRODUCTS_SECTION, MODULE_PROCESSING_SECTION};
use crate::error::{InstallError, Result};

/// Parse an override file from disk.
pub fn parse_overrides(path: &Path) -> Result<ConfigOverrides> {
    let ini = Ini::load_from_file(path).map_err(|e| InstallError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    from_ini(&ini, path)
}

/// Parse override content from a string. `origin` only labels errors.
pub fn parse_overrides_str(content: &str, origin: &Path) -> Result<ConfigOverrides> {
    let ini = Ini::load_from_str(content).map_err(|e| InstallError::Config {
        path: origin.to_path_buf(),
        reason: e.to_string(),
    })?;
    from_ini(&ini, origin)
}

fn from_ini(ini: &Ini, origin: &Path) -> Result<ConfigOverrides> {
    let mut overrides = ConfigOverrides::new();

    if let Some(section) = ini.section(Some(KNOWN_PRODUCTS_SECTION)) {
        for (name, url) in section.iter() {
            let url = url.trim();
            if url.is_empty() {
                return Err(InstallError::Config {
                    path: origin.to_path_buf(),
                    reason: format!("[{KNOWN_PRODUCTS_SECTION}] {name} has an empty URL"),
                });
            }
            overrides
                .known_products
                .insert(name.trim().to_string(), url.trim_end_matches('/').to_string());
        }
    }

    if let Some(section) = ini.section(Some(MODULE_PROCESSING_SECTION)) {
        for (host, dir) in section.iter() {
            let dir = dir.trim();
            if !dir.is_empty() {
                overrides
                    .module_dirs
                    .insert(host.trim().to_string(), PathBuf::from(dir));
            }
        }
    }

    Ok(overrides)
}
