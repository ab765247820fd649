//! Config store for loading the override file.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConfigOverrides, parser};
use crate::error::{InstallError, Result};

#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config_path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load overrides. No configured path means no overrides; a configured
    /// path that does not exist is an error.
    pub fn load(&self) -> Result<ConfigOverrides> {
        let Some(path) = &self.config_path else {
            return Ok(ConfigOverrides::new());
        };
        if !path.is_file() {
            return Err(InstallError::Config {
                path: path.clone(),
                reason: "file does not exist".to_string(),
            });
        }
        debug!(path = %path.display(), "Loading configuration overrides");
        parser::parse_overrides(path)
    }
}
