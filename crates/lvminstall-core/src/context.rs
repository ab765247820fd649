//! Install context for dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigOverrides, Registry};
use crate::env::EnvSnapshot;
use crate::process::{CommandRunner, SystemRunner};
use crate::remote::{HttpClient, ReqwestClient};

/// Directory under the system temp dir holding scratch checkouts.
pub const SCRATCH_DIR_NAME: &str = "lvminstall";

/// Shared services and tables every install needs.
///
/// Frontends build this once; tests build it by hand with doubles for the
/// runner and HTTP client and a hand-made environment snapshot.
#[derive(Debug, Clone)]
pub struct InstallContext {
    env: EnvSnapshot,
    registry: Registry,
    overrides: ConfigOverrides,
    runner: Arc<dyn CommandRunner>,
    http: Arc<dyn HttpClient>,
    scratch_base: PathBuf,
}

impl InstallContext {
    pub fn new(
        env: EnvSnapshot,
        registry: Registry,
        runner: Arc<dyn CommandRunner>,
        http: Arc<dyn HttpClient>,
        scratch_base: PathBuf,
    ) -> Self {
        Self {
            env,
            registry,
            overrides: ConfigOverrides::new(),
            runner,
            http,
            scratch_base,
        }
    }

    /// Context backed by the real process environment, subprocesses and
    /// network.
    pub fn with_defaults() -> Self {
        Self::new(
            EnvSnapshot::from_process(),
            Registry::default(),
            Arc::new(SystemRunner),
            Arc::new(ReqwestClient::default()),
            std::env::temp_dir().join(SCRATCH_DIR_NAME),
        )
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn overrides(&self) -> &ConfigOverrides {
        &self.overrides
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn http(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    pub fn scratch_base(&self) -> &Path {
        &self.scratch_base
    }
}
