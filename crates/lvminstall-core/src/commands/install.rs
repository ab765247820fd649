//! Install command implementation.
//!
//! Thin facade over [`InstallOrchestrator`] that frontends call with an
//! [`InstallOptions`] and get an [`InstallReport`] back.

use tracing::debug;

use crate::context::InstallContext;
use crate::error::Result;
use crate::orchestration::{InstallOrchestrator, InstallReport};

use super::InstallOptions;

/// Install command orchestrator
#[derive(Debug)]
pub struct InstallCommand {
    context: InstallContext,
}

impl InstallCommand {
    /// Create an install command from an explicit context.
    pub fn new(context: InstallContext) -> Self {
        Self { context }
    }

    /// Create an install command using the process environment, the
    /// system `svn`/`git`/`make` binaries and the network.
    pub fn with_defaults() -> Self {
        Self::new(InstallContext::with_defaults())
    }

    pub fn context(&self) -> &InstallContext {
        &self.context
    }

    /// Execute the install command
    pub fn execute(&self, options: &InstallOptions) -> Result<InstallReport> {
        debug!(?options, "Executing install");
        InstallOrchestrator::new(&self.context).install(options.clone())
    }
}
