//! lvminstall Core Library
//!
//! Installs versioned scientific-software products from subversion or
//! GitHub into a product tree with environment-module files.

pub mod build;
pub mod commands;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod fs;
pub mod git;
pub mod modules;
pub mod orchestration;
pub mod plan;
pub mod process;
pub mod remote;
pub mod source;
pub mod svn;

/// Re-exports of commonly used types
pub mod prelude {
    // Commands
    pub use crate::commands::{InstallCommand, InstallOptions, InstallReport};
    pub use crate::context::InstallContext;

    // Errors
    pub use crate::error::{ErrorKind, InstallError, Result};

    // Configuration
    pub use crate::config::{ConfigOverrides, ConfigStore, HostTemplate, Registry};
    pub use crate::env::EnvSnapshot;

    // Resolution and planning
    pub use crate::build::{BuildType, BuildTypes, detect_build_types};
    pub use crate::plan::{InstallPlan, InstallPlanner};
    pub use crate::source::{ResolvedSource, SourceKind, SourceResolver, VersionToken};

    // External access
    pub use crate::process::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
    pub use crate::remote::{HttpClient, RemoteValidator, ReqwestClient};
}
