//! High-level commands for lvminstall operations.
//!
//! This module provides the public API called by the `lvm_install`
//! frontend.

pub mod install;
pub mod options;

pub use crate::orchestration::InstallReport;
pub use install::InstallCommand;
pub use options::{BOOTSTRAP_PRODUCT, BOOTSTRAP_VERSION, InstallOptions};
