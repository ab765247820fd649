//! Install lifecycle orchestration.

pub mod install;
pub mod workspace;

pub use install::{InstallOrchestrator, InstallReport};
pub use workspace::{ScratchWorkspace, scratch_prefix};
