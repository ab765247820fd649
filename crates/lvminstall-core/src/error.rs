//! Error type shared by every install stage.

use std::path::PathBuf;

use thiserror::Error;

/// Broad category of an [`InstallError`], used by frontends to decide how to
/// report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unresolvable product/version input.
    Resolution,
    /// The remote source or the local tooling failed a pre-fetch check.
    Validation,
    /// Install or module directories could not be planned.
    Planning,
    /// Fetching or building the product failed.
    Build,
    /// Configuration file or filesystem failures.
    Io,
}

/// All user-facing install failures.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("You must specify a product and a version!")]
    MissingProductVersion,

    #[error("You do not appear to have Modules set up.")]
    ModulesNotSetUp,

    #[error("Could not initialize Modules with MODULESHOME={}!", .moduleshome.display())]
    ModulesInit { moduleshome: PathBuf },

    #[error("Error {status} querying GitHub URL: {url}.")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to query URL {url}: {reason}")]
    HttpTransport { url: String, reason: String },

    #[error("{url} does not appear to be a valid svn product/version!")]
    InvalidSvnUrl { url: String },

    #[error("Non-NERSC installs require an install root; use --root or set LVM_PRODUCT_ROOT.")]
    NoInstallRoot,

    #[error("Install root, {}, is not an existing directory!", .root.display())]
    InstallRootMissing { root: PathBuf },

    #[error("Install directory, {}, already exists!", .path.display())]
    InstallDirExists { path: PathBuf },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Build command `{command}` failed ({status}): {stderr}")]
    BuildFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Modulefile {} does not exist!", .path.display())]
    ModulefileMissing { path: PathBuf },

    #[error("Invalid configuration file {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingProductVersion => ErrorKind::Resolution,
            Self::ModulesNotSetUp
            | Self::ModulesInit { .. }
            | Self::HttpStatus { .. }
            | Self::HttpTransport { .. }
            | Self::InvalidSvnUrl { .. } => ErrorKind::Validation,
            Self::NoInstallRoot | Self::InstallRootMissing { .. } | Self::InstallDirExists { .. } => {
                ErrorKind::Planning
            }
            Self::Fetch { .. } | Self::BuildFailed { .. } => ErrorKind::Build,
            Self::ModulefileMissing { .. } | Self::Config { .. } | Self::Io { .. } => {
                ErrorKind::Io
            }
        }
    }

    /// Wrap an I/O error with a description of what was being attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallError>;

/// Attach context to `std::io::Result` values, mirroring `anyhow::Context`.
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| InstallError::io(f(), source))
    }
}
