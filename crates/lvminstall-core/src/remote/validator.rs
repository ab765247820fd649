//! Pre-fetch validation of resolved source URLs.

use tracing::{debug, info};
use url::Url;

use crate::error::{InstallError, Result};
use crate::process::{CommandRunner, CommandSpec};
use crate::source::ResolvedSource;

use super::HttpClient;

/// Program used for subversion existence checks.
pub const DEFAULT_SVN: &str = "svn";

/// Confirms that a resolved URL exists before anything is fetched.
#[derive(Debug)]
pub struct RemoteValidator<'a> {
    runner: &'a dyn CommandRunner,
    http: &'a dyn HttpClient,
    svn: String,
    username: Option<String>,
}

impl<'a> RemoteValidator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, http: &'a dyn HttpClient) -> Self {
        Self {
            runner,
            http,
            svn: DEFAULT_SVN.to_string(),
            username: None,
        }
    }

    /// Use a different subversion client binary.
    pub fn with_svn(mut self, svn: impl Into<String>) -> Self {
        self.svn = svn.into();
        self
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Argument vector for `svn ls`, without the program name.
    pub fn svn_ls_args(&self, url: &str) -> Vec<String> {
        let mut args = vec!["--non-interactive".to_string()];
        if let Some(user) = &self.username {
            args.push("--username".to_string());
            args.push(user.clone());
        }
        args.push("ls".to_string());
        args.push(url.to_string());
        args
    }

    pub fn validate(&self, source: &ResolvedSource) -> Result<()> {
        let checked = if source.is_svn() {
            self.validate_svn(&source.url)
        } else {
            self.validate_http(&source.url)
        };
        checked?;
        info!(url = %source.url, kind = source.kind.label(), "Remote source exists");
        Ok(())
    }

    pub fn validate_svn(&self, url: &str) -> Result<()> {
        let spec = CommandSpec::new(&self.svn).args(self.svn_ls_args(url));
        let invalid = || InstallError::InvalidSvnUrl {
            url: url.to_string(),
        };
        let output = self.runner.run(&spec).map_err(|e| {
            debug!(command = %spec, error = %e, "svn client unavailable");
            invalid()
        })?;
        debug!(stdout = %output.stdout.trim_end(), "svn ls output");
        if !output.is_success() {
            return Err(invalid());
        }
        Ok(())
    }

    pub fn validate_http(&self, url: &str) -> Result<()> {
        Url::parse(url).map_err(|e| InstallError::HttpTransport {
            url: url.to_string(),
            reason: format!("invalid URL: {e}"),
        })?;
        let status = self.http.head_status(url)?;
        if status != 200 {
            return Err(InstallError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}
