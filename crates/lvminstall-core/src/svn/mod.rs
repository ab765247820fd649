//! Subversion client wrapper.
//!
//! Tags are fetched with `svn export`, trunk and branches with
//! `svn checkout`. The revision helpers derive development versions of the
//! form `<last tag>.dev<revision>`.

use std::path::Path;

use tracing::{debug, info};

use crate::config::Registry;
use crate::error::{InstallError, Result};
use crate::git::FetchResult;
use crate::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::source::{ResolvedSource, VersionToken, parse_loose_version};

/// Tag reported when a product has no tags yet.
pub const NO_TAG: &str = "0.0.0";
/// Base version for products missing from the registry.
pub const UNKNOWN_PRODUCT_TAG: &str = "0.0.1";

#[derive(Debug)]
pub struct SvnClient<'a> {
    runner: &'a dyn CommandRunner,
    svn: String,
    svnversion: String,
    username: Option<String>,
}

impl<'a> SvnClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            svn: "svn".to_string(),
            svnversion: "svnversion".to_string(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    fn command(&self, subcommand: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.svn).arg("--non-interactive");
        if let Some(user) = &self.username {
            spec = spec.arg("--username").arg(user);
        }
        spec.arg(subcommand)
    }

    fn run(&self, spec: &CommandSpec, url: &str) -> Result<CommandOutput> {
        let fetch_error = |reason: String| InstallError::Fetch {
            url: url.to_string(),
            reason,
        };
        let output = self
            .runner
            .run(spec)
            .map_err(|e| fetch_error(format!("`{spec}` could not be started: {e}")))?;
        if !output.is_success() {
            return Err(fetch_error(output.stderr.trim().to_string()));
        }
        Ok(output)
    }

    /// Export a tag, or check out trunk or a branch, into `dest`.
    pub fn fetch(&self, source: &ResolvedSource, dest: &Path) -> Result<FetchResult> {
        let subcommand = match source.token {
            VersionToken::Tag(_) => "export",
            _ => "checkout",
        };
        let spec = self
            .command(subcommand)
            .arg(&source.url)
            .arg(dest.to_string_lossy());
        info!(url = %source.url, subcommand, "Fetching from subversion");
        self.run(&spec, &source.url)?;
        Ok(FetchResult {
            working_dir: dest.to_path_buf(),
            commit_sha: None,
        })
    }

    /// Latest revision of the working copy at `dir`, as reported by
    /// `svnversion -n .`.
    pub fn last_revision(&self, dir: &Path) -> Result<String> {
        let spec = CommandSpec::new(&self.svnversion)
            .args(["-n", "."])
            .current_dir(dir);
        let output = self.run(&spec, &dir.to_string_lossy())?;
        Ok(parse_revision(&output.stdout))
    }

    /// Greatest tag under `tags_url` by version ordering, or
    /// [`NO_TAG`] when there are none.
    pub fn last_tag(&self, tags_url: &str) -> Result<String> {
        let spec = self.command("ls").arg(tags_url);
        let output = self.run(&spec, tags_url)?;
        let tag = output
            .stdout
            .lines()
            .map(|line| line.trim().trim_end_matches('/'))
            .filter_map(|tag| parse_loose_version(tag).map(|v| (v, tag)))
            .max_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, tag)| tag.to_string());
        debug!(tags_url, ?tag, "Last svn tag");
        Ok(tag.unwrap_or_else(|| NO_TAG.to_string()))
    }

    /// Development version `<last tag>.dev<revision>` of the working copy
    /// at `dir`.
    ///
    /// The tag list comes from `url` when given, else from the registry's
    /// base URL for `product`. Unregistered products count from
    /// [`UNKNOWN_PRODUCT_TAG`].
    pub fn version(
        &self,
        registry: &Registry,
        product: &str,
        url: Option<&str>,
        dir: &Path,
    ) -> Result<String> {
        let base = url.or_else(|| registry.svn_product(product));
        let tag = match base {
            Some(base) => self.last_tag(&format!("{}/tags", base.trim_end_matches('/')))?,
            None => UNKNOWN_PRODUCT_TAG.to_string(),
        };
        let revision = self.last_revision(dir)?;
        Ok(format!("{tag}.dev{revision}"))
    }
}

/// Reduce `svnversion` output to a single revision number.
///
/// `Unversioned ...` maps to `0`; mixed ranges such as `123:345` keep the
/// upper bound; status suffixes (`M`, `S`, `P`) are dropped.
pub fn parse_revision(output: &str) -> String {
    let output = output.trim();
    if output.starts_with("Unversioned") {
        return "0".to_string();
    }
    let last = output.rsplit(':').next().unwrap_or(output);
    last.trim_end_matches(['M', 'S', 'P']).to_string()
}
