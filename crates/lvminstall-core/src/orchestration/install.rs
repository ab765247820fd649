//! Install lifecycle: resolve, validate, fetch, plan, build, module file,
//! cross-install links and cleanup.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::build::{BuildType, Builder, DEFAULT_PYVERSION, detect_build_types};
use crate::commands::InstallOptions;
use crate::config::{ConfigOverrides, ConfigStore};
use crate::context::InstallContext;
use crate::error::{InstallError, IoContext, Result};
use crate::git::{FetchResult, GitFetcher, GitSpec};
use crate::modules::{
    ModuleKeywords, ModuleSystem, dependencies, install_module_file, load_template,
    product_template, write_default_version,
};
use crate::plan::{CODE_DIR, InstallPlan, InstallPlanner};
use crate::remote::RemoteValidator;
use crate::source::{ResolvedSource, SourceKind, SourceResolver};
use crate::svn::SvnClient;

use super::workspace::ScratchWorkspace;

/// Name of the checkout inside a scratch directory.
const CHECKOUT_DIR: &str = "checkout";

/// Outcome of an install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub plan: InstallPlan,
    /// True for `--test` runs, which change nothing.
    pub dry_run: bool,
    /// Commit checked out for cloned sources
    pub commit_sha: Option<String>,
    /// `<last tag>.dev<revision>` for subversion development checkouts
    pub dev_version: Option<String>,
    /// Build commands run, in order
    pub commands: Vec<String>,
    pub module_file: Option<PathBuf>,
    pub default_version_file: Option<PathBuf>,
    /// Dependencies declared by the product's module template
    pub dependencies: Vec<String>,
    pub cross_install_links: Vec<PathBuf>,
    /// Scratch checkout preserved with `--keep`
    pub kept_scratch_dir: Option<PathBuf>,
    /// Set when the install finishes
    pub installed_at: DateTime<Utc>,
}

impl InstallReport {
    fn new(plan: InstallPlan, dry_run: bool) -> Self {
        Self {
            plan,
            dry_run,
            commit_sha: None,
            dev_version: None,
            commands: Vec::new(),
            module_file: None,
            default_version_file: None,
            dependencies: Vec::new(),
            cross_install_links: Vec::new(),
            kept_scratch_dir: None,
            installed_at: Utc::now(),
        }
    }
}

/// Runs one install end to end.
#[derive(Debug)]
pub struct InstallOrchestrator<'a> {
    ctx: &'a InstallContext,
}

impl<'a> InstallOrchestrator<'a> {
    pub fn new(ctx: &'a InstallContext) -> Self {
        Self { ctx }
    }

    /// Install the product described by `options`.
    ///
    /// The process working directory is restored and the scratch checkout
    /// removed on every exit path, including build failures.
    pub fn install(&self, options: InstallOptions) -> Result<InstallReport> {
        let env = self.ctx.env();
        let start_dir =
            std::env::current_dir().io_context(|| "Failed to read the current directory")?;
        let options = options
            .sanity_check(env)?
            .resolve_paths(env, &start_dir);
        let overrides = self.load_overrides(&options)?;

        let resolver = SourceResolver::new(self.ctx.registry().clone(), overrides.clone());
        let source = resolver.resolve(options.product_str(), options.version_str());
        info!(
            product = source.name(),
            version = %source.version,
            url = %source.url,
            kind = source.kind.label(),
            "Resolved product"
        );

        if options.bootstrap {
            debug!("Bootstrap install, skipping remote validation");
        } else {
            RemoteValidator::new(self.ctx.runner(), self.ctx.http())
                .with_username(options.username.clone())
                .validate(&source)?;
        }

        let workspace = if options.bootstrap {
            ScratchWorkspace::in_place()?
        } else {
            ScratchWorkspace::create(
                self.ctx.scratch_base(),
                source.name(),
                &source.version,
                &source.url,
                options.keep,
            )?
        };

        let fetched = match workspace.scratch_dir() {
            Some(scratch_dir) => self.fetch(&source, &options, scratch_dir)?,
            None => FetchResult {
                working_dir: workspace.original_dir().to_path_buf(),
                commit_sha: None,
            },
        };
        let working_dir = fetched.working_dir.clone();
        workspace.enter(&working_dir)?;

        let build_types = detect_build_types(&working_dir, options.force_build_type);
        info!(build_types = %build_types, "Detected build types");

        let planner = InstallPlanner::new(self.ctx.registry(), &overrides, env)
            .with_root(options.root.clone())
            .with_anaconda(options.anaconda.clone())
            .with_knl(options.knl)
            .with_module_dir(options.moduledir.clone())
            .with_base_dir(workspace.original_dir())
            .with_force(options.force);
        let install_dir = planner.install_dir(source.name(), &source.version)?;
        let module_dir = planner.module_dir(source.name());
        let plan = InstallPlan::new(&source, install_dir)
            .with_module_dir(module_dir)
            .with_build_types(build_types)
            .with_working_dir(&working_dir);

        let mut report = InstallReport::new(plan, options.test);
        report.commit_sha = fetched.commit_sha;
        report.dev_version = self.svn_dev_version(&source, &options, &working_dir);

        if options.test {
            if report.plan.install_dir.exists() && !options.force {
                return Err(InstallError::InstallDirExists {
                    path: report.plan.install_dir.clone(),
                });
            }
            info!(
                install_dir = %report.plan.install_dir.display(),
                "Test mode, no changes made"
            );
            report.installed_at = Utc::now();
            return Ok(report);
        }

        // Module system is checked before anything is written.
        if report.plan.module_dir.is_some() {
            let moduleshome = options
                .moduleshome_or_env(env)
                .ok_or(InstallError::ModulesNotSetUp)?;
            ModuleSystem::start(&moduleshome)?;
        }

        planner.claim_install_dir(&report.plan.install_dir)?;

        let pyversion = self.python_version(&report.plan)?;
        report.commands = Builder::new(self.ctx.runner())
            .with_pythonpath(env.pythonpath.clone())
            .run(
                &report.plan.build_types,
                &working_dir,
                &report.plan.install_dir,
                &pyversion,
            )?;

        if let Some(module_file) = report.plan.module_file() {
            self.install_module(&mut report, &source, &options, &module_file, &pyversion)?;
        }

        if options.cross_install {
            report.cross_install_links = self.cross_install(&planner, &report.plan)?;
        }

        if options.keep {
            report.kept_scratch_dir = workspace.scratch_dir().map(Path::to_path_buf);
        }
        info!(
            product = %report.plan.product,
            version = %report.plan.version,
            install_dir = %report.plan.install_dir.display(),
            "Install complete"
        );
        report.installed_at = Utc::now();
        Ok(report)
    }

    fn load_overrides(&self, options: &InstallOptions) -> Result<ConfigOverrides> {
        match &options.config_file {
            Some(path) => ConfigStore::new(Some(path.clone())).load(),
            None => Ok(self.ctx.overrides().clone()),
        }
    }

    fn fetch(
        &self,
        source: &ResolvedSource,
        options: &InstallOptions,
        scratch_dir: &Path,
    ) -> Result<FetchResult> {
        let checkout = scratch_dir.join(CHECKOUT_DIR);
        match &source.kind {
            SourceKind::GitArchive => GitFetcher::new(self.ctx.runner(), self.ctx.http())
                .download_archive(&source.url, scratch_dir),
            SourceKind::GitHead { branch } => {
                let mut spec = GitSpec::new(&source.url);
                if let Some(branch) = branch {
                    spec = spec.with_branch(branch);
                }
                GitFetcher::new(self.ctx.runner(), self.ctx.http()).clone_into(&spec, &checkout)
            }
            SourceKind::SvnPath => SvnClient::new(self.ctx.runner())
                .with_username(options.username.clone())
                .fetch(source, &checkout),
        }
    }

    /// Development version of a subversion trunk or branch checkout.
    /// Failures only lose the report field.
    fn svn_dev_version(
        &self,
        source: &ResolvedSource,
        options: &InstallOptions,
        working_dir: &Path,
    ) -> Option<String> {
        if !source.is_svn() || !source.token.is_development() {
            return None;
        }
        let client = SvnClient::new(self.ctx.runner()).with_username(options.username.clone());
        match client.version(
            self.ctx.registry(),
            source.name(),
            Some(&source.product.base_url),
            working_dir,
        ) {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(error = %e, "Could not determine svn development version");
                None
            }
        }
    }

    fn python_version(&self, plan: &InstallPlan) -> Result<String> {
        if plan.build_types.contains(BuildType::Py) {
            Builder::new(self.ctx.runner()).python_version()
        } else {
            Ok(DEFAULT_PYVERSION.to_string())
        }
    }

    fn install_module(
        &self,
        report: &mut InstallReport,
        source: &ResolvedSource,
        options: &InstallOptions,
        module_file: &Path,
        pyversion: &str,
    ) -> Result<()> {
        let plan = &report.plan;
        let working_dir = plan.working_dir.as_deref().unwrap_or(&plan.install_dir);
        let product_template = product_template(working_dir, &plan.product);
        if product_template.is_file() {
            let on_nersc = self.ctx.env().on_nersc();
            report.dependencies = dependencies(&product_template, on_nersc)?;
            for dep in &report.dependencies {
                info!(dependency = %dep, "Module dependency");
            }
        }

        let tree = if plan.build_types.copies_tree() {
            plan.install_dir.as_path()
        } else {
            working_dir
        };
        let keywords = ModuleKeywords::from_tree(
            &plan.product,
            &plan.version,
            &plan.install_dir,
            tree,
            &plan.build_types,
            source.token.is_development(),
            pyversion,
        );
        let template = load_template(working_dir, &plan.product)?;
        install_module_file(module_file, &keywords.render(&template))?;
        report.module_file = Some(module_file.to_path_buf());

        if options.default
            && let Some(product_dir) = module_file.parent()
        {
            report.default_version_file = Some(write_default_version(product_dir, &plan.version)?);
        }
        Ok(())
    }

    /// Link `<host root>/code/<product>/<version>` to the new install on
    /// every other cross-install host.
    fn cross_install(
        &self,
        planner: &InstallPlanner<'_>,
        plan: &InstallPlan,
    ) -> Result<Vec<PathBuf>> {
        let Some(current) = planner.nersc_host() else {
            warn!("Cross-install requested outside NERSC, skipping");
            return Ok(Vec::new());
        };
        let mut links = Vec::new();
        for host in &self.ctx.registry().cross_install_hosts {
            if host == current {
                continue;
            }
            let Some(root) = planner.default_nersc_dir(host) else {
                continue;
            };
            let link = root.join(CODE_DIR).join(&plan.product).join(&plan.version);
            if link.exists() || link.is_symlink() {
                warn!(path = %link.display(), "Cross-install target exists, skipping");
                continue;
            }
            if let Some(parent) = link.parent() {
                std::fs::create_dir_all(parent)
                    .io_context(|| format!("Failed to create {}", parent.display()))?;
            }
            symlink_dir(&plan.install_dir, &link)?;
            info!(host = %host, link = %link.display(), "Created cross-install link");
            links.push(link);
        }
        Ok(links)
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)
        .io_context(|| format!("Failed to link {} to {}", link.display(), target.display()))
}

#[cfg(not(unix))]
fn symlink_dir(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
        .io_context(|| format!("Failed to link {} to {}", link.display(), target.display()))
}
