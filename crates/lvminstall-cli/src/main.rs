//! lvm_install - install LVM/DESI software products
//!
//! Usage:
//!   lvm_install lvmutil 1.0.0 --root /software   # Install a tagged version
//!   lvm_install desiAdmin trunk -t               # Plan without installing
//!   lvm_install -b -m /usr/share/Modules         # Bootstrap lvmutil in place

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lvminstall_core::commands::{InstallCommand, InstallOptions, InstallReport};

#[derive(Parser, Debug)]
#[command(name = "lvm_install")]
#[command(about = "Install LVM software products", long_about = None)]
struct Cli {
    /// Name of product to install, `name` or `owner/name`
    product: Option<String>,

    /// Version of product to install: a tag, master, trunk or branches/<name>
    #[arg(value_name = "VERSION")]
    product_version: Option<String>,

    /// Set the version of Anaconda to use for NERSC directory layouts
    #[arg(short = 'a', long, value_name = "VERSION")]
    anaconda: Option<String>,

    /// Run in bootstrap mode to install lvmutil from the current directory
    #[arg(short = 'b', long)]
    bootstrap: bool,

    /// Load overrides from an INI configuration file
    #[arg(short = 'c', long = "configuration", value_name = "FILE")]
    configuration: Option<PathBuf>,

    /// Force the make build step, even if no Makefile is found
    #[arg(short = 'C', long = "compile-c")]
    compile_c: bool,

    /// Make this version the default module version
    #[arg(short = 'd', long)]
    default: bool,

    /// Overwrite any existing installation of this product/version
    #[arg(short = 'F', long)]
    force: bool,

    /// Keep the scratch checkout after the install
    #[arg(short = 'k', long)]
    keep: bool,

    /// Use the KNL directory layout on cori
    #[arg(short = 'K', long)]
    knl: bool,

    /// Install module files in this directory
    #[arg(short = 'M', long = "module-dir", value_name = "DIR")]
    module_dir: Option<PathBuf>,

    /// Set or override the value of MODULESHOME
    #[arg(short = 'm', long, value_name = "DIR", env = "MODULESHOME")]
    moduleshome: Option<PathBuf>,

    /// Install into this root, overriding LVM_PRODUCT_ROOT
    #[arg(short = 'r', long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Resolve, validate, fetch and plan, but install nothing
    #[arg(short = 't', long)]
    test: bool,

    /// Subversion username, defaulting to USER
    #[arg(short = 'U', long, value_name = "NAME")]
    username: Option<String>,

    /// Print debug messages
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Symlink the install into the trees of the other NERSC hosts
    #[arg(long)]
    cross_install: bool,

    /// Output format
    #[arg(short = 'o', long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

impl Cli {
    fn options(&self) -> InstallOptions {
        let mut options = if self.bootstrap {
            InstallOptions::bootstrap()
        } else {
            InstallOptions::default()
        };
        options.product = self.product.clone().or(options.product);
        options.version = self.product_version.clone().or(options.version);
        options.anaconda = self.anaconda.clone();
        options.config_file = self.configuration.clone();
        options.moduledir = self.module_dir.clone();
        options.moduleshome = self.moduleshome.clone();
        options.root = self.root.clone();
        options.username = self.username.clone();

        options
            .with_force_build_type(self.compile_c)
            .with_default(self.default)
            .with_force(self.force)
            .with_keep(self.keep)
            .with_knl(self.knl)
            .with_test(self.test)
            .with_cross_install(self.cross_install)
    }

    fn log_filter(&self) -> &'static str {
        if self.verbose {
            "lvminstall=debug,lvm_install=debug,info"
        } else {
            "lvminstall=info,lvm_install=info,warn"
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let options = cli.options();
    let report = InstallCommand::with_defaults().execute(&options)?;
    print_report(&report, cli.format)?;

    Ok(())
}

fn print_report(report: &InstallReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_table(report),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn print_table(report: &InstallReport) {
    let plan = &report.plan;
    if report.dry_run {
        println!(
            "{} {}/{} (test mode, nothing installed)",
            style("•").cyan(),
            plan.product,
            plan.version
        );
    } else {
        println!(
            "{} Installed {}/{}",
            style("✓").green(),
            style(&plan.product).bold(),
            plan.version
        );
    }

    println!("  Source:      {} ({})", plan.source_url, plan.source_kind.label());
    println!("  Install dir: {}", plan.install_dir.display());
    println!("  Build types: {}", plan.build_types);
    if let Some(dev_version) = &report.dev_version {
        println!("  Dev version: {dev_version}");
    }
    if let Some(sha) = &report.commit_sha {
        println!("  Commit:      {sha}");
    }
    for command in &report.commands {
        println!("  Ran:         {command}");
    }
    match &report.module_file {
        Some(path) => println!("  Module file: {}", path.display()),
        None if plan.module_dir.is_none() => println!("  Module file: {}", style("none").dim()),
        None => {}
    }
    if let Some(path) = &report.default_version_file {
        println!("  Default:     {}", path.display());
    }
    if !report.dependencies.is_empty() {
        println!("  Depends on:  {}", report.dependencies.join(", "));
    }
    for link in &report.cross_install_links {
        println!("  Linked:      {}", link.display());
    }
    if let Some(dir) = &report.kept_scratch_dir {
        println!("  {} scratch checkout kept at {}", style("⚠").yellow(), dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, OutputFormat};
    use clap::Parser;

    #[test]
    fn product_and_version_parse() {
        let cli = Cli::try_parse_from(["lvm_install", "lvmutil", "1.0.0", "-r", "/software"])
            .expect("Failed to parse");
        let options = cli.options();
        assert_eq!(options.product.as_deref(), Some("lvmutil"));
        assert_eq!(options.version.as_deref(), Some("1.0.0"));
        assert_eq!(options.root.as_deref(), Some(std::path::Path::new("/software")));
        assert!(!options.bootstrap);
    }

    #[test]
    fn short_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "lvm_install",
            "desiAdmin",
            "trunk",
            "-C",
            "-d",
            "-F",
            "-k",
            "-K",
            "-t",
            "-U",
            "alice",
            "-a",
            "20170613",
            "-M",
            "/modules",
        ])
        .expect("Failed to parse");
        let options = cli.options();
        assert!(options.force_build_type);
        assert!(options.default);
        assert!(options.force);
        assert!(options.keep);
        assert!(options.knl);
        assert!(options.test);
        assert_eq!(options.username.as_deref(), Some("alice"));
        assert_eq!(options.anaconda.as_deref(), Some("20170613"));
        assert_eq!(options.moduledir.as_deref(), Some(std::path::Path::new("/modules")));
    }

    #[test]
    fn bootstrap_needs_no_product() {
        let cli = Cli::try_parse_from(["lvm_install", "-b", "-m", "/usr/share/Modules"])
            .expect("Failed to parse");
        let options = cli.options();
        assert!(options.bootstrap);
        assert_eq!(options.product, None);
        assert_eq!(
            options.moduleshome.as_deref(),
            Some(std::path::Path::new("/usr/share/Modules"))
        );
    }

    #[test]
    fn bootstrap_keeps_explicit_version() {
        let cli = Cli::try_parse_from(["lvm_install", "-b", "lvmutil", "1.9.5"])
            .expect("Failed to parse");
        assert_eq!(cli.options().version.as_deref(), Some("1.9.5"));
    }

    #[test]
    fn long_flags_parse() {
        let cli = Cli::try_parse_from([
            "lvm_install",
            "lvmutil",
            "master",
            "--configuration",
            "overrides.ini",
            "--cross-install",
            "--format",
            "json",
            "--verbose",
        ])
        .expect("Failed to parse");
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.verbose);
        let options = cli.options();
        assert!(options.cross_install);
        assert_eq!(
            options.config_file.as_deref(),
            Some(std::path::Path::new("overrides.ini"))
        );
    }
}
