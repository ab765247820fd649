//! Shared doubles and fixtures for install integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

use lvminstall_core::config::Registry;
use lvminstall_core::context::InstallContext;
use lvminstall_core::env::EnvSnapshot;
use lvminstall_core::error::{InstallError, Result};
use lvminstall_core::process::{CommandOutput, CommandRunner, CommandSpec};
use lvminstall_core::remote::HttpClient;

/// A small product tree with a Makefile, a script and its own module
/// template.
pub const LVMUTIL_TREE: [(&str, &str); 3] = [
    ("Makefile", "install:\n\ttrue\n"),
    ("bin/lvm_hello", "#!/bin/sh\necho hello\n"),
    (
        "etc/lvmutil.module",
        "#%Module1.0\n\
         module load astropy\n\
         module load setuptools-hpcp\n\
         set PRODUCT_DIR {product_root}/{version}\n\
         {needs_bin}prepend-path PATH $PRODUCT_DIR/bin\n\
         {needs_trunk_py}prepend-path PYTHONPATH $PRODUCT_DIR/py\n",
    ),
];

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that change the process working directory.
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Changes the working directory, restoring the previous one on drop.
/// Hold [`cwd_lock`] for as long as this lives.
pub struct EnterDir {
    previous: PathBuf,
}

impl EnterDir {
    pub fn new(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(dir).expect("Failed to enter directory");
        Self { previous }
    }
}

impl Drop for EnterDir {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.previous);
    }
}

pub fn write_tree(dest: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let path = dest.join(path);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("Failed to create fixture directory");
        std::fs::write(&path, content).expect("Failed to write fixture file");
    }
}

/// Gzipped tarball with every file under `top/`, like a GitHub archive.
pub fn tarball(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{top}/{path}"), content.as_bytes())
            .expect("Failed to append to tarball");
    }
    builder
        .into_inner()
        .and_then(|gz| gz.finish())
        .expect("Failed to finish tarball")
}

/// Command runner that fakes `git`, `svn`, `svnversion`, `python` and
/// `make`, materializing `tree` for every clone, checkout or export.
#[derive(Debug, Default)]
pub struct FakeRunner {
    calls: Mutex<Vec<CommandSpec>>,
    tree: Vec<(&'static str, &'static str)>,
    failing: Vec<String>,
    svn_tags: String,
    svnversion: String,
    last_call_at: Mutex<Option<DateTime<Utc>>>,
}

impl FakeRunner {
    pub fn with_tree(tree: &[(&'static str, &'static str)]) -> Self {
        Self {
            tree: tree.to_vec(),
            svnversion: "1".to_string(),
            ..Self::default()
        }
    }

    /// Fail every command whose display form contains `fragment`.
    pub fn failing(mut self, fragment: impl Into<String>) -> Self {
        self.failing.push(fragment.into());
        self
    }

    pub fn with_svn(mut self, tags: &str, svnversion: &str) -> Self {
        self.svn_tags = tags.to_string();
        self.svnversion = svnversion.to_string();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// When the most recent command was run.
    pub fn last_call_at(&self) -> Option<DateTime<Utc>> {
        *self.last_call_at.lock().expect("clock lock")
    }

    fn checkout(&self, spec: &CommandSpec) -> CommandOutput {
        let dest = spec.args.last().expect("destination argument");
        write_tree(Path::new(dest), &self.tree);
        CommandOutput::success("")
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        self.calls.lock().expect("calls lock").push(spec.clone());
        *self.last_call_at.lock().expect("clock lock") = Some(Utc::now());
        let display = spec.to_string();
        if self.failing.iter().any(|f| display.contains(f.as_str())) {
            return Ok(CommandOutput::failure(2, format!("{display}: failed")));
        }
        let has = |arg: &str| spec.args.iter().any(|a| a == arg);
        let output = match spec.program.as_str() {
            "git" if has("clone") => self.checkout(spec),
            "svn" if has("export") || has("checkout") => self.checkout(spec),
            "svn" if has("ls") => CommandOutput::success(self.svn_tags.clone()),
            "svnversion" => CommandOutput::success(self.svnversion.clone()),
            "python" if has("-c") => CommandOutput::success("python3.11\n"),
            _ => CommandOutput::success(""),
        };
        Ok(output)
    }
}

/// HTTP double answering every HEAD with `status` and every download with
/// `archive`.
#[derive(Debug)]
pub struct FakeHttp {
    status: u16,
    archive: Vec<u8>,
    heads: Mutex<Vec<String>>,
}

impl FakeHttp {
    pub fn new(status: u16, archive: Vec<u8>) -> Self {
        Self {
            status,
            archive,
            heads: Mutex::new(Vec::new()),
        }
    }

    pub fn heads(&self) -> Vec<String> {
        self.heads.lock().expect("heads lock").clone()
    }
}

impl HttpClient for FakeHttp {
    fn head_status(&self, url: &str) -> Result<u16> {
        self.heads.lock().expect("heads lock").push(url.to_string());
        Ok(self.status)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        if self.status != 200 {
            return Err(InstallError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", self.status),
            });
        }
        Ok(self.archive.clone())
    }
}

/// Temporary layout for one install: a product root, a module directory,
/// an initialized module home and a scratch base.
pub struct Sandbox {
    pub temp: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let sandbox = Self { temp };
        std::fs::create_dir_all(sandbox.root()).expect("Failed to create root");
        std::fs::create_dir_all(sandbox.moduleshome().join("init"))
            .expect("Failed to create module home");
        sandbox
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn root(&self) -> PathBuf {
        self.path().join("root")
    }

    pub fn moduledir(&self) -> PathBuf {
        self.path().join("modulefiles")
    }

    pub fn moduleshome(&self) -> PathBuf {
        self.path().join("Modules")
    }

    pub fn scratch(&self) -> PathBuf {
        self.path().join("scratch")
    }

    pub fn context(
        &self,
        env: EnvSnapshot,
        registry: Registry,
        runner: Arc<FakeRunner>,
        http: Arc<FakeHttp>,
    ) -> InstallContext {
        InstallContext::new(env, registry, runner, http, self.scratch())
    }

    /// Entries left in the scratch base after an install.
    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.scratch()) {
            Ok(entries) => entries
                .map(|e| e.expect("scratch entry").path())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
