//! External command execution.
//!
//! Every subprocess the installer starts (`svn`, `git`, `make`,
//! `python`, ...) goes through [`CommandRunner`] so tests can substitute a
//! recording double for the real [`SystemRunner`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{InstallError, Result};

/// A fully described command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external commands. `Err` means the program could not be started.
pub trait CommandRunner: fmt::Debug + Send + Sync {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// Runs commands with [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<CommandOutput> {
        debug!(command = %spec, cwd = ?spec.cwd, "Running command");
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        let output = cmd.output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and treat a non-zero exit or a start failure as a build
/// error naming the command.
pub fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> Result<CommandOutput> {
    let output = runner.run(spec).map_err(|e| InstallError::BuildFailed {
        command: spec.to_string(),
        status: "could not be started".to_string(),
        stderr: e.to_string(),
    })?;
    if !output.is_success() {
        return Err(InstallError::BuildFailed {
            command: spec.to_string(),
            status: output.status_label(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}
