//! Non-happy path tests for the install lifecycle.
//!
//! Every failure must leave the working directory where it was and remove
//! the scratch checkout, without touching anything it did not create.

mod support;

use std::sync::Arc;

use lvminstall_core::commands::{InstallCommand, InstallOptions};
use lvminstall_core::config::Registry;
use lvminstall_core::env::EnvSnapshot;
use lvminstall_core::error::{ErrorKind, InstallError};

use support::{FakeHttp, FakeRunner, LVMUTIL_TREE, Sandbox, cwd_lock, tarball, write_tree};

fn command(sandbox: &Sandbox, runner: FakeRunner, status: u16) -> InstallCommand {
    InstallCommand::new(sandbox.context(
        EnvSnapshot::default(),
        Registry::default(),
        Arc::new(runner),
        Arc::new(FakeHttp::new(status, tarball("lvmutil-1.0.0", &LVMUTIL_TREE))),
    ))
}

#[test]
fn build_failure_still_cleans_up() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let cmd = command(
        &sandbox,
        FakeRunner::with_tree(&LVMUTIL_TREE).failing("make install"),
        200,
    );
    let cwd_before = std::env::current_dir().expect("cwd");

    let err = cmd
        .execute(&InstallOptions::new("lvmutil", "1.0.0").with_root(sandbox.root()))
        .expect_err("Build should fail");

    assert!(matches!(err, InstallError::BuildFailed { .. }));
    assert_eq!(err.kind(), ErrorKind::Build);
    assert!(err.to_string().contains("make install"));
    assert_eq!(std::env::current_dir().expect("cwd"), cwd_before);
    assert!(sandbox.scratch_entries().is_empty());
    // The install directory is never removed by cleanup.
    assert!(sandbox.root().join("code/lvmutil/1.0.0/Makefile").is_file());
}

#[test]
fn missing_github_version_fails_validation() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let runner = FakeRunner::with_tree(&LVMUTIL_TREE);
    let cmd = command(&sandbox, runner, 404);

    let err = cmd
        .execute(&InstallOptions::new("lvmutil", "9.9.9").with_root(sandbox.root()))
        .expect_err("Validation should fail");

    assert_eq!(
        err.to_string(),
        "Error 404 querying GitHub URL: https://github.com/desihub/lvmutil/archive/9.9.9.tar.gz."
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!sandbox.scratch().exists());
}

#[test]
fn invalid_svn_path_fails_validation() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let runner = Arc::new(FakeRunner::with_tree(&LVMUTIL_TREE).failing(" ls "));
    let cmd = InstallCommand::new(sandbox.context(
        EnvSnapshot::default(),
        Registry::default(),
        runner.clone(),
        Arc::new(FakeHttp::new(200, Vec::new())),
    ));

    let err = cmd
        .execute(&InstallOptions::new("desiAdmin", "0.0.0").with_root(sandbox.root()))
        .expect_err("Validation should fail");

    assert_eq!(
        err.to_string(),
        "https://desi.lbl.gov/svn/code/tools/desiAdmin/tags/0.0.0 does not appear to be a valid svn product/version!"
    );
    assert_eq!(runner.calls().len(), 1);
}

#[test]
fn existing_install_without_force_names_path() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let install_dir = sandbox.root().join("code/lvmutil/1.0.0");
    write_tree(&install_dir, &[("keep.txt", "mine")]);
    let cmd = command(&sandbox, FakeRunner::with_tree(&LVMUTIL_TREE), 200);

    let err = cmd
        .execute(&InstallOptions::new("lvmutil", "1.0.0").with_root(sandbox.root()))
        .expect_err("Existing install should be refused");

    assert_eq!(
        err.to_string(),
        format!("Install directory, {}, already exists!", install_dir.display())
    );
    assert!(install_dir.join("keep.txt").is_file());
    assert!(sandbox.scratch_entries().is_empty());
}

#[test]
fn module_dir_without_modules_is_refused_before_building() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let runner = Arc::new(FakeRunner::with_tree(&LVMUTIL_TREE));
    let cmd = InstallCommand::new(sandbox.context(
        EnvSnapshot::default(),
        Registry::default(),
        runner.clone(),
        Arc::new(FakeHttp::new(200, tarball("lvmutil-1.0.0", &LVMUTIL_TREE))),
    ));

    let err = cmd
        .execute(
            &InstallOptions::new("lvmutil", "1.0.0")
                .with_root(sandbox.root())
                .with_moduledir(sandbox.moduledir()),
        )
        .expect_err("Modules are required");
    assert!(matches!(err, InstallError::ModulesNotSetUp));

    let err = cmd
        .execute(
            &InstallOptions::new("lvmutil", "1.0.0")
                .with_root(sandbox.root())
                .with_moduledir(sandbox.moduledir())
                .with_moduleshome(sandbox.path().join("no-modules")),
        )
        .expect_err("Modules must be initialized");
    assert!(err.to_string().starts_with("Could not initialize Modules with MODULESHOME="));

    assert!(!runner.calls().iter().any(|c| c.starts_with("make")));
    assert!(!sandbox.root().join("code/lvmutil/1.0.0").exists());
}

#[test]
fn missing_product_creates_nothing() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let runner = Arc::new(FakeRunner::default());
    let cmd = InstallCommand::new(sandbox.context(
        EnvSnapshot::default(),
        Registry::default(),
        runner.clone(),
        Arc::new(FakeHttp::new(200, Vec::new())),
    ));

    let err = cmd
        .execute(&InstallOptions::default())
        .expect_err("Product and version are required");

    assert_eq!(err.to_string(), "You must specify a product and a version!");
    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(runner.calls().is_empty());
    assert!(!sandbox.scratch().exists());
}

#[test]
fn missing_configuration_file_is_an_error() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let cmd = command(&sandbox, FakeRunner::default(), 200);

    let err = cmd
        .execute(
            &InstallOptions::new("lvmutil", "1.0.0")
                .with_root(sandbox.root())
                .with_config_file(sandbox.path().join("missing.ini")),
        )
        .expect_err("Missing configuration should fail");

    assert!(matches!(err, InstallError::Config { .. }));
}

#[test]
fn no_root_off_nersc_is_a_planning_error() {
    let _cwd = cwd_lock();
    let sandbox = Sandbox::new();
    let cmd = command(&sandbox, FakeRunner::with_tree(&LVMUTIL_TREE), 200);

    let err = cmd
        .execute(&InstallOptions::new("lvmutil", "1.0.0"))
        .expect_err("An install root is required");

    assert!(matches!(err, InstallError::NoInstallRoot));
    assert_eq!(err.kind(), ErrorKind::Planning);
    assert!(sandbox.scratch_entries().is_empty());
}
