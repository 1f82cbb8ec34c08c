//! Integration tests for the lifecycle controller.
//!
//! These tests drive the full bring-up state machine against the mock
//! backend and a real temporary project directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use deckhand::backend::{FailOn, MockBackend, MockOperation};
use deckhand::config::Settings;
use deckhand::stack::{self, Profile, ProvisionLock, SeedError, StackError, UpOptions};
use deckhand::ui::Verbosity;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Temporary project directory with an env-file template in place.
struct TestProject {
    dir: TempDir,
    settings: Settings,
}

impl TestProject {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let settings = Settings::default();
        dir.child(settings.stack.env_template.as_path())
            .write_str("CACHE_HOST=cache\nCACHE_PORT=6379\n")
            .unwrap();
        Self { dir, settings }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn env_file(&self) -> PathBuf {
        self.path().join(&self.settings.stack.env_file)
    }

    fn bring_up(&self, backend: &MockBackend, opts: &UpOptions) -> Result<i32, StackError> {
        stack::bring_up(backend, &self.settings, self.path(), opts, Verbosity::Quiet)
    }
}

// =============================================================================
// Config ensure
// =============================================================================

#[test]
fn seeds_env_file_on_first_run_only() {
    let project = TestProject::new();
    let backend = MockBackend::new();

    project.bring_up(&backend, &UpOptions::default()).unwrap();
    project
        .dir
        .child(".env")
        .assert(predicate::path::exists());
    let seeded = fs::read(project.env_file()).unwrap();
    assert_eq!(seeded, b"CACHE_HOST=cache\nCACHE_PORT=6379\n");

    // Operator edits survive every later invocation byte-for-byte.
    fs::write(project.env_file(), "CACHE_HOST=edited\n").unwrap();
    project.bring_up(&backend, &UpOptions::default()).unwrap();
    assert_eq!(fs::read(project.env_file()).unwrap(), b"CACHE_HOST=edited\n");
}

#[test]
fn missing_config_and_template_is_fatal_with_no_side_effects() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::default();
    let backend = MockBackend::new();

    let err = stack::bring_up(
        &backend,
        &settings,
        dir.path(),
        &UpOptions::default(),
        Verbosity::Quiet,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StackError::Seed(SeedError::ConfigMissing { .. })
    ));
    // Nothing was provisioned or torn down.
    assert!(backend.operations().is_empty());
}

// =============================================================================
// Network ensure
// =============================================================================

#[test]
fn network_created_only_when_absent() {
    let project = TestProject::new();
    let backend = MockBackend::new();

    project.bring_up(&backend, &UpOptions::default()).unwrap();
    assert_eq!(backend.networks(), vec!["stack-net".to_string()]);

    // Second run: inspect only, no duplicate create, no error.
    project.bring_up(&backend, &UpOptions::default()).unwrap();
    let creates = backend
        .operations()
        .iter()
        .filter(|op| matches!(op, MockOperation::CreateNetwork { .. }))
        .count();
    assert_eq!(creates, 1);
    assert_eq!(backend.networks(), vec!["stack-net".to_string()]);
}

// =============================================================================
// Teardown and reset semantics
// =============================================================================

#[test]
fn plain_teardown_leaves_volumes_intact() {
    let project = TestProject::new();
    let backend = MockBackend::new().with_volume("db-data");

    project.bring_up(&backend, &UpOptions::default()).unwrap();

    assert_eq!(backend.volumes(), vec!["db-data".to_string()]);
    assert!(backend.operations().iter().any(|op| matches!(
        op,
        MockOperation::ComposeDown {
            remove_volumes: false,
            ..
        }
    )));
}

#[test]
fn reset_removes_volumes() {
    let project = TestProject::new();
    let backend = MockBackend::new().with_volume("db-data");

    let opts = UpOptions {
        reset: true,
        ..Default::default()
    };
    project.bring_up(&backend, &opts).unwrap();

    assert!(backend.volumes().is_empty());
    assert!(backend.operations().iter().any(|op| matches!(
        op,
        MockOperation::ComposeDown {
            remove_volumes: true,
            ..
        }
    )));
}

#[test]
fn teardown_precedes_bring_up() {
    let project = TestProject::new();
    let backend = MockBackend::new();

    project.bring_up(&backend, &UpOptions::default()).unwrap();

    let ops = backend.operations();
    let down_at = ops
        .iter()
        .position(|op| matches!(op, MockOperation::ComposeDown { .. }))
        .expect("teardown must run");
    let up_at = ops
        .iter()
        .position(|op| matches!(op, MockOperation::ComposeUp { .. }))
        .expect("bring-up must run");
    assert!(down_at < up_at);
}

#[test]
fn development_profile_drives_the_dev_compose_file() {
    let project = TestProject::new();
    let backend = MockBackend::new();

    let opts = UpOptions {
        profile: Profile::Development,
        ..Default::default()
    };
    project.bring_up(&backend, &opts).unwrap();

    assert!(backend.operations().iter().any(|op| matches!(
        op,
        MockOperation::ComposeUp { compose_file } if compose_file == Path::new("docker-compose.dev.yml")
    )));
}

// =============================================================================
// Failure propagation
// =============================================================================

#[test]
fn compose_failure_status_propagates_verbatim() {
    let project = TestProject::new();
    let backend = MockBackend::new().fail_on(FailOn::ComposeUp { code: 17 });

    let err = project
        .bring_up(&backend, &UpOptions::default())
        .unwrap_err();
    assert_eq!(err.exit_code(), 17);
}

#[test]
fn stack_exit_code_propagates_verbatim() {
    let project = TestProject::new();
    let backend = MockBackend::new().with_up_exit_code(130);

    let code = project.bring_up(&backend, &UpOptions::default()).unwrap();
    assert_eq!(code, 130);
}

#[test]
fn network_failure_stops_before_teardown() {
    let project = TestProject::new();
    let backend = MockBackend::new().fail_on(FailOn::NetworkExists { code: 125 });

    let err = project
        .bring_up(&backend, &UpOptions::default())
        .unwrap_err();
    assert_eq!(err.exit_code(), 125);
    assert!(!backend
        .operations()
        .iter()
        .any(|op| matches!(op, MockOperation::ComposeDown { .. })));
}

// =============================================================================
// Down
// =============================================================================

#[test]
fn down_never_brings_the_stack_up() {
    let project = TestProject::new();
    let backend = MockBackend::new().with_volume("db-data");

    stack::tear_down(
        &backend,
        &project.settings,
        Profile::Default,
        false,
        Verbosity::Quiet,
    )
    .unwrap();

    let ops = backend.operations();
    assert_eq!(ops.len(), 1);
    assert!(matches!(
        ops[0],
        MockOperation::ComposeDown {
            remove_volumes: false,
            ..
        }
    ));
    assert_eq!(backend.volumes(), vec!["db-data".to_string()]);

    // Volumes go away only through the explicit flag.
    stack::tear_down(
        &backend,
        &project.settings,
        Profile::Default,
        true,
        Verbosity::Quiet,
    )
    .unwrap();
    assert!(backend.volumes().is_empty());
}

// =============================================================================
// Provisioning lock
// =============================================================================

#[test]
fn provision_lock_excludes_concurrent_holders() {
    let dir = TempDir::new().unwrap();
    let held = ProvisionLock::try_acquire(dir.path()).unwrap();
    assert!(ProvisionLock::try_acquire(dir.path()).is_err());
    drop(held);
    assert!(ProvisionLock::try_acquire(dir.path()).is_ok());
}
