//! stack
//!
//! Host-side lifecycle controller for the multi-container stack.
//!
//! # Architecture
//!
//! Bring-up is a linear state machine, never concurrent with itself:
//!
//! ```text
//! Config ensure -> Permission ensure -> Network ensure -> Teardown -> Bring-up
//! ```
//!
//! 1. **Config ensure**: seed the env file from its template if absent;
//!    fatal when both are missing
//! 2. **Permission ensure**: mark entrypoint scripts executable, best effort
//! 3. **Network ensure**: create the shared network only if absent
//! 4. **Teardown**: stop and remove the previous stack instance; the reset
//!    flag additionally destroys volumes (explicit opt-in only)
//! 5. **Bring-up**: build and start the stack in the foreground
//!
//! # Failure semantics
//!
//! Every step that can fail propagates the backing tool's exit status; the
//! controller never retries. Retries are an operator decision.

pub mod lock;
pub mod network;
pub mod seed;

// Re-exports for convenience
pub use lock::{LockError, ProvisionLock};
pub use network::{ensure_network, NetworkOutcome};
pub use seed::{ensure_env_file, SeedError, SeedOutcome};

use std::path::Path;

use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::config::{Settings, StackSection};
use crate::ui::output::{self, Verbosity};

/// Which stack definition file the controller drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// The production-shaped default stack.
    #[default]
    Default,
    /// The development stack.
    Development,
}

impl Profile {
    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            Profile::Development
        } else {
            Profile::Default
        }
    }

    /// The compose file this profile drives.
    pub fn compose_file<'a>(&self, stack: &'a StackSection) -> &'a Path {
        match self {
            Profile::Default => &stack.compose_file,
            Profile::Development => &stack.dev_compose_file,
        }
    }
}

/// Options for bring-up.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpOptions {
    pub profile: Profile,
    /// Destroy the stack's persistent volumes during teardown.
    pub reset: bool,
}

/// Errors from the lifecycle controller.
#[derive(Debug, Error)]
pub enum StackError {
    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StackError {
    /// Exit code for the controller: the backing tool's status when one
    /// exists, otherwise a plain failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StackError::Backend(err) => err.exit_code().unwrap_or(1),
            _ => 1,
        }
    }
}

/// Bring the full stack to a running state.
///
/// Blocks in the foreground for the lifetime of the stack and returns its
/// exit code unchanged.
pub fn bring_up(
    backend: &dyn Backend,
    settings: &Settings,
    project_dir: &Path,
    opts: &UpOptions,
    verbosity: Verbosity,
) -> Result<i32, StackError> {
    let stack = &settings.stack;

    // Provisioning runs under the advisory lock; it is released before the
    // long-lived bring-up so concurrent invocations fail on their own merits.
    {
        let _lock = ProvisionLock::acquire(project_dir)?;

        let env_file = project_dir.join(&stack.env_file);
        let template = project_dir.join(&stack.env_template);
        match ensure_env_file(&env_file, &template)? {
            SeedOutcome::Seeded => output::print(
                format!(
                    "created '{}' from '{}'",
                    stack.env_file.display(),
                    stack.env_template.display()
                ),
                verbosity,
            ),
            SeedOutcome::AlreadyPresent => output::debug(
                format!("'{}' already present, left untouched", stack.env_file.display()),
                verbosity,
            ),
        }

        ensure_entrypoint_permissions(&stack.entrypoints, project_dir, verbosity);

        match ensure_network(backend, &stack.network)? {
            NetworkOutcome::Created => {
                output::print(format!("created network '{}'", stack.network), verbosity)
            }
            NetworkOutcome::AlreadyPresent => output::debug(
                format!("network '{}' already present", stack.network),
                verbosity,
            ),
        }
    }

    let compose_file = opts.profile.compose_file(stack);

    if opts.reset {
        output::warn(
            "reset requested: removing the stack's persistent volumes",
            verbosity,
        );
    }
    backend.compose_down(compose_file, opts.reset)?;

    output::print(
        format!("bringing stack up from '{}'", compose_file.display()),
        verbosity,
    );
    let code = backend.compose_up(compose_file)?;
    Ok(code)
}

/// Stop and remove the stack's containers without bringing it back up.
pub fn tear_down(
    backend: &dyn Backend,
    settings: &Settings,
    profile: Profile,
    remove_volumes: bool,
    verbosity: Verbosity,
) -> Result<(), StackError> {
    let compose_file = profile.compose_file(&settings.stack);
    if remove_volumes {
        output::warn(
            "removing the stack's persistent volumes",
            verbosity,
        );
    }
    backend.compose_down(compose_file, remove_volumes)?;
    Ok(())
}

/// Mark entrypoint scripts executable. Best effort: failures are logged
/// and tolerated (read-only checkouts, already-correct modes).
fn ensure_entrypoint_permissions(entrypoints: &[std::path::PathBuf], project_dir: &Path, verbosity: Verbosity) {
    for entrypoint in entrypoints {
        let path = project_dir.join(entrypoint);
        if let Err(err) = mark_executable(&path) {
            output::warn(
                format!(
                    "could not mark '{}' executable: {err}",
                    entrypoint.display()
                ),
                verbosity,
            );
        }
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_selects_compose_file() {
        let stack = StackSection::default();
        assert_eq!(
            Profile::Default.compose_file(&stack),
            Path::new("docker-compose.yml")
        );
        assert_eq!(
            Profile::Development.compose_file(&stack),
            Path::new("docker-compose.dev.yml")
        );
        assert_eq!(Profile::from_dev_flag(true), Profile::Development);
        assert_eq!(Profile::from_dev_flag(false), Profile::Default);
    }

    #[cfg(unix)]
    #[test]
    fn permission_ensure_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        // Must not panic or error out.
        ensure_entrypoint_permissions(
            &[std::path::PathBuf::from("does-not-exist.sh")],
            dir.path(),
            Verbosity::Quiet,
        );
    }

    #[cfg(unix)]
    #[test]
    fn permission_ensure_sets_execute_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("entrypoint.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        let mut permissions = std::fs::metadata(&script).unwrap().permissions();
        permissions.set_mode(0o644);
        std::fs::set_permissions(&script, permissions).unwrap();

        ensure_entrypoint_permissions(
            &[std::path::PathBuf::from("entrypoint.sh")],
            dir.path(),
            Verbosity::Quiet,
        );

        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
