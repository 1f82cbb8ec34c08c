//! stack::lock
//!
//! Advisory lock over host-level provisioning.
//!
//! # Architecture
//!
//! Provisioning steps (config seeding, network ensure) are idempotent on
//! their own; the lock additionally serializes concurrent controller
//! invocations so their create-if-absent checks cannot interleave. It is
//! dropped before bring-up, which runs for the lifetime of the stack.
//!
//! # Invariants
//!
//! - Lock is automatically released on drop (RAII pattern)
//! - `try_acquire` fails fast if another invocation holds the lock
//! - Absence of the lock never changes provisioning outcomes, only timing

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Lock file name, resolved against the project directory.
pub const LOCK_FILE: &str = ".deckhand.lock";

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another controller invocation already holds the lock.
    #[error("another deckhand invocation is provisioning this project")]
    AlreadyLocked,

    /// I/O error during lock operations.
    #[error("lock i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// An exclusive lock on a project's provisioning window.
///
/// Released when dropped, even on panic.
#[derive(Debug)]
pub struct ProvisionLock {
    file: File,
    path: PathBuf,
}

impl ProvisionLock {
    /// Acquire the lock, blocking until it is free.
    pub fn acquire(project_dir: &Path) -> Result<Self, LockError> {
        let (file, path) = Self::open(project_dir)?;
        file.lock_exclusive()?;
        Ok(Self { file, path })
    }

    /// Acquire the lock without blocking.
    pub fn try_acquire(project_dir: &Path) -> Result<Self, LockError> {
        let (file, path) = Self::open(project_dir)?;
        file.try_lock_exclusive().map_err(|err| {
            if err.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                LockError::AlreadyLocked
            } else {
                LockError::Io(err)
            }
        })?;
        Ok(Self { file, path })
    }

    fn open(project_dir: &Path) -> Result<(File, PathBuf), LockError> {
        let path = project_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        Ok((file, path))
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProvisionLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let lock = ProvisionLock::try_acquire(dir.path()).unwrap();
        assert!(lock.path().exists());
        drop(lock);
        // Reacquirable after release.
        ProvisionLock::try_acquire(dir.path()).unwrap();
    }

    #[test]
    fn second_acquisition_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let _held = ProvisionLock::try_acquire(dir.path()).unwrap();
        let err = ProvisionLock::try_acquire(dir.path()).unwrap_err();
        assert!(matches!(err, LockError::AlreadyLocked));
    }
}
