//! backend::mock
//!
//! Mock backend implementation for deterministic testing.
//!
//! # Design
//!
//! The mock backend keeps network and volume state in memory, records every
//! operation for verification, and allows configuring failure scenarios.
//!
//! # Example
//!
//! ```
//! use deckhand::backend::{Backend, MockBackend, MockOperation};
//! use std::path::Path;
//!
//! let backend = MockBackend::new().with_network("stack-net");
//!
//! assert!(backend.network_exists("stack-net").unwrap());
//! assert!(!backend.network_exists("other-net").unwrap());
//!
//! backend.compose_down(Path::new("docker-compose.yml"), false).unwrap();
//! assert!(matches!(
//!     backend.operations().last(),
//!     Some(MockOperation::ComposeDown { .. })
//! ));
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{Backend, BackendError};

/// Mock backend for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockBackendInner {
    /// Existing networks.
    networks: BTreeSet<String>,
    /// Named volumes owned by the stack.
    volumes: BTreeSet<String>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Exit code `compose_up` reports after the stack stops.
    up_exit_code: i32,
}

/// Configuration for which operation should fail, with the exit status the
/// pretend tool reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    NetworkExists { code: i32 },
    CreateNetwork { code: i32 },
    ComposeDown { code: i32 },
    ComposeUp { code: i32 },
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    NetworkExists {
        name: String,
    },
    CreateNetwork {
        name: String,
    },
    ComposeDown {
        compose_file: PathBuf,
        remove_volumes: bool,
    },
    ComposeUp {
        compose_file: PathBuf,
    },
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed an existing network.
    pub fn with_network(self, name: impl Into<String>) -> Self {
        self.inner.lock().unwrap().networks.insert(name.into());
        self
    }

    /// Pre-seed a named volume owned by the stack.
    pub fn with_volume(self, name: impl Into<String>) -> Self {
        self.inner.lock().unwrap().volumes.insert(name.into());
        self
    }

    /// Configure one operation to fail.
    pub fn fail_on(self, fail: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail);
        self
    }

    /// Configure the exit code `compose_up` returns.
    pub fn with_up_exit_code(self, code: i32) -> Self {
        self.inner.lock().unwrap().up_exit_code = code;
        self
    }

    /// All operations recorded so far, in order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Current network names.
    pub fn networks(&self) -> Vec<String> {
        self.inner.lock().unwrap().networks.iter().cloned().collect()
    }

    /// Current volume names.
    pub fn volumes(&self) -> Vec<String> {
        self.inner.lock().unwrap().volumes.iter().cloned().collect()
    }

    fn failure(command: &str, code: i32) -> BackendError {
        BackendError::CommandFailed {
            command: command.to_string(),
            code,
            stderr: "mock failure".to_string(),
        }
    }
}

impl Backend for MockBackend {
    fn network_exists(&self, name: &str) -> Result<bool, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::NetworkExists {
            name: name.to_string(),
        });
        if let Some(FailOn::NetworkExists { code }) = inner.fail_on {
            return Err(Self::failure("network inspect", code));
        }
        Ok(inner.networks.contains(name))
    }

    fn create_network(&self, name: &str) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CreateNetwork {
            name: name.to_string(),
        });
        if let Some(FailOn::CreateNetwork { code }) = inner.fail_on {
            return Err(Self::failure("network create", code));
        }
        inner.networks.insert(name.to_string());
        Ok(())
    }

    fn compose_down(&self, compose_file: &Path, remove_volumes: bool) -> Result<(), BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::ComposeDown {
            compose_file: compose_file.to_path_buf(),
            remove_volumes,
        });
        if let Some(FailOn::ComposeDown { code }) = inner.fail_on {
            return Err(Self::failure("compose down", code));
        }
        if remove_volumes {
            inner.volumes.clear();
        }
        Ok(())
    }

    fn compose_up(&self, compose_file: &Path) -> Result<i32, BackendError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::ComposeUp {
            compose_file: compose_file.to_path_buf(),
        });
        if let Some(FailOn::ComposeUp { code }) = inner.fail_on {
            return Err(Self::failure("compose up", code));
        }
        Ok(inner.up_exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_operations_in_order() {
        let backend = MockBackend::new();
        backend.network_exists("net").unwrap();
        backend.create_network("net").unwrap();
        backend.compose_up(Path::new("compose.yml")).unwrap();

        let ops = backend.operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[0],
            MockOperation::NetworkExists {
                name: "net".to_string()
            }
        );
        assert!(matches!(ops[2], MockOperation::ComposeUp { .. }));
    }

    #[test]
    fn volumes_cleared_only_on_remove() {
        let backend = MockBackend::new().with_volume("db-data");
        backend.compose_down(Path::new("c.yml"), false).unwrap();
        assert_eq!(backend.volumes(), vec!["db-data".to_string()]);

        backend.compose_down(Path::new("c.yml"), true).unwrap();
        assert!(backend.volumes().is_empty());
    }

    #[test]
    fn configured_failure_surfaces() {
        let backend = MockBackend::new().fail_on(FailOn::ComposeUp { code: 3 });
        let err = backend.compose_up(Path::new("c.yml")).unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
    }
}
