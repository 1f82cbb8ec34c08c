//! backend
//!
//! Single seam for all container-runtime operations.
//!
//! # Design
//!
//! The lifecycle controller never shells out directly; every network and
//! compose operation flows through the `Backend` trait. The real
//! implementation drives the `docker` CLI, the mock records operations for
//! deterministic tests.
//!
//! Failures surface the backing tool's exit status verbatim. The backend
//! never retries; retries are an operator decision.

pub mod docker;
pub mod mock;

pub use docker::DockerBackend;
pub use mock::{FailOn, MockBackend, MockOperation};

use std::path::Path;

use thiserror::Error;

/// Errors from container-runtime operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backing tool could not be started at all.
    #[error("failed to invoke `{tool}`: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    /// The backing tool ran and exited unsuccessfully.
    #[error("`{command}` exited with status {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// A foreground command (output already streamed) exited unsuccessfully.
    #[error("`{command}` exited with status {code}")]
    ForegroundFailed { command: String, code: i32 },

    /// The backing tool produced output we could not interpret.
    #[error("unexpected output from `{command}`: {message}")]
    BadOutput { command: String, message: String },
}

impl BackendError {
    /// The backing tool's exit status, when one exists to propagate.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BackendError::CommandFailed { code, .. }
            | BackendError::ForegroundFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Container-runtime operations the lifecycle controller depends on.
pub trait Backend {
    /// Whether the named network exists.
    fn network_exists(&self, name: &str) -> Result<bool, BackendError>;

    /// Create the named network. Callers check existence first; this is
    /// not itself idempotent.
    fn create_network(&self, name: &str) -> Result<(), BackendError>;

    /// Stop and remove the stack's containers. `remove_volumes` also
    /// destroys named volumes (destructive, opt-in only).
    fn compose_down(&self, compose_file: &Path, remove_volumes: bool) -> Result<(), BackendError>;

    /// Build and start the stack in the foreground, streaming output to
    /// the operator's terminal. Blocks for the lifetime of the stack and
    /// returns its exit code unchanged.
    fn compose_up(&self, compose_file: &Path) -> Result<i32, BackendError>;
}
