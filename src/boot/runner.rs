//! boot::runner
//!
//! Process execution seam for the run-mode launcher.
//!
//! # Design
//!
//! The launcher needs two process shapes: setup steps that run to
//! completion (migrate, asset collection) and the final hand-off to the
//! long-running application. Both flow through the `ProcessRunner` trait so
//! tests can assert call order without spawning anything.
//!
//! The real runner hands off via `exec(2)`: the application replaces the
//! launcher as the container's primary process and receives its signals
//! directly, with no supervising wrapper left in the signal path.

use std::process::{Command, ExitStatus};

use thiserror::Error;

/// An external command in argv form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    /// Build a spec from an argv vector.
    pub fn new(argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a spec from a configured argv vector; `None` when the vector
    /// is empty (the step is disabled or unconfigured).
    pub fn from_config(argv: &[String]) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Self {
                argv: argv.to_vec(),
            })
        }
    }

    /// Substitute `{name}` placeholders in every argument.
    ///
    /// Placeholders without a binding are left verbatim.
    pub fn substituted(&self, vars: &[(&str, String)]) -> Self {
        let argv = self
            .argv
            .iter()
            .map(|arg| {
                let mut arg = arg.clone();
                for (name, value) in vars {
                    arg = arg.replace(&format!("{{{name}}}"), value);
                }
                arg
            })
            .collect();
        Self { argv }
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or(&[])
    }

    /// Shell-style rendering for log lines.
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Errors from process execution.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("failed to start `{command}`: {source}")]
    SpawnFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("failed to exec `{command}`: {source}")]
    ExecFailed {
        command: String,
        source: std::io::Error,
    },
}

/// Seam between the launcher and real processes.
pub trait ProcessRunner {
    /// Run a setup step to completion, returning its exit code.
    fn run(&mut self, spec: &CommandSpec) -> Result<i32, RunnerError>;

    /// Hand the process image over to the long-running command.
    ///
    /// A successful `exec(2)` never returns; the `Ok` arm exists for
    /// runners that cannot replace the process (the non-unix fallback and
    /// test doubles) and carries the child's exit code, propagated
    /// unchanged.
    fn exec(&mut self, spec: &CommandSpec) -> Result<i32, RunnerError>;
}

/// Real runner backed by `std::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecRunner;

impl ProcessRunner for ExecRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<i32, RunnerError> {
        let program = spec.program().ok_or(RunnerError::EmptyCommand)?;
        let status = Command::new(program)
            .args(spec.args())
            .status()
            .map_err(|source| RunnerError::SpawnFailed {
                command: spec.display(),
                source,
            })?;
        Ok(exit_code_of(status))
    }

    #[cfg(unix)]
    fn exec(&mut self, spec: &CommandSpec) -> Result<i32, RunnerError> {
        use std::os::unix::process::CommandExt;

        let program = spec.program().ok_or(RunnerError::EmptyCommand)?;
        // exec returns only on failure.
        let source = Command::new(program).args(spec.args()).exec();
        Err(RunnerError::ExecFailed {
            command: spec.display(),
            source,
        })
    }

    #[cfg(not(unix))]
    fn exec(&mut self, spec: &CommandSpec) -> Result<i32, RunnerError> {
        // No process replacement available; spawn, wait, and propagate the
        // child's status unchanged.
        self.run(spec)
    }
}

/// Map an `ExitStatus` to the code the shell convention expects:
/// the exit code when the process exited, 128 + signal when it was killed.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
