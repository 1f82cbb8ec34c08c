//! cli
//!
//! Command-line interface layer for Deckhand.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Map outcomes to process exit codes
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! the [`crate::stack`] controller or the [`crate::boot`] orchestrator.
//! Unknown arguments print usage and exit with status 1; exit statuses
//! from backing tools and launched processes propagate unchanged.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Project config file override.
    pub config: Option<PathBuf>,
    /// Output verbosity.
    pub verbosity: Verbosity,
}

impl Context {
    /// The project directory commands operate in.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            config: None,
            verbosity: Verbosity::Normal,
        }
    }
}

/// Run the CLI application, returning the process exit code.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<i32> {
    // clap's default error path exits with status 2; unknown arguments are
    // a plain user error here and exit 1 with usage shown.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            err.print()?;
            return Ok(code);
        }
    };

    let ctx = Context {
        cwd: cli.cwd.clone(),
        config: cli.config.clone(),
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };

    commands::dispatch(cli.command, &ctx)
}
