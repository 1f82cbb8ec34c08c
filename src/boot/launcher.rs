//! boot::launcher
//!
//! Run-mode launcher: one-time setup, then hand-off.
//!
//! # Launcher Contract
//!
//! The launcher MUST:
//! 1. Pass the readiness gate before anything else
//! 2. In server mode: apply migrations, abort on any nonzero status
//! 3. In server mode: run asset collection only when configured; its
//!    absence must not change the rest of the sequence
//! 4. Publish the readiness marker only after a successful migration
//! 5. In worker mode: never invoke the migration step
//! 6. Hand off via the runner's `exec`, so the application receives
//!    container signals directly
//!
//! # Observable phases
//!
//! Ordered phase lines mark "waiting", "migrating", "starting" so a failed
//! startup can be placed in its phase from logs alone.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::boot::gate::{self, GateError, GatePolicy};
use crate::boot::modes::RunMode;
use crate::boot::probe::Probe;
use crate::boot::runner::{CommandSpec, ProcessRunner, RunnerError};
use crate::config::{GateEnv, Settings};
use crate::ui::output::{self, Verbosity};

/// Errors from the run-mode launcher.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Migrations exited nonzero. Serving with an unmigrated schema is
    /// never acceptable, so this aborts startup.
    #[error("migration failed with status {code}")]
    MigrationFailed { code: i32 },

    #[error("asset collection failed with status {code}")]
    AssetCollectionFailed { code: i32 },

    #[error("no {what} command configured under [app]")]
    MissingCommand { what: &'static str },

    #[error("failed to publish readiness marker '{path}': {source}")]
    MarkerWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

impl LaunchError {
    /// Exit code for the container. Child statuses propagate unchanged;
    /// everything else is a plain failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::MigrationFailed { code }
            | LaunchError::AssetCollectionFailed { code } => *code,
            _ => 1,
        }
    }
}

/// Gate dependencies, perform mode-specific setup, then hand off.
///
/// On a successful unix hand-off this never returns. The `Ok` value is the
/// exit code to propagate when the runner cannot replace the process.
pub async fn launch(
    mode: RunMode,
    settings: &Settings,
    env: &GateEnv,
    probe: Arc<dyn Probe>,
    runner: &mut dyn ProcessRunner,
    verbosity: Verbosity,
) -> Result<i32, LaunchError> {
    let policy = GatePolicy::from(&settings.gate);
    let endpoints = settings.gate.topology.gated_endpoints(env);
    gate::wait_for_endpoints(probe, &endpoints, &policy, verbosity).await?;

    match mode {
        RunMode::Server => launch_server(settings, runner, verbosity),
        RunMode::Worker => launch_worker(settings, &policy, runner, verbosity).await,
    }
}

fn launch_server(
    settings: &Settings,
    runner: &mut dyn ProcessRunner,
    verbosity: Verbosity,
) -> Result<i32, LaunchError> {
    let migrate = CommandSpec::from_config(&settings.app.migrate)
        .ok_or(LaunchError::MissingCommand { what: "migrate" })?;
    let server = CommandSpec::from_config(&settings.app.server)
        .ok_or(LaunchError::MissingCommand { what: "server" })?
        .substituted(&[
            ("bind", settings.server.bind.clone()),
            ("workers", settings.server.workers.to_string()),
        ]);

    output::phase(
        format!("applying pending migrations: {}", migrate.display()),
        verbosity,
    );
    let code = runner.run(&migrate)?;
    if code != 0 {
        return Err(LaunchError::MigrationFailed { code });
    }

    if let Some(assets) = CommandSpec::from_config(&settings.app.collect_assets) {
        output::phase(
            format!("collecting static assets: {}", assets.display()),
            verbosity,
        );
        let code = runner.run(&assets)?;
        if code != 0 {
            return Err(LaunchError::AssetCollectionFailed { code });
        }
    }

    if let Some(marker) = &settings.gate.ready_marker {
        publish_marker(marker)?;
        output::debug(
            format!("published readiness marker '{}'", marker.display()),
            verbosity,
        );
    }

    output::phase(
        format!(
            "starting http server on {} ({} workers)",
            settings.server.bind, settings.server.workers
        ),
        verbosity,
    );
    Ok(runner.exec(&server)?)
}

async fn launch_worker(
    settings: &Settings,
    policy: &GatePolicy,
    runner: &mut dyn ProcessRunner,
    verbosity: Verbosity,
) -> Result<i32, LaunchError> {
    let worker = CommandSpec::from_config(&settings.app.worker)
        .ok_or(LaunchError::MissingCommand { what: "worker" })?
        .substituted(&[("loglevel", settings.worker.loglevel.clone())]);

    if let Some(marker) = &settings.gate.ready_marker {
        gate::wait_for_marker(marker, policy, verbosity).await?;
    }

    output::phase(
        format!("starting worker (loglevel {})", settings.worker.loglevel),
        verbosity,
    );
    Ok(runner.exec(&worker)?)
}

/// Write the schema-ready marker, creating parent directories as needed.
fn publish_marker(path: &Path) -> Result<(), LaunchError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, b"ready\n")
    };
    write().map_err(|source| LaunchError::MarkerWrite {
        path: path.to_path_buf(),
        source,
    })
}
