//! serve / work commands - container bootstrap entrypoints
//!
//! Both run the same shape: load settings, read the gate environment,
//! then hand control to the run-mode launcher. On unix a successful
//! launch never returns; the exit-code path exists for launch failures
//! and the non-unix fallback.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::boot::launcher;
use crate::boot::modes::RunMode;
use crate::boot::probe::TcpProbe;
use crate::boot::runner::ExecRunner;
use crate::cli::Context;
use crate::config::{GateEnv, Settings};
use crate::ui::output;

/// Bootstrap a server container.
pub fn serve(ctx: &Context) -> Result<i32> {
    entrypoint(ctx, RunMode::Server)
}

/// Bootstrap a worker container.
pub fn work(ctx: &Context) -> Result<i32> {
    entrypoint(ctx, RunMode::Worker)
}

fn entrypoint(ctx: &Context, mode: RunMode) -> Result<i32> {
    let project_dir = ctx.project_dir();
    let load = Settings::load(&project_dir, ctx.config.as_deref())?;
    let env = GateEnv::from_env()?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let mut runner = ExecRunner;
    let result = runtime.block_on(launcher::launch(
        mode,
        &load.settings,
        &env,
        Arc::new(TcpProbe),
        &mut runner,
        ctx.verbosity,
    ));

    match result {
        Ok(code) => Ok(code),
        Err(err) => {
            output::error(&err);
            Ok(err.exit_code())
        }
    }
}
