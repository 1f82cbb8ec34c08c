//! wait command - standalone readiness gate

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::boot::gate::{self, GatePolicy};
use crate::boot::probe::{Probe, TcpProbe};
use crate::cli::Context;
use crate::config::Endpoint;
use crate::ui::output;

/// Block until every endpoint accepts a TCP connection.
pub fn wait(
    ctx: &Context,
    endpoints: &[String],
    parallel: bool,
    timeout: Option<u64>,
) -> Result<i32> {
    let endpoints = endpoints
        .iter()
        .map(|raw| raw.parse::<Endpoint>())
        .collect::<Result<Vec<_>, _>>()?;

    let defaults = GatePolicy::default();
    let policy = GatePolicy {
        parallel,
        deadline: timeout.map(Duration::from_secs).unwrap_or(defaults.deadline),
        ..defaults
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let probe: Arc<dyn Probe> = Arc::new(TcpProbe);
    match runtime.block_on(gate::wait_for_endpoints(
        probe,
        &endpoints,
        &policy,
        ctx.verbosity,
    )) {
        Ok(()) => {
            output::print("all endpoints reachable", ctx.verbosity);
            Ok(0)
        }
        Err(err) => {
            output::error(&err);
            Ok(1)
        }
    }
}
