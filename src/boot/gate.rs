//! boot::gate
//!
//! Dependency readiness gate.
//!
//! # Contract
//!
//! Given a set of service endpoints and a policy, block the caller until
//! every endpoint accepts a TCP connection, or fail once the deadline
//! elapses. The failure diagnostic names exactly the endpoint(s) that never
//! became reachable.
//!
//! The gate never retries past its deadline. Restart policy belongs to the
//! container orchestrator above it, not here.
//!
//! # Invariants
//!
//! - The gate returns `Ok` only after every endpoint was confirmed reachable
//! - A progress message is emitted before the first blocking wait, so
//!   operators can distinguish "waiting" from "hung"
//! - Parallel and sequential modes are equivalent from the caller's view:
//!   both are a blocking wait

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::time::sleep;

use crate::boot::probe::Probe;
use crate::config::{Endpoint, GateSection};
use crate::ui::output::{self, Verbosity};

/// Timing and concurrency policy for one gate pass.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Probe endpoints concurrently instead of one at a time.
    pub parallel: bool,
    /// Overall wait deadline per dependency.
    pub deadline: Duration,
    /// Bound on a single connection attempt.
    pub connect_timeout: Duration,
    /// Delay between attempts.
    pub poll_interval: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            parallel: true,
            deadline: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl From<&GateSection> for GatePolicy {
    fn from(section: &GateSection) -> Self {
        Self {
            parallel: section.parallel,
            deadline: Duration::from_secs(section.timeout_secs),
            connect_timeout: Duration::from_secs(section.connect_timeout_secs),
            poll_interval: Duration::from_millis(section.poll_interval_ms),
        }
    }
}

/// Errors from the readiness gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// One or more endpoints never accepted a connection within the deadline.
    #[error("dependencies unreachable after {}s: {}", .waited.as_secs(), join_endpoints(.unreachable))]
    Unreachable {
        unreachable: Vec<Endpoint>,
        waited: Duration,
    },

    /// The readiness marker never appeared within the deadline.
    #[error("readiness marker '{path}' did not appear within {}s", .waited.as_secs())]
    MarkerTimeout { path: PathBuf, waited: Duration },

    /// A parallel probe task aborted.
    #[error("probe task failed: {0}")]
    TaskFailed(String),
}

fn join_endpoints(endpoints: &[Endpoint]) -> String {
    endpoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Block until every endpoint accepts a TCP connection.
///
/// Sequential mode checks endpoints in order and fails on the first one
/// that exhausts its deadline. Parallel mode probes all endpoints
/// concurrently and reports every endpoint that timed out.
pub async fn wait_for_endpoints(
    probe: Arc<dyn Probe>,
    endpoints: &[Endpoint],
    policy: &GatePolicy,
    verbosity: Verbosity,
) -> Result<(), GateError> {
    if endpoints.is_empty() {
        output::debug("no endpoints to gate", verbosity);
        return Ok(());
    }

    output::phase(
        format!("waiting for {}", join_endpoints(endpoints)),
        verbosity,
    );

    if policy.parallel {
        wait_parallel(probe, endpoints, policy, verbosity).await
    } else {
        wait_sequential(probe, endpoints, policy, verbosity).await
    }
}

async fn wait_sequential(
    probe: Arc<dyn Probe>,
    endpoints: &[Endpoint],
    policy: &GatePolicy,
    verbosity: Verbosity,
) -> Result<(), GateError> {
    for endpoint in endpoints {
        if let Err(waited) = wait_for_one(probe.as_ref(), endpoint, policy, verbosity).await {
            return Err(GateError::Unreachable {
                unreachable: vec![endpoint.clone()],
                waited,
            });
        }
        output::debug(format!("{endpoint} is reachable"), verbosity);
    }
    Ok(())
}

async fn wait_parallel(
    probe: Arc<dyn Probe>,
    endpoints: &[Endpoint],
    policy: &GatePolicy,
    verbosity: Verbosity,
) -> Result<(), GateError> {
    let started = Instant::now();
    let mut handles = Vec::with_capacity(endpoints.len());
    for endpoint in endpoints {
        let probe = Arc::clone(&probe);
        let endpoint = endpoint.clone();
        let policy = policy.clone();
        handles.push(tokio::spawn(async move {
            let reachable = wait_for_one(probe.as_ref(), &endpoint, &policy, verbosity)
                .await
                .is_ok();
            (endpoint, reachable)
        }));
    }

    let mut unreachable = Vec::new();
    for handle in handles {
        let (endpoint, reachable) = handle
            .await
            .map_err(|err| GateError::TaskFailed(err.to_string()))?;
        if reachable {
            output::debug(format!("{endpoint} is reachable"), verbosity);
        } else {
            unreachable.push(endpoint);
        }
    }

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(GateError::Unreachable {
            unreachable,
            waited: started.elapsed(),
        })
    }
}

/// Probe one endpoint until it accepts or the deadline passes.
///
/// Returns the elapsed wait on failure.
async fn wait_for_one(
    probe: &dyn Probe,
    endpoint: &Endpoint,
    policy: &GatePolicy,
    verbosity: Verbosity,
) -> Result<(), Duration> {
    let started = Instant::now();
    loop {
        match probe.check(endpoint, policy.connect_timeout).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                if started.elapsed() >= policy.deadline {
                    return Err(started.elapsed());
                }
                output::debug(format!("{endpoint} not ready: {err}"), verbosity);
                sleep(policy.poll_interval).await;
            }
        }
    }
}

/// Block until the readiness marker file exists.
///
/// Used by worker containers to wait out the server's first migration when
/// a marker path is configured.
pub async fn wait_for_marker(
    path: &Path,
    policy: &GatePolicy,
    verbosity: Verbosity,
) -> Result<(), GateError> {
    output::phase(
        format!("waiting for readiness marker '{}'", path.display()),
        verbosity,
    );

    let started = Instant::now();
    loop {
        if path.exists() {
            return Ok(());
        }
        if started.elapsed() >= policy.deadline {
            return Err(GateError::MarkerTimeout {
                path: path.to_path_buf(),
                waited: started.elapsed(),
            });
        }
        sleep(policy.poll_interval).await;
    }
}
