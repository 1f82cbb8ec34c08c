//! boot
//!
//! Container-side bootstrap orchestrator.
//!
//! # Architecture
//!
//! Every container runs one sequential bootstrap path:
//!
//! ```text
//! Gate -> Setup -> Hand-off
//! ```
//!
//! 1. **Gate**: block until every gated dependency accepts connections
//! 2. **Setup**: mode-specific one-time work (server mode migrates)
//! 3. **Hand-off**: exec the long-running process so it receives container
//!    signals directly
//!
//! There is no internal concurrency in the launcher itself; only the gate
//! may probe endpoints in parallel, and even then the launcher does not
//! proceed until the gate returns.
//!
//! # Invariants
//!
//! - The long-running process never starts while a gated dependency is
//!   unreachable
//! - Migration failure aborts startup outright
//! - Worker mode never invokes the migration step

pub mod gate;
pub mod launcher;
pub mod modes;
pub mod probe;
pub mod runner;

// Re-exports for convenience
pub use gate::{wait_for_endpoints, wait_for_marker, GateError, GatePolicy};
pub use launcher::{launch, LaunchError};
pub use modes::{ModeError, RunMode, Topology};
pub use probe::{Probe, TcpProbe};
pub use runner::{exit_code_of, CommandSpec, ExecRunner, ProcessRunner, RunnerError};
