//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Loads settings and calls the stack controller or boot orchestrator
//! 3. Maps the outcome to an exit code, printing diagnostics on the way
//!
//! Failures with a backing-tool exit status return it unchanged instead of
//! surfacing as an error, so `main` can propagate the status verbatim.
//!
//! # Async Commands
//!
//! The readiness gate is async because it probes endpoints concurrently.
//! Handlers that gate enter the runtime with `tokio::runtime::Runtime` and
//! `block_on` within the sync dispatch context.

mod completion;
mod down;
mod entrypoint;
mod up;
mod wait;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use down::down;
pub use entrypoint::{serve, work};
pub use up::up;
pub use wait::wait;

use anyhow::Result;

use super::Context;
use crate::cli::args::Command;

/// Dispatch a command to its handler, returning the exit code.
pub fn dispatch(command: Command, ctx: &Context) -> Result<i32> {
    match command {
        Command::Up { dev, reset } => up(ctx, dev, reset),
        Command::Down { dev, volumes } => down(ctx, dev, volumes),
        Command::Serve => serve(ctx),
        Command::Work => work(ctx),
        Command::Wait {
            endpoints,
            parallel,
            timeout,
        } => wait(ctx, &endpoints, parallel, timeout),
        Command::Completion { shell } => {
            completion(shell)?;
            Ok(0)
        }
    }
}
