//! Deckhand - a bootstrap and lifecycle CLI for containerized service stacks
//!
//! Deckhand is a single-binary tool (`dh`) with two faces. On the host it is
//! the lifecycle controller that provisions local configuration and the
//! shared network, then drives the multi-container stack through
//! teardown/bring-up. Inside a container it is the bootstrap entrypoint that
//! gates startup on dependency readiness, applies one-time setup for the
//! selected run mode, and hands the process image over to the long-running
//! application.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates down)
//! - [`boot`] - Container-side orchestrator: Gate -> Setup -> Hand-off
//! - [`stack`] - Host-side lifecycle controller for the compose stack
//! - [`backend`] - Single seam for all container-runtime operations
//! - [`config`] - Settings schema, loading, and container environment
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! Deckhand maintains the following invariants:
//!
//! 1. A long-running process is never launched while a gated dependency is
//!    unreachable
//! 2. The local environment file is never overwritten once it exists
//! 3. Exactly one run mode (server or worker) runs per container instance
//! 4. Destructive volume removal is reachable only through an explicit flag

pub mod backend;
pub mod boot;
pub mod cli;
pub mod config;
pub mod stack;
pub mod ui;
