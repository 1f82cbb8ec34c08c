//! ui
//!
//! Output utilities shared by the controller and the bootstrap entrypoints.

pub mod output;

pub use output::Verbosity;
