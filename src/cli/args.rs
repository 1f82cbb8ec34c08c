//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--config <path>`: Use this project config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deckhand - bootstrap and lifecycle CLI for containerized service stacks
#[derive(Parser, Debug)]
#[command(name = "dh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if dh was started in this directory
    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Use this project configuration file instead of deckhand.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bring the full stack up
    #[command(
        name = "up",
        long_about = "Bring the full multi-container stack to a running state.\n\n\
            Runs a fixed sequence: seed the local environment file from its \
            template if absent, mark entrypoint scripts executable (best \
            effort), create the shared network if absent, tear down any \
            previous instance of the stack, then rebuild and start it in the \
            foreground. Every provisioning step is idempotent; rerunning up \
            is always safe.",
        after_help = "\
WORKFLOW EXAMPLES:
    # First run and every run after: same command, same result
    dh up

    # Drive the development stack definition
    dh up --dev

    # Start over, destroying persistent volumes (DESTRUCTIVE)
    dh up --reset

READING THE OUTPUT:
    created '.env' from '.env.example'   <- first run only
    created network 'stack-net'          <- first run only
    bringing stack up from 'docker-compose.yml'"
    )]
    Up {
        /// Drive the development compose profile
        #[arg(long)]
        dev: bool,

        /// Destroy the stack's persistent volumes before bring-up (destructive)
        #[arg(long)]
        reset: bool,
    },

    /// Stop and remove the stack's containers
    #[command(
        name = "down",
        long_about = "Stop and remove the stack's containers without bringing \
            the stack back up. Named volumes are left intact unless --volumes \
            is given."
    )]
    Down {
        /// Tear down the development compose profile
        #[arg(long)]
        dev: bool,

        /// Also remove named volumes (destructive)
        #[arg(long)]
        volumes: bool,
    },

    /// Container entrypoint: gate dependencies, migrate, then serve HTTP
    #[command(
        name = "serve",
        long_about = "Bootstrap a server container.\n\n\
            Blocks until the gated dependencies accept connections, applies \
            pending schema migrations (idempotent; failure aborts startup), \
            then replaces itself with the HTTP server process so it receives \
            container signals directly.\n\n\
            Endpoints come from CACHE_HOST/CACHE_PORT and, in the \
            with-database topology, DB_HOST/DB_PORT."
    )]
    Serve,

    /// Container entrypoint: gate dependencies, then run the task worker
    #[command(
        name = "work",
        long_about = "Bootstrap a worker container.\n\n\
            Blocks until the gated dependencies accept connections, then \
            replaces itself with the task worker process. Never runs \
            migrations; when a readiness marker is configured it waits for \
            the server's migration to complete first."
    )]
    Work,

    /// Block until service endpoints accept TCP connections
    #[command(
        name = "wait",
        long_about = "Standalone readiness gate.\n\n\
            Blocks until every given endpoint accepts a TCP connection, or \
            exits nonzero naming the endpoint(s) that never became reachable.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Gate on one service
    dh wait --endpoint cache:6379

    # Gate on several, concurrently, with a tighter deadline
    dh wait --endpoint cache:6379 --endpoint db:5432 --parallel --timeout 30"
    )]
    Wait {
        /// Endpoint to probe, host:port (repeatable)
        #[arg(long = "endpoint", value_name = "HOST:PORT", required = true)]
        endpoints: Vec<String>,

        /// Probe endpoints concurrently
        #[arg(long)]
        parallel: bool,

        /// Overall wait deadline in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported completion shells.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn up_flags_parse() {
        let cli = Cli::try_parse_from(["dh", "up", "--dev", "--reset"]).unwrap();
        match cli.command {
            Command::Up { dev, reset } => {
                assert!(dev);
                assert!(reset);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn wait_requires_an_endpoint() {
        assert!(Cli::try_parse_from(["dh", "wait"]).is_err());
        let cli = Cli::try_parse_from([
            "dh", "wait", "--endpoint", "cache:6379", "--endpoint", "db:5432", "--parallel",
        ])
        .unwrap();
        match cli.command {
            Command::Wait {
                endpoints,
                parallel,
                timeout,
            } => {
                assert_eq!(endpoints, vec!["cache:6379", "db:5432"]);
                assert!(parallel);
                assert!(timeout.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["dh", "--bogus"]).is_err());
    }
}
