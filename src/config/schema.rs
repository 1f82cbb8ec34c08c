//! config::schema
//!
//! Settings schema for the stack controller and the bootstrap entrypoints.
//!
//! Every section has serde defaults so a missing file, a missing section,
//! or a missing key all resolve to a working configuration. `validate()`
//! rejects values that would only fail later and further from their cause.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ConfigError;
use crate::boot::modes::Topology;

/// `[stack]` - host-side lifecycle controller settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StackSection {
    /// Name of the shared network all services attach to.
    pub network: String,
    /// Compose file driven by the default profile.
    pub compose_file: PathBuf,
    /// Compose file driven by the development profile.
    pub dev_compose_file: PathBuf,
    /// Local environment file, seeded once and never overwritten.
    pub env_file: PathBuf,
    /// Template the environment file is seeded from.
    pub env_template: PathBuf,
    /// Entrypoint scripts marked executable before bring-up (best effort).
    pub entrypoints: Vec<PathBuf>,
}

impl Default for StackSection {
    fn default() -> Self {
        Self {
            network: "stack-net".to_string(),
            compose_file: PathBuf::from("docker-compose.yml"),
            dev_compose_file: PathBuf::from("docker-compose.dev.yml"),
            env_file: PathBuf::from(".env"),
            env_template: PathBuf::from(".env.example"),
            entrypoints: Vec::new(),
        }
    }
}

/// `[gate]` - dependency readiness gate settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GateSection {
    /// Which dependency set this deployment gates.
    pub topology: Topology,
    /// Probe endpoints concurrently instead of one at a time.
    pub parallel: bool,
    /// Overall wait deadline per dependency, in seconds.
    pub timeout_secs: u64,
    /// Bound on a single connection attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Delay between attempts, in milliseconds.
    pub poll_interval_ms: u64,
    /// Schema-ready marker file. When set, server mode publishes it after a
    /// successful migration and worker mode waits for it before starting.
    pub ready_marker: Option<PathBuf>,
}

impl Default for GateSection {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            parallel: true,
            timeout_secs: 60,
            connect_timeout_secs: 2,
            poll_interval_ms: 500,
            ready_marker: None,
        }
    }
}

/// `[app]` - the opaque application operations the launcher invokes.
///
/// Each entry is an argv vector. An empty vector means the step is not
/// configured; `collect_assets` is optional and disabled by default, the
/// others are required by the run mode that uses them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppSection {
    /// Apply pending schema migrations. Must be idempotent.
    pub migrate: Vec<String>,
    /// Start the HTTP server. `{bind}` and `{workers}` are substituted.
    pub server: Vec<String>,
    /// Start the task worker. `{loglevel}` is substituted.
    pub worker: Vec<String>,
    /// Optional pre-serve asset collection step.
    pub collect_assets: Vec<String>,
}

/// `[server]` - HTTP server launch parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address handed to the server process.
    pub bind: String,
    /// Worker/concurrency count handed to the server process.
    pub workers: u32,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            workers: 4,
        }
    }
}

/// `[worker]` - task worker launch parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerSection {
    /// Log level handed to the worker process.
    pub loglevel: String,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
        }
    }
}

impl StackSection {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.network.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "stack.network must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl GateSection {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "gate.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "gate.connect_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "gate.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerSection {
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid(
                "server.workers must be at least 1".to_string(),
            ));
        }
        if !self.bind.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "server.bind '{}' is not an address:port pair",
                self.bind
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        StackSection::default().validate().unwrap();
        GateSection::default().validate().unwrap();
        ServerSection::default().validate().unwrap();
    }

    #[test]
    fn zero_workers_rejected() {
        let section = ServerSection {
            workers: 0,
            ..Default::default()
        };
        assert!(section.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let section = GateSection {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(section.validate().is_err());
    }

    #[test]
    fn bind_without_port_rejected() {
        let section = ServerSection {
            bind: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert!(section.validate().is_err());
    }

    #[test]
    fn gate_section_parses_topology() {
        let section: GateSection = toml::from_str(
            r#"
            topology = "with-database"
            parallel = false
            "#,
        )
        .unwrap();
        assert_eq!(section.topology, Topology::WithDatabase);
        assert!(!section.parallel);
        // Unspecified keys keep their defaults.
        assert_eq!(section.timeout_secs, 60);
    }
}
