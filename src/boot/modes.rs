//! boot::modes
//!
//! Run-mode and deployment-topology selection.
//!
//! A container instance launches exactly one run mode, fixed at launch
//! time. The topology decides which dependency set the readiness gate
//! checks before that mode starts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{Endpoint, GateEnv};

/// Errors from mode selection.
#[derive(Debug, Clone, Error)]
pub enum ModeError {
    #[error("unknown run mode '{0}' (expected 'server' or 'worker')")]
    UnknownRunMode(String),

    #[error("unknown topology '{0}' (expected 'with-database' or 'no-database')")]
    UnknownTopology(String),
}

/// Which long-running process a container launches.
///
/// The two modes are mutually exclusive; they are never combined in one
/// container instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP server. Owns the migration step.
    Server,
    /// Background task worker. Never migrates.
    Worker,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Server => "server",
            RunMode::Worker => "worker",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "server" => Ok(RunMode::Server),
            "worker" => Ok(RunMode::Worker),
            other => Err(ModeError::UnknownRunMode(other.to_string())),
        }
    }
}

/// Which set of external dependencies a deployment flavor gates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Gate the cache/broker and, when configured, the database.
    WithDatabase,
    /// Gate only the cache/broker.
    #[default]
    NoDatabase,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::WithDatabase => "with-database",
            Topology::NoDatabase => "no-database",
        }
    }

    /// Endpoints this topology gates, given the container environment.
    ///
    /// The cache/broker is always gated. The database is gated only in the
    /// with-database topology and only when its host is configured.
    pub fn gated_endpoints(&self, env: &GateEnv) -> Vec<Endpoint> {
        let mut endpoints = vec![env.cache.clone()];
        if *self == Topology::WithDatabase {
            if let Some(database) = &env.database {
                endpoints.push(database.clone());
            }
        }
        endpoints
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "with-database" => Ok(Topology::WithDatabase),
            "no-database" => Ok(Topology::NoDatabase),
            other => Err(ModeError::UnknownTopology(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_db() -> GateEnv {
        GateEnv {
            cache: Endpoint::new("cache", 6379),
            database: Some(Endpoint::new("db", 5432)),
        }
    }

    fn env_without_db() -> GateEnv {
        GateEnv {
            cache: Endpoint::new("cache", 6379),
            database: None,
        }
    }

    #[test]
    fn no_database_gates_only_cache() {
        // Even with DB_HOST configured, the no-database topology must not
        // probe the database endpoint.
        let endpoints = Topology::NoDatabase.gated_endpoints(&env_with_db());
        assert_eq!(endpoints, vec![Endpoint::new("cache", 6379)]);
    }

    #[test]
    fn with_database_gates_both() {
        let endpoints = Topology::WithDatabase.gated_endpoints(&env_with_db());
        assert_eq!(
            endpoints,
            vec![Endpoint::new("cache", 6379), Endpoint::new("db", 5432)]
        );
    }

    #[test]
    fn with_database_tolerates_missing_db_config() {
        let endpoints = Topology::WithDatabase.gated_endpoints(&env_without_db());
        assert_eq!(endpoints, vec![Endpoint::new("cache", 6379)]);
    }

    #[test]
    fn parse_round_trips() {
        assert_eq!("server".parse::<RunMode>().unwrap(), RunMode::Server);
        assert_eq!("worker".parse::<RunMode>().unwrap(), RunMode::Worker);
        assert!("both".parse::<RunMode>().is_err());

        assert_eq!(
            "with-database".parse::<Topology>().unwrap(),
            Topology::WithDatabase
        );
        assert_eq!(
            "no-database".parse::<Topology>().unwrap(),
            Topology::NoDatabase
        );
        assert!("maybe-database".parse::<Topology>().is_err());
    }
}
