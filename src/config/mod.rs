//! config
//!
//! Settings loading and container environment parsing.
//!
//! # Overview
//!
//! Deckhand has two configuration scopes:
//! - **Global**: operator-level defaults
//! - **Project**: per-stack settings in `deckhand.toml`
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config file
//! 3. Project config file
//! 4. Environment variables (`DECKHAND_TOPOLOGY`)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$DECKHAND_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/deckhand/config.toml`
//! 3. `~/.deckhand/config.toml`
//!
//! # Container Environment
//!
//! The bootstrap entrypoints read their gated endpoints from environment
//! variables rather than the config file: `CACHE_HOST`/`CACHE_PORT` are
//! required, `DB_HOST` is optional and its presence toggles database
//! gating (`DB_PORT` defaults to 5432).

pub mod schema;

pub use schema::{AppSection, GateSection, ServerSection, StackSection, WorkerSection};

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project-level config file name, resolved against the project directory.
pub const PROJECT_CONFIG_FILE: &str = "deckhand.toml";

/// Environment variable overriding the global config file path.
pub const CONFIG_PATH_ENV: &str = "DECKHAND_CONFIG";

/// Environment variable overriding the configured topology.
pub const TOPOLOGY_ENV: &str = "DECKHAND_TOPOLOGY";

/// Cache/broker endpoint variables (required in containers).
pub const CACHE_HOST_ENV: &str = "CACHE_HOST";
pub const CACHE_PORT_ENV: &str = "CACHE_PORT";

/// Database endpoint variables (optional; presence of the host toggles
/// whether the database endpoint is gated).
pub const DB_HOST_ENV: &str = "DB_HOST";
pub const DB_PORT_ENV: &str = "DB_PORT";

const DEFAULT_DB_PORT: u16 = 5432;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    Invalid(String),

    #[error("required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("invalid value in {var}: {message}")]
    InvalidEnv { var: &'static str, message: String },

    #[error("invalid endpoint '{0}' (expected host:port)")]
    InvalidEndpoint(String),
}

/// A `{host, port}` pair identifying a network dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = ConfigError;

    /// Parse `host:port`. The split is on the last colon so bare IPv6
    /// literals like `::1:6379` remain expressible.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidEndpoint(s.to_string()))?;
        if host.is_empty() {
            return Err(ConfigError::InvalidEndpoint(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidEndpoint(s.to_string()))?;
        Ok(Endpoint::new(host, port))
    }
}

/// Merged settings from all configuration sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub stack: StackSection,
    pub gate: GateSection,
    pub app: AppSection,
    pub server: ServerSection,
    pub worker: WorkerSection,
}

/// Result of loading settings.
#[derive(Debug)]
pub struct SettingsLoad {
    /// The merged settings.
    pub settings: Settings,
    /// Config files that contributed, in application order.
    pub loaded: Vec<PathBuf>,
}

impl Settings {
    /// Load settings with precedence applied.
    ///
    /// `explicit` replaces the project config path (the `--config` flag).
    /// Missing config files are not an error; defaults are used.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<SettingsLoad, ConfigError> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut loaded = Vec::new();

        let project_config = match explicit {
            Some(path) => path.to_path_buf(),
            None => project_dir.join(PROJECT_CONFIG_FILE),
        };

        let mut candidates = Vec::new();
        if let Some(global) = global_config_path() {
            candidates.push(global);
        }
        candidates.push(project_config);

        for path in candidates {
            if !path.exists() {
                continue;
            }
            let value = load_file(&path)?;
            merge_value(&mut merged, value);
            loaded.push(path);
        }

        let mut settings: Settings = merged
            .try_into()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;

        apply_env_overrides(&mut settings, |key| env::var(key).ok())?;
        settings.validate()?;

        Ok(SettingsLoad { settings, loaded })
    }

    /// Validate the merged settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stack.validate()?;
        self.gate.validate()?;
        self.server.validate()?;
        Ok(())
    }
}

/// Apply environment overrides on top of file-derived settings.
fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(TOPOLOGY_ENV).filter(|v| !v.is_empty()) {
        settings.gate.topology = raw.parse().map_err(|err| ConfigError::InvalidEnv {
            var: TOPOLOGY_ENV,
            message: format!("{err}"),
        })?;
    }
    Ok(())
}

/// Resolve the global config path, if any base directory is known.
fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if let Some(base) = dirs::config_dir() {
        return Some(base.join("deckhand").join("config.toml"));
    }
    dirs::home_dir().map(|home| home.join(".deckhand").join("config.toml"))
}

/// Read and parse one config file.
fn load_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    contents.parse().map_err(|err: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Merge `overlay` into `base`, table-by-table. Non-table values replace.
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Gated endpoints derived from the container environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateEnv {
    /// Cache/broker endpoint. Always gated.
    pub cache: Endpoint,
    /// Database endpoint, present only when `DB_HOST` is set.
    pub database: Option<Endpoint>,
}

impl GateEnv {
    /// Read the gate environment from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the gate environment through a lookup function.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cache_host = lookup(CACHE_HOST_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv(CACHE_HOST_ENV))?;
        let cache_port = lookup(CACHE_PORT_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv(CACHE_PORT_ENV))?;
        let cache_port = parse_port(&cache_port, CACHE_PORT_ENV)?;

        let database = match lookup(DB_HOST_ENV).filter(|v| !v.is_empty()) {
            Some(host) => {
                let port = match lookup(DB_PORT_ENV).filter(|v| !v.is_empty()) {
                    Some(raw) => parse_port(&raw, DB_PORT_ENV)?,
                    None => DEFAULT_DB_PORT,
                };
                Some(Endpoint::new(host, port))
            }
            None => None,
        };

        Ok(Self {
            cache: Endpoint::new(cache_host, cache_port),
            database,
        })
    }
}

fn parse_port(raw: &str, var: &'static str) -> Result<u16, ConfigError> {
    raw.parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
        var,
        message: format!("'{raw}' is not a port number"),
    })
}
