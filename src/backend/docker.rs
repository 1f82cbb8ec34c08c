//! backend::docker
//!
//! Backend implementation driving the `docker` CLI.
//!
//! Provisioning commands run with captured output so their diagnostics can
//! be attached to errors; compose teardown/bring-up run in the foreground
//! with inherited stdio, streaming to the operator's terminal.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use super::{Backend, BackendError};
use crate::boot::runner::exit_code_of;

/// Real backend shelling out to `docker` / `docker compose`.
#[derive(Debug, Clone)]
pub struct DockerBackend {
    project_dir: PathBuf,
}

impl DockerBackend {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    fn docker(&self) -> Command {
        let mut command = Command::new("docker");
        command.current_dir(&self.project_dir);
        command
    }
}

/// Subset of `docker network inspect` output we care about.
#[derive(Debug, Deserialize)]
struct NetworkInfo {
    #[serde(rename = "Name")]
    name: String,
}

impl Backend for DockerBackend {
    fn network_exists(&self, name: &str) -> Result<bool, BackendError> {
        let rendered = format!("docker network inspect {name}");
        let output = self
            .docker()
            .args(["network", "inspect", name])
            .output()
            .map_err(|source| BackendError::Spawn {
                tool: "docker".to_string(),
                source,
            })?;

        if output.status.success() {
            let networks: Vec<NetworkInfo> =
                serde_json::from_slice(&output.stdout).map_err(|err| BackendError::BadOutput {
                    command: rendered.clone(),
                    message: err.to_string(),
                })?;
            return Ok(networks.iter().any(|network| network.name == name));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        // Inspect exits nonzero both for an absent network and for a broken
        // daemon; only the former is a negative answer.
        if stderr.to_ascii_lowercase().contains("no such network") {
            return Ok(false);
        }
        Err(BackendError::CommandFailed {
            command: rendered,
            code: exit_code_of(output.status),
            stderr: stderr.trim().to_string(),
        })
    }

    fn create_network(&self, name: &str) -> Result<(), BackendError> {
        let output = self
            .docker()
            .args(["network", "create", name])
            .output()
            .map_err(|source| BackendError::Spawn {
                tool: "docker".to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }
        Err(BackendError::CommandFailed {
            command: format!("docker network create {name}"),
            code: exit_code_of(output.status),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn compose_down(&self, compose_file: &Path, remove_volumes: bool) -> Result<(), BackendError> {
        let mut command = self.docker();
        command.args(["compose", "-f"]).arg(compose_file).arg("down");
        if remove_volumes {
            command.arg("--volumes");
        }

        let rendered = format!(
            "docker compose -f {} down{}",
            compose_file.display(),
            if remove_volumes { " --volumes" } else { "" }
        );
        let status = command.status().map_err(|source| BackendError::Spawn {
            tool: "docker".to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(BackendError::ForegroundFailed {
                command: rendered,
                code: exit_code_of(status),
            })
        }
    }

    fn compose_up(&self, compose_file: &Path) -> Result<i32, BackendError> {
        let status = self
            .docker()
            .args(["compose", "-f"])
            .arg(compose_file)
            .args(["up", "--build"])
            .status()
            .map_err(|source| BackendError::Spawn {
                tool: "docker".to_string(),
                source,
            })?;
        Ok(exit_code_of(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_info_decodes_inspect_output() {
        let json = r#"[{"Name": "stack-net", "Driver": "bridge", "Scope": "local"}]"#;
        let networks: Vec<NetworkInfo> = serde_json::from_str(json).unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].name, "stack-net");
    }
}
