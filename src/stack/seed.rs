//! stack::seed
//!
//! Idempotent seeding of the local environment file.
//!
//! The environment file is seeded from its template exactly once. An
//! existing file is never touched, whatever its contents.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from config-ensure.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Neither the environment file nor its template exists. The operator
    /// must supply one before retrying; there is no automatic recovery.
    #[error(
        "no environment file at '{env_file}' and no template at '{template}'; \
         create one before bringing the stack up"
    )]
    ConfigMissing {
        env_file: PathBuf,
        template: PathBuf,
    },

    #[error("failed to seed '{env_file}' from '{template}': {source}")]
    CopyFailed {
        env_file: PathBuf,
        template: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of config-ensure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The environment file already existed and was left untouched.
    AlreadyPresent,
    /// The environment file was created from the template.
    Seeded,
}

/// Ensure the environment file exists, seeding it from the template if
/// absent. Never overwrites an existing file.
pub fn ensure_env_file(env_file: &Path, template: &Path) -> Result<SeedOutcome, SeedError> {
    if env_file.exists() {
        return Ok(SeedOutcome::AlreadyPresent);
    }
    if !template.exists() {
        return Err(SeedError::ConfigMissing {
            env_file: env_file.to_path_buf(),
            template: template.to_path_buf(),
        });
    }
    fs::copy(template, env_file).map_err(|source| SeedError::CopyFailed {
        env_file: env_file.to_path_buf(),
        template: template.to_path_buf(),
        source,
    })?;
    Ok(SeedOutcome::Seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_from_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join(".env.example");
        let env_file = dir.path().join(".env");
        fs::write(&template, "KEY=value\n").unwrap();

        assert_eq!(
            ensure_env_file(&env_file, &template).unwrap(),
            SeedOutcome::Seeded
        );
        assert_eq!(fs::read_to_string(&env_file).unwrap(), "KEY=value\n");
    }

    #[test]
    fn never_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join(".env.example");
        let env_file = dir.path().join(".env");
        fs::write(&template, "KEY=template\n").unwrap();
        fs::write(&env_file, "KEY=operator-edited\n").unwrap();

        assert_eq!(
            ensure_env_file(&env_file, &template).unwrap(),
            SeedOutcome::AlreadyPresent
        );
        // Byte-identical to what the operator wrote.
        assert_eq!(
            fs::read_to_string(&env_file).unwrap(),
            "KEY=operator-edited\n"
        );
    }

    #[test]
    fn repeat_invocation_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join(".env.example");
        let env_file = dir.path().join(".env");
        fs::write(&template, "A=1\nB=2\n").unwrap();

        ensure_env_file(&env_file, &template).unwrap();
        let first = fs::read(&env_file).unwrap();
        ensure_env_file(&env_file, &template).unwrap();
        assert_eq!(fs::read(&env_file).unwrap(), first);
    }

    #[test]
    fn missing_both_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_env_file(&dir.path().join(".env"), &dir.path().join(".env.example"))
            .unwrap_err();
        assert!(matches!(err, SeedError::ConfigMissing { .. }));
    }
}
