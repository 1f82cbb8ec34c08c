//! stack::network
//!
//! Idempotent provisioning of the shared network.

use crate::backend::{Backend, BackendError};

/// Outcome of network-ensure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkOutcome {
    /// The network already existed and was reused.
    AlreadyPresent,
    /// The network was created.
    Created,
}

/// Ensure the shared network exists, creating it only if absent.
///
/// Safe to invoke repeatedly and from concurrent controller invocations;
/// an existing network is never an error and never duplicated.
pub fn ensure_network(backend: &dyn Backend, name: &str) -> Result<NetworkOutcome, BackendError> {
    if backend.network_exists(name)? {
        Ok(NetworkOutcome::AlreadyPresent)
    } else {
        backend.create_network(name)?;
        Ok(NetworkOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FailOn, MockBackend, MockOperation};

    #[test]
    fn creates_when_absent() {
        let backend = MockBackend::new();
        assert_eq!(
            ensure_network(&backend, "stack-net").unwrap(),
            NetworkOutcome::Created
        );
        assert_eq!(backend.networks(), vec!["stack-net".to_string()]);
    }

    #[test]
    fn reuses_when_present() {
        let backend = MockBackend::new().with_network("stack-net");
        assert_eq!(
            ensure_network(&backend, "stack-net").unwrap(),
            NetworkOutcome::AlreadyPresent
        );
        // No create call was issued.
        assert!(!backend
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::CreateNetwork { .. })));
    }

    #[test]
    fn twice_is_once() {
        let backend = MockBackend::new();
        assert_eq!(
            ensure_network(&backend, "stack-net").unwrap(),
            NetworkOutcome::Created
        );
        assert_eq!(
            ensure_network(&backend, "stack-net").unwrap(),
            NetworkOutcome::AlreadyPresent
        );
        assert_eq!(backend.networks(), vec!["stack-net".to_string()]);
    }

    #[test]
    fn inspect_failure_propagates() {
        let backend = MockBackend::new().fail_on(FailOn::NetworkExists { code: 125 });
        let err = ensure_network(&backend, "stack-net").unwrap_err();
        assert_eq!(err.exit_code(), Some(125));
    }
}
