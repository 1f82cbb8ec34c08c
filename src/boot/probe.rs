//! boot::probe
//!
//! Reachability probing seam for the readiness gate.
//!
//! # Design
//!
//! The `Probe` trait is async because probing is network I/O. The gate
//! drives repeated single attempts against it until its deadline; a probe
//! itself never retries.
//!
//! # Example
//!
//! ```
//! use deckhand::boot::probe::{Probe, TcpProbe};
//! use deckhand::config::Endpoint;
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
//! let port = listener.local_addr().unwrap().port();
//! let endpoint = Endpoint::new("127.0.0.1", port);
//!
//! TcpProbe
//!     .check(&endpoint, Duration::from_secs(1))
//!     .await
//!     .unwrap();
//! # });
//! ```

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time;

use crate::config::Endpoint;

/// One reachability check against a service endpoint.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Attempt a single connection, bounded by `connect_timeout`.
    async fn check(&self, endpoint: &Endpoint, connect_timeout: Duration) -> io::Result<()>;
}

/// Probe that opens a real TCP connection and discards it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

#[async_trait]
impl Probe for TcpProbe {
    async fn check(&self, endpoint: &Endpoint, connect_timeout: Duration) -> io::Result<()> {
        let addr = (endpoint.host.as_str(), endpoint.port);
        match time::timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(_elapsed) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "connection attempt timed out",
            )),
        }
    }
}
