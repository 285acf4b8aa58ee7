//! Connection prober.
//!
//! One probe is one attempted TCP connect to `(target, port)` under a
//! timeout, plus a best-effort banner read on success. The prober is
//! stateless: it opens exactly one socket per invocation, closes it on every
//! exit path, and touches no shared state. Expected failures (timeout,
//! refusal, unreachable) come back as data inside the [`ProbeResult`], never
//! as a propagated error.

use crate::banner::read_banner;
use crate::error::ProbeError;
use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Outcome of probing a single port.
///
/// Exactly one of these is produced per port per run, in the prober, and
/// ownership flows prober -> coordinator -> caller without mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The port that was probed.
    pub port: Port,
    /// Whether the TCP connect succeeded.
    pub open: bool,
    /// Banner captured from the service, if it sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Why the port is not open, when it is not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    /// An open port, with or without a banner.
    pub fn open(port: Port, banner: Option<String>) -> Self {
        Self {
            port,
            open: true,
            banner,
            error: None,
        }
    }

    /// A port that could not be connected to.
    pub fn closed(port: Port, error: ProbeError) -> Self {
        Self {
            port,
            open: false,
            banner: None,
            error: Some(error),
        }
    }

    /// A port whose probe never started because the run was cancelled.
    pub fn cancelled(port: Port) -> Self {
        Self::closed(port, ProbeError::Cancelled)
    }
}

/// A single-port probe implementation.
///
/// The coordinator only depends on this trait, which keeps the dispatch and
/// admission-control logic testable against a mock prober with no real
/// sockets involved.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one port, producing exactly one result. Must not panic or hang
    /// beyond its configured timeouts, whatever the peer does.
    async fn probe(&self, port: Port) -> ProbeResult;
}

/// TCP connect prober.
///
/// Uses the operating system's socket API via `tokio::net::TcpStream`, so it
/// completes the full handshake and needs no special privileges.
pub struct TcpProber {
    target: IpAddr,
    connect_timeout: Duration,
    banner_timeout: Duration,
}

impl TcpProber {
    /// Create a new TCP prober.
    ///
    /// Timeouts must be positive; `ScanConfig::validate` enforces this
    /// before a prober is ever constructed.
    pub fn new(target: IpAddr, connect_timeout: Duration, banner_timeout: Duration) -> Self {
        debug_assert!(!connect_timeout.is_zero());
        debug_assert!(!banner_timeout.is_zero());
        Self {
            target,
            connect_timeout,
            banner_timeout,
        }
    }

    /// The address this prober connects to.
    pub fn target(&self) -> IpAddr {
        self.target
    }

    /// Attempt the connect, mapping IO failures to the probe taxonomy.
    async fn attempt_connect(&self, addr: SocketAddr) -> Result<TcpStream, ProbeError> {
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => {
                if e.kind() == std::io::ErrorKind::ConnectionRefused {
                    Err(ProbeError::ConnectionRefused)
                } else if e.to_string().to_lowercase().contains("unreachable") {
                    Err(ProbeError::NetworkUnreachable)
                } else {
                    // Resets and other transient connect failures read the
                    // same as a refusal for reachability purposes.
                    Err(ProbeError::ConnectionRefused)
                }
            }
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, port: Port) -> ProbeResult {
        let addr = SocketAddr::new(self.target, port.as_u16());

        match self.attempt_connect(addr).await {
            Ok(stream) => {
                tracing::debug!(port = port.as_u16(), "connect succeeded");
                // read_banner consumes the stream; the socket closes when it
                // returns, banner or not.
                let banner = read_banner(stream, self.banner_timeout).await;
                ProbeResult::open(port, banner)
            }
            Err(error) => {
                tracing::trace!(port = port.as_u16(), %error, "connect failed");
                ProbeResult::closed(port, error)
            }
        }
    }
}
