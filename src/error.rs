//! Error types for portreach.
//!
//! Two tiers, deliberately kept apart:
//!
//! - [`ScanError`] — fatal conditions that abort a whole run. These are all
//!   raised before any probe is dispatched.
//! - [`ProbeError`] — expected per-port outcomes (a closed or silent port is
//!   normal). These are recorded as data in a `ProbeResult` and never
//!   propagated past the prober boundary, so a slow or hostile peer cannot
//!   crash or hang the coordinator.
//!
//! Uses `thiserror` for ergonomic error definitions.

use crate::types::{PortError, TargetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fatal error for a scan run as a whole.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unresolvable host: {0}")]
    UnresolvableHost(#[from] TargetError),

    #[error(transparent)]
    InvalidPortRange(#[from] PortError),

    #[error("incomplete scan run: expected {expected} results, got {actual}")]
    IncompleteRun { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Expected, non-fatal outcome of probing a single port.
///
/// One of these in a `ProbeResult` means the port was attempted and the
/// attempt terminated without a usable connection. None of them abort the
/// run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeError {
    /// The connect did not complete (success or refusal) within the timeout.
    Timeout,
    /// The peer actively refused the connection.
    ConnectionRefused,
    /// The network or host is unreachable.
    NetworkUnreachable,
    /// The run was cancelled before this port's probe started.
    Cancelled,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionRefused => write!(f, "connection refused"),
            Self::NetworkUnreachable => write!(f, "network unreachable"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_display() {
        assert_eq!(ProbeError::Timeout.to_string(), "timeout");
        assert_eq!(
            ProbeError::ConnectionRefused.to_string(),
            "connection refused"
        );
        assert_eq!(ProbeError::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn test_probe_error_serializes_snake_case() {
        let json = serde_json::to_string(&ProbeError::ConnectionRefused).unwrap();
        assert_eq!(json, "\"connection_refused\"");
    }
}
