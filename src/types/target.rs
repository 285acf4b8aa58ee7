//! Scan target resolution.
//!
//! The core scans a single, already-resolved address. `ScanTarget` pairs the
//! original user input (hostname or IP string) with the `IpAddr` it resolved
//! to, so output can show both. Resolution happens exactly once, before any
//! probe is dispatched; the scanner never re-resolves mid-run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a scan target from a known address.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }

    /// Resolve user input to a scan target.
    ///
    /// IP literals are used as-is; anything else goes through DNS and the
    /// first returned address wins. An unresolvable host is fatal to the
    /// whole run, so this is called before any scanning starts.
    pub async fn resolve(input: &str) -> Result<Self, TargetError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TargetError::InvalidFormat(input.to_string()));
        }

        if let Ok(ip) = input.parse::<IpAddr>() {
            return Ok(Self::new(input, ip));
        }

        if !is_valid_hostname(input) {
            return Err(TargetError::InvalidFormat(input.to_string()));
        }

        let resolver =
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

        let response = resolver
            .lookup_ip(input)
            .await
            .map_err(|e| TargetError::ResolutionFailed(input.to_string(), e.to_string()))?;

        let ip = response
            .iter()
            .next()
            .ok_or_else(|| TargetError::NoAddressesFound(input.to_string()))?;

        Ok(Self::new(input, ip))
    }

    /// Check if this target is IPv6.
    pub fn is_ipv6(&self) -> bool {
        self.ip.is_ipv6()
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    ResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// Check if a string is a plausible hostname before handing it to DNS.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters, alphanumeric plus hyphens,
    // starting and ending alphanumeric.
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().next().is_some_and(|c| c.is_alphanumeric()) {
            return false;
        }
        if !label.chars().last().is_some_and(|c| c.is_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_resolve_ipv4_literal() {
        let target = ScanTarget::resolve("127.0.0.1").await.unwrap();
        assert_eq!(target.ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(target.original, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literal() {
        let target = ScanTarget::resolve("::1").await.unwrap();
        assert!(target.is_ipv6());
    }

    #[tokio::test]
    async fn test_resolve_rejects_garbage() {
        let result = ScanTarget::resolve("not a host!").await;
        assert!(matches!(result, Err(TargetError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_resolve_rejects_empty() {
        assert!(ScanTarget::resolve("  ").await.is_err());
    }

    #[test]
    fn test_display_ip_only() {
        let target = ScanTarget::new("10.0.0.1", "10.0.0.1".parse().unwrap());
        assert_eq!(target.to_string(), "10.0.0.1");
    }

    #[test]
    fn test_display_hostname_and_ip() {
        let target = ScanTarget::new("example.com", "93.184.216.34".parse().unwrap());
        assert_eq!(target.to_string(), "example.com (93.184.216.34)");
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("sub.example.com"));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
        assert!(!is_valid_hostname("bad..label"));
    }
}
