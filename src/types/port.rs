//! Port types with validation.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` is the inclusive `[start, end]` interval a scan run covers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values
/// and ensures port numbers are always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Create a Port without validation. Use only when the value is known valid.
    #[inline]
    pub const fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Check if this is a privileged port (< 1024).
    #[inline]
    pub const fn is_privileged(self) -> bool {
        self.0 < 1024
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
}

/// An inclusive range of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range. Fails if `start > end`.
    pub fn new(start: Port, end: Port) -> Result<Self, PortError> {
        if start.0 > end.0 {
            Err(PortError::InvalidRange(start.0, end.0))
        } else {
            Ok(Self { start, end })
        }
    }

    /// Validate and build a range from raw bounds, as supplied on the CLI.
    pub fn from_bounds(start: u16, end: u16) -> Result<Self, PortError> {
        let start = Port::new(start).ok_or(PortError::OutOfRange(start))?;
        let end = Port::new(end).ok_or(PortError::OutOfRange(end))?;
        Self::new(start, end)
    }

    /// Create a range containing a single port.
    pub const fn single(port: Port) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// First port in the range.
    pub const fn start(&self) -> Port {
        self.start
    }

    /// Last port in the range.
    pub const fn end(&self) -> Port {
        self.end
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        (self.end.0 - self.start.0 + 1) as usize
    }

    /// Check if the range is empty (never true for valid ranges).
    pub const fn is_empty(&self) -> bool {
        false // A valid PortRange always has at least one port
    }

    /// Check if a port falls inside the range.
    pub const fn contains(&self, port: Port) -> bool {
        port.0 >= self.start.0 && port.0 <= self.end.0
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port::new_unchecked)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(80).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_port_properties() {
        let port80 = Port::new(80).unwrap();
        assert!(port80.is_privileged());

        let port50000 = Port::new(50000).unwrap();
        assert!(!port50000.is_privileged());
    }

    #[test]
    fn test_port_range_len() {
        let range = PortRange::from_bounds(1, 100).unwrap();
        assert_eq!(range.len(), 100);
        assert!(!range.is_empty());
    }

    #[test]
    fn test_port_range_iter_is_exhaustive() {
        let range = PortRange::from_bounds(20, 25).unwrap();
        let ports: Vec<u16> = range.iter().map(Port::as_u16).collect();
        assert_eq!(ports, vec![20, 21, 22, 23, 24, 25]);
    }

    #[test]
    fn test_port_range_rejects_inverted_bounds() {
        assert!(matches!(
            PortRange::from_bounds(100, 50),
            Err(PortError::InvalidRange(100, 50))
        ));
    }

    #[test]
    fn test_port_range_rejects_zero_start() {
        assert!(matches!(
            PortRange::from_bounds(0, 1024),
            Err(PortError::OutOfRange(0))
        ));
    }

    #[test]
    fn test_single_port_range() {
        let range = PortRange::single(Port::new(22).unwrap());
        assert_eq!(range.len(), 1);
        assert_eq!(range.to_string(), "22");
    }

    #[test]
    fn test_contains() {
        let range = PortRange::from_bounds(20, 25).unwrap();
        assert!(range.contains(Port::new_unchecked(22)));
        assert!(!range.contains(Port::new_unchecked(26)));
    }
}
