//! Scan run aggregate.
//!
//! A [`ScanRun`] is the complete record of one scan: the target, the port
//! range, every per-port result in completion order, and start/finish
//! timestamps. It moves through a small state machine:
//!
//! ```text
//! Pending -> Running -> Complete
//! ```
//!
//! Results may be observed before `Complete` (the streaming path), but a
//! finalized run guarantees that every port in the range has exactly one
//! result, whatever the individual outcomes were.

use crate::error::{ScanError, ScanResult};
use crate::scanner::ProbeResult;
use crate::types::{Port, PortRange, ScanId, ScanTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Lifecycle state of a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    /// Constructed, nothing dispatched yet.
    Pending,
    /// Ports are being dispatched and collected.
    Running,
    /// Every port in the range has exactly one result.
    Complete,
}

/// The aggregate of all probe results for one target + config invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRun {
    pub id: ScanId,
    pub target: ScanTarget,
    pub range: PortRange,
    pub state: ScanState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Results in completion order, not port order.
    pub results: Vec<ProbeResult>,
}

impl ScanRun {
    /// Create a pending run.
    pub fn new(target: ScanTarget, range: PortRange) -> Self {
        Self {
            id: ScanId::new(),
            target,
            range,
            state: ScanState::Pending,
            started_at: None,
            finished_at: None,
            results: Vec::with_capacity(range.len()),
        }
    }

    /// Mark the run as running and stamp the start time.
    pub fn start(&mut self) {
        debug_assert_eq!(self.state, ScanState::Pending);
        self.state = ScanState::Running;
        self.started_at = Some(Utc::now());
    }

    /// Record one probe result as it completes.
    pub fn record(&mut self, result: ProbeResult) {
        debug_assert_eq!(self.state, ScanState::Running);
        self.results.push(result);
    }

    /// Finalize the run, enforcing the completeness invariant: the set of
    /// result ports must equal exactly the scanned interval, no duplicates,
    /// no omissions.
    pub fn finalize(&mut self) -> ScanResult<()> {
        let seen: HashSet<Port> = self.results.iter().map(|r| r.port).collect();
        if seen.len() != self.results.len()
            || seen.len() != self.range.len()
            || !seen.iter().all(|p| self.range.contains(*p))
        {
            return Err(ScanError::IncompleteRun {
                expected: self.range.len(),
                actual: self.results.len(),
            });
        }
        self.state = ScanState::Complete;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Results sorted by port number. Delivery order is completion order, so
    /// callers wanting port order sort the finalized run.
    pub fn sorted_results(&self) -> Vec<&ProbeResult> {
        let mut sorted: Vec<&ProbeResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.port);
        sorted
    }

    /// Number of open ports seen so far.
    pub fn open_count(&self) -> usize {
        self.results.iter().filter(|r| r.open).count()
    }

    /// Number of ports recorded as cancelled.
    pub fn cancelled_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.error == Some(crate::error::ProbeError::Cancelled))
            .count()
    }

    /// Wall-clock duration, once finished.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use std::net::{IpAddr, Ipv4Addr};

    fn test_run(start: u16, end: u16) -> ScanRun {
        let target = ScanTarget::new("127.0.0.1", IpAddr::V4(Ipv4Addr::LOCALHOST));
        ScanRun::new(target, PortRange::from_bounds(start, end).unwrap())
    }

    #[test]
    fn test_state_machine_happy_path() {
        let mut run = test_run(20, 22);
        assert_eq!(run.state, ScanState::Pending);

        run.start();
        assert_eq!(run.state, ScanState::Running);
        assert!(run.started_at.is_some());

        for p in [21u16, 20, 22] {
            run.record(ProbeResult::closed(
                Port::new(p).unwrap(),
                ProbeError::Timeout,
            ));
        }

        run.finalize().unwrap();
        assert_eq!(run.state, ScanState::Complete);
        assert!(run.finished_at.is_some());
        assert!(run.duration_ms().is_some());
    }

    #[test]
    fn test_finalize_rejects_missing_port() {
        let mut run = test_run(20, 22);
        run.start();
        run.record(ProbeResult::open(Port::new(20).unwrap(), None));
        run.record(ProbeResult::open(Port::new(21).unwrap(), None));

        assert!(matches!(
            run.finalize(),
            Err(ScanError::IncompleteRun {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(run.state, ScanState::Running);
    }

    #[test]
    fn test_finalize_rejects_duplicate_port() {
        let mut run = test_run(20, 21);
        run.start();
        run.record(ProbeResult::open(Port::new(20).unwrap(), None));
        run.record(ProbeResult::open(Port::new(20).unwrap(), None));

        assert!(run.finalize().is_err());
    }

    #[test]
    fn test_finalize_rejects_out_of_range_port() {
        let mut run = test_run(20, 21);
        run.start();
        run.record(ProbeResult::open(Port::new(20).unwrap(), None));
        run.record(ProbeResult::open(Port::new(99).unwrap(), None));

        assert!(run.finalize().is_err());
    }

    #[test]
    fn test_sorted_results() {
        let mut run = test_run(20, 22);
        run.start();
        for p in [22u16, 20, 21] {
            run.record(ProbeResult::open(Port::new(p).unwrap(), None));
        }
        run.finalize().unwrap();

        let ports: Vec<u16> = run.sorted_results().iter().map(|r| r.port.as_u16()).collect();
        assert_eq!(ports, vec![20, 21, 22]);
    }

    #[test]
    fn test_counters() {
        let mut run = test_run(1, 3);
        run.start();
        run.record(ProbeResult::open(Port::new(1).unwrap(), None));
        run.record(ProbeResult::closed(
            Port::new(2).unwrap(),
            ProbeError::ConnectionRefused,
        ));
        run.record(ProbeResult::cancelled(Port::new(3).unwrap()));
        run.finalize().unwrap();

        assert_eq!(run.open_count(), 1);
        assert_eq!(run.cancelled_count(), 1);
    }
}
