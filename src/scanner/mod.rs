//! Scan coordinator.
//!
//! Owns the bounded concurrency pool: iterates the port range, dispatches one
//! prober invocation per port, and collects results as they complete. At most
//! `concurrency` probes are in flight at any moment, enforced with a
//! semaphore; as one finishes, the next queued port is admitted. This bounds
//! local resource usage (file descriptors, socket buffers) regardless of how
//! the remote host behaves.
//!
//! Results are delivered in completion order, not port order. Open ports are
//! the primary signal and are surfaced to the caller as soon as they are
//! discovered, via the streaming interface or the per-result callback.

pub mod probe;
pub mod run;

use crate::error::ScanResult;
use crate::types::{PortRange, ScanTarget};
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

pub use probe::{ProbeResult, Prober, TcpProber};
pub use run::{ScanRun, ScanState};

/// Configuration for one scan run. Immutable once validated.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Resolved target address.
    pub target: ScanTarget,
    /// Inclusive port interval to scan.
    pub range: PortRange,
    /// Maximum number of simultaneously in-flight probes.
    pub concurrency: usize,
    /// Per-connection timeout.
    pub timeout: Duration,
    /// Banner-read timeout, defaulting to the connect timeout.
    pub banner_timeout: Duration,
}

impl ScanConfig {
    /// Default concurrency ceiling.
    pub const DEFAULT_CONCURRENCY: usize = 100;
    /// Default per-connection timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Create a configuration with default concurrency and timeouts.
    pub fn new(target: ScanTarget, range: PortRange) -> Self {
        Self {
            target,
            range,
            concurrency: Self::DEFAULT_CONCURRENCY,
            timeout: Self::DEFAULT_TIMEOUT,
            banner_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Set the concurrency ceiling.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the connect timeout, which is also the banner-read default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.banner_timeout = timeout;
        self
    }

    /// Override the banner-read timeout independently of the connect timeout.
    pub fn with_banner_timeout(mut self, banner_timeout: Duration) -> Self {
        self.banner_timeout = banner_timeout;
        self
    }

    /// Reject unusable configurations before any network activity.
    ///
    /// Range validity (`1 <= start <= end <= 65535`) is already guaranteed
    /// by the `PortRange` type.
    pub fn validate(&self) -> ScanResult<()> {
        use crate::error::ScanError;
        if self.concurrency < 1 {
            return Err(ScanError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ScanError::InvalidConfig("timeout must be positive".into()));
        }
        if self.banner_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "banner timeout must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Build the production prober for this configuration.
    pub fn prober(&self) -> TcpProber {
        TcpProber::new(self.target.ip, self.timeout, self.banner_timeout)
    }
}

/// Stream probe results for every port in the range, in completion order.
///
/// The stream is lazy, finite, and yields exactly one element per port. The
/// semaphore caps in-flight probes at `concurrency`; each task holds its
/// permit for the lifetime of its probe, so admission and completion cannot
/// double-count a slot.
///
/// Cancellation is checked after admission: once `cancel` fires, no new
/// connects are initiated and every not-yet-dispatched port yields a
/// `Cancelled` result instead, so the caller still sees the full range.
/// Probes already in flight run to their (timeout-bounded) completion.
pub fn scan_stream<P>(
    prober: Arc<P>,
    range: PortRange,
    concurrency: usize,
    cancel: CancellationToken,
) -> impl Stream<Item = ProbeResult>
where
    P: Prober + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency));

    futures::stream::iter(range.iter())
        .map(move |port| {
            let semaphore = Arc::clone(&semaphore);
            let prober = Arc::clone(&prober);
            let cancel = cancel.clone();

            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scan semaphore is never closed");

                if cancel.is_cancelled() {
                    return ProbeResult::cancelled(port);
                }

                prober.probe(port).await
            }
        })
        // Buffer generously; the semaphore controls actual concurrency.
        .buffer_unordered(concurrency.max(1000))
}

/// Execute a complete scan run.
///
/// Validates the configuration, drives [`scan_stream`] to completion, and
/// invokes `on_result` for every result as it arrives (completion order) so
/// the caller can surface open ports immediately. Returns the finalized
/// [`ScanRun`] with every port in the range accounted for.
///
/// Individual probe failures never abort the run; the only errors this
/// returns are pre-dispatch configuration problems.
pub async fn run_scan<P, F>(
    prober: Arc<P>,
    config: &ScanConfig,
    cancel: CancellationToken,
    mut on_result: F,
) -> ScanResult<ScanRun>
where
    P: Prober + 'static,
    F: FnMut(&ProbeResult),
{
    config.validate()?;

    let mut scan_run = ScanRun::new(config.target.clone(), config.range);
    scan_run.start();
    tracing::info!(
        target_addr = %config.target,
        range = %config.range,
        concurrency = config.concurrency,
        "scan started"
    );

    let stream = scan_stream(prober, config.range, config.concurrency, cancel);
    futures::pin_mut!(stream);

    while let Some(result) = stream.next().await {
        on_result(&result);
        scan_run.record(result);
    }

    scan_run.finalize()?;
    tracing::info!(
        open = scan_run.open_count(),
        cancelled = scan_run.cancelled_count(),
        duration_ms = scan_run.duration_ms(),
        "scan complete"
    );

    Ok(scan_run)
}
