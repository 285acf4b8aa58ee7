//! # portreach - Host Port-Reachability Scanner
//!
//! Given a resolved target address and an inclusive port range, portreach
//! determines which ports accept TCP connections within a bound and, for
//! open ports, attempts to read the initial service banner.
//!
//! ## Features
//!
//! - **Bounded concurrency**: semaphore-gated dispatch, at most `C` probes
//!   in flight, no join-barrier batching
//! - **Per-connection timeouts**: a slow or silent peer can never stall the
//!   run beyond its timeout
//! - **Banner grabbing**: best-effort read of the first bytes a service
//!   sends unprompted
//! - **Completion-order streaming**: open ports surface the moment they are
//!   discovered
//! - **Cancellation**: an external stop signal halts dispatch while keeping
//!   one result per port
//! - **Multiple output formats**: plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use portreach::scanner::{run_scan, ScanConfig};
//! use portreach::types::{PortRange, ScanTarget};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = ScanTarget::resolve("127.0.0.1").await?;
//!     let config = ScanConfig::new(target, PortRange::from_bounds(20, 25)?);
//!
//!     let run = run_scan(
//!         Arc::new(config.prober()),
//!         &config,
//!         CancellationToken::new(),
//!         |result| {
//!             if result.open {
//!                 println!("{} is open", result.port);
//!             }
//!         },
//!     )
//!     .await?;
//!
//!     println!("{} open ports", run.open_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Core type definitions with newtype patterns for type safety
//! - [`scanner`] - The connection prober and the scan coordinator
//! - [`banner`] - Banner capture and sanitization
//! - [`error`] - Fatal scan errors and the per-port probe taxonomy
//! - [`cli`] / [`output`] - Argument parsing and result rendering

pub mod banner;
pub mod cli;
pub mod error;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use error::{ProbeError, ScanError, ScanResult};
pub use scanner::{
    run_scan, scan_stream, ProbeResult, Prober, ScanConfig, ScanRun, ScanState, TcpProber,
};
pub use types::{Port, PortRange, ScanId, ScanTarget};
