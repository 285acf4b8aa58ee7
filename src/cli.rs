//! Command-line interface definitions.
//!
//! Uses `clap` derive macros for declarative argument parsing. Raw argument
//! values are converted into a validated [`ScanConfig`] before any network
//! activity; bad ranges, zero concurrency, and zero timeouts are rejected
//! here with a non-zero exit.

use crate::error::ScanResult;
use crate::scanner::ScanConfig;
use crate::types::{PortRange, ScanTarget};
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// A host port-reachability scanner with banner grabbing.
#[derive(Parser, Debug)]
#[command(name = "portreach")]
#[command(version)]
#[command(about = "Scan a host's TCP ports and grab service banners", long_about = None)]
pub struct Args {
    /// Target IP address or hostname to scan
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// First port of the inclusive range
    #[arg(short = 's', long, default_value = "1", value_name = "PORT")]
    pub start: u16,

    /// Last port of the inclusive range
    #[arg(short = 'e', long, default_value = "1024", value_name = "PORT")]
    pub end: u16,

    /// Maximum number of simultaneously in-flight probes
    #[arg(short = 't', long, default_value = "100", value_name = "N")]
    pub threads: usize,

    /// Per-connection timeout in seconds
    #[arg(long, default_value = "1", value_name = "SECONDS")]
    pub timeout: u64,

    /// Banner-read timeout in seconds (defaults to the connect timeout)
    #[arg(long, value_name = "SECONDS")]
    pub banner_timeout: Option<u64>,

    /// Output format for the finalized run
    #[arg(short = 'o', long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Include closed and errored ports in the summary
    #[arg(long)]
    pub show_closed: bool,

    /// Verbose output (progress bar and debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Args {
    /// Validate the numeric arguments into a port range, without touching
    /// the network. Called before target resolution so that `start > end`
    /// and friends fail fast.
    pub fn port_range(&self) -> ScanResult<PortRange> {
        Ok(PortRange::from_bounds(self.start, self.end)?)
    }

    /// Full pre-resolution validation: range, concurrency, and timeouts.
    /// Runs before DNS so a bad configuration causes zero network activity.
    pub fn validate(&self) -> ScanResult<()> {
        use crate::error::ScanError;
        self.port_range()?;
        if self.threads < 1 {
            return Err(ScanError::InvalidConfig(
                "threads must be at least 1".into(),
            ));
        }
        if self.timeout == 0 || self.banner_timeout == Some(0) {
            return Err(ScanError::InvalidConfig("timeout must be positive".into()));
        }
        Ok(())
    }

    /// Build the scan configuration once the target has resolved.
    pub fn scan_config(&self, target: ScanTarget) -> ScanResult<ScanConfig> {
        let range = self.port_range()?;
        let config = ScanConfig::new(target, range)
            .with_concurrency(self.threads)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_banner_timeout(Duration::from_secs(
                self.banner_timeout.unwrap_or(self.timeout),
            ));
        config.validate()?;
        Ok(config)
    }
}
