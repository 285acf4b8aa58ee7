//! portreach binary entry point.
//!
//! Thin dispatch layer: parse and validate arguments, resolve the target,
//! wire Ctrl-C to run cancellation, drive the scan, render the results.
//! Exit code 0 means the run completed (even with zero open ports);
//! configuration errors and unresolvable hosts exit non-zero before any
//! network probing.

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use portreach::cli::Args;
use portreach::output;
use portreach::scanner::run_scan;
use portreach::types::ScanTarget;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Range/concurrency/timeout validation happens before resolution, so a
    // bad configuration never touches the network.
    args.validate()?;

    let target = ScanTarget::resolve(&args.target)
        .await
        .with_context(|| format!("cannot scan '{}'", args.target))?;

    let config = args.scan_config(target)?;
    output::print_scan_header(&config);

    // Ctrl-C cancels the run; undispatched ports are recorded as cancelled.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling scan");
            cancel_ctrlc.cancel();
        }
    });

    let progress = if args.verbose {
        let pb = ProgressBar::new(config.range.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let prober = Arc::new(config.prober());
    let run = run_scan(prober, &config, cancel, |result| {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
        if result.open {
            let line = output::open_port_line(result);
            match &progress {
                Some(pb) => pb.println(line),
                None => println!("{}", line),
            }
        }
    })
    .await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    output::print_scan_footer(&run);
    output::print_results(&run, args.output, args.show_closed)?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "portreach=debug" } else { "portreach=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
