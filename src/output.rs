//! Output formatting.
//!
//! Open ports are printed the moment they are discovered; the finalized run
//! is rendered afterwards as a plain-text table, JSON, or CSV. Informational
//! bracket lines (resolved address, range, thread count, timestamps) go
//! around the scan but carry no machine-readable contract.

use crate::cli::OutputFormat;
use crate::scanner::{ProbeResult, ScanConfig, ScanRun};
use console::{style, Style};
use std::io::{self, Write};

/// One line per discovered open port, emitted as discovered.
pub fn open_port_line(result: &ProbeResult) -> String {
    match &result.banner {
        Some(banner) => format!(
            "Port {} {} | {}",
            style(result.port).green().bold(),
            style("OPEN").green().bold(),
            banner
        ),
        None => format!(
            "Port {} {} |",
            style(result.port).green().bold(),
            style("OPEN").green().bold()
        ),
    }
}

/// Informational lines printed before probing starts.
pub fn print_scan_header(config: &ScanConfig) {
    println!();
    println!(
        "{} Scanning target: {}",
        style("[~]").cyan(),
        style(&config.target).bold()
    );
    println!(
        "{} Port range: {} | Threads: {} | Timeout: {:?}",
        style("[~]").cyan(),
        config.range,
        config.concurrency,
        config.timeout
    );
    println!(
        "{} Scan start time: {}",
        style("[~]").cyan(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!();
}

/// Informational line printed after the run completes.
pub fn print_scan_footer(run: &ScanRun) {
    println!();
    println!(
        "{} Scan completed at: {} ({} open / {} scanned{})",
        style("[~]").cyan(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        style(run.open_count()).green().bold(),
        run.results.len(),
        if run.cancelled_count() > 0 {
            format!(", {} cancelled", run.cancelled_count())
        } else {
            String::new()
        }
    );
}

/// Render the finalized run in the requested format.
pub fn print_results(run: &ScanRun, format: OutputFormat, show_closed: bool) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(run, show_closed),
        OutputFormat::Json => print_json(run),
        OutputFormat::Csv => print_csv(run, show_closed),
    }
}

/// Plain-text summary table, port-ordered.
fn print_plain(run: &ScanRun, show_closed: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let rows: Vec<&ProbeResult> = run
        .sorted_results()
        .into_iter()
        .filter(|r| show_closed || r.open)
        .collect();

    writeln!(out)?;
    writeln!(
        out,
        "  {} {} | scan {}",
        style("Target:").bold(),
        run.target,
        run.id.short()
    )?;
    if let Some(ms) = run.duration_ms() {
        writeln!(
            out,
            "  {} {} ports in {:.2}s",
            style("Scanned:").bold(),
            run.results.len(),
            ms as f64 / 1000.0
        )?;
    }
    writeln!(out)?;

    if rows.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
        return Ok(());
    }

    writeln!(
        out,
        "  {:>6}  {:^8}  {}",
        style("PORT").bold(),
        style("STATE").bold(),
        style("BANNER").bold()
    )?;
    for result in rows {
        let (state, state_style) = if result.open {
            ("open", Style::new().green().bold())
        } else {
            match result.error {
                Some(e) => match e {
                    crate::error::ProbeError::Cancelled => ("cancelled", Style::new().yellow()),
                    crate::error::ProbeError::Timeout => ("timeout", Style::new().red()),
                    _ => ("closed", Style::new().red()),
                },
                None => ("closed", Style::new().red()),
            }
        };
        writeln!(
            out,
            "  {:>6}  {:^8}  {}",
            result.port,
            state_style.apply_to(state),
            style(result.banner.as_deref().unwrap_or("")).dim()
        )?;
    }

    Ok(())
}

/// JSON rendering of the whole run.
fn print_json(run: &ScanRun) -> io::Result<()> {
    let json = serde_json::to_string_pretty(run).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

/// CSV rendering, one row per result.
fn print_csv(run: &ScanRun, show_closed: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    wtr.write_record(["port", "open", "banner", "error"])?;
    for result in run.sorted_results() {
        if !show_closed && !result.open {
            continue;
        }
        wtr.write_record([
            result.port.to_string().as_str(),
            if result.open { "true" } else { "false" },
            result.banner.as_deref().unwrap_or(""),
            result
                .error
                .map(|e| e.to_string())
                .unwrap_or_default()
                .as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print a fatal error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("error:").red().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::types::Port;

    #[test]
    fn test_open_port_line_with_banner() {
        let result = ProbeResult::open(
            Port::new(22).unwrap(),
            Some("SSH-2.0-OpenSSH_8.9".to_string()),
        );
        let line = console::strip_ansi_codes(&open_port_line(&result)).to_string();
        assert_eq!(line, "Port 22 OPEN | SSH-2.0-OpenSSH_8.9");
    }

    #[test]
    fn test_open_port_line_without_banner() {
        let result = ProbeResult::open(Port::new(8080).unwrap(), None);
        let line = console::strip_ansi_codes(&open_port_line(&result)).to_string();
        assert_eq!(line, "Port 8080 OPEN |");
    }

    #[test]
    fn test_closed_port_never_formats_as_open() {
        let result = ProbeResult::closed(Port::new(23).unwrap(), ProbeError::Timeout);
        assert!(!result.open);
        assert!(result.banner.is_none());
    }
}
