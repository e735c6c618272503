//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print a scan report in human-readable plain text format.
pub fn print_plain(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, report)
}

/// Write a scan report as plain text.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    // Header
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                    {} Scan Results", style("rblscan").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {} addresses, {} lookups in {:.2}s",
        style("Statistics:").bold(),
        report.addresses_scanned,
        report.lookups,
        report.duration_ms as f64 / 1000.0
    )?;
    writeln!(
        out,
        "               {} incidents, {} skipped targets",
        style(report.incidents.len()).red().bold(),
        style(report.warning_count).yellow()
    )?;
    writeln!(out)?;

    if report.incidents.is_empty() {
        writeln!(out, "  {}", style("No listed addresses.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:<15}  {:<16}  {:<20}  {}",
            style("ADDRESS").bold(),
            style("FEED").bold(),
            style("CLASS").bold(),
            style("REASON").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for incident in &report.incidents {
            writeln!(
                out,
                "  {:<15}  {:<16}  {:<20}  {}",
                incident.ip,
                truncate_string(&incident.source, 16),
                incident.class,
                style(truncate_string(incident.reason().unwrap_or(""), 40)).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(modes: &[String], feeds: usize) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("rblscan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{} Modes: {}", style("•").dim(), style(modes.join(", ")).yellow());
    eprintln!("{} Checking against {} feeds...", style("•").dim(), style(feeds).white().bold());
    eprintln!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_plain_lists_incidents() {
        let mut buf = Vec::new();
        write_plain(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("198.51.100.1"));
        assert!(text.contains("listed"));
    }
}
