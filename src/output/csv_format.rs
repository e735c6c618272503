//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Print incidents in CSV format.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(stdout.lock(), report)
}

/// Write one CSV row per incident.
pub fn write_csv<W: Write>(out: W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["source", "ip", "class", "type", "timestamp", "reason"])?;

    for incident in &report.incidents {
        let ip = incident.ip.to_string();
        let timestamp = incident.timestamp.to_rfc3339();
        wtr.write_record([
            incident.source.as_str(),
            ip.as_str(),
            incident.class.as_str(),
            incident.kind.as_str(),
            timestamp.as_str(),
            incident.reason().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
