//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::{print_json, write_json};
pub use plain::{print_error, print_plain, print_scan_header, print_warning, write_plain};

use crate::cli::OutputFormat;
use crate::scanner::ScanReport;
use std::io;

/// Format and print a scan report according to the specified format.
pub fn print_report(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(report),
        OutputFormat::Json => print_json(report),
        OutputFormat::Csv => print_csv(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::scanner::ScanReport;
    use crate::types::{Incident, IncidentClass, IncidentType};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::net::Ipv4Addr;

    pub(crate) fn sample_report() -> ScanReport {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap();
        ScanReport {
            started_at: timestamp,
            duration_ms: 1250,
            addresses_scanned: 2,
            lookups: 2,
            warning_count: 1,
            incidents: vec![Incident {
                source: "sbl".to_string(),
                ip: Ipv4Addr::new(198, 51, 100, 1),
                class: IncidentClass::Spam,
                kind: IncidentType::Abuse,
                timestamp,
                information: BTreeMap::from([("reason".to_string(), "listed".to_string())]),
            }],
        }
    }

    #[test]
    fn test_json_report() {
        let mut buf = Vec::new();
        super::write_json(&mut buf, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["warning_count"], 1);
        assert_eq!(value["incidents"][0]["type"], "ABUSE");
        assert_eq!(value["incidents"][0]["information"]["reason"], "listed");
    }
}
