//! Incident records produced by a scan.

use super::feed::{IncidentClass, IncidentType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Key under which the resolved listing reason is stored.
pub const REASON_KEY: &str = "reason";

/// One positive RBL hit for one address on one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Name of the feed that listed the address.
    pub source: String,
    pub ip: Ipv4Addr,
    pub class: IncidentClass,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    /// UTC midnight of the scan date.
    pub timestamp: DateTime<Utc>,
    pub information: BTreeMap<String, String>,
}

impl Incident {
    pub fn reason(&self) -> Option<&str> {
        self.information.get(REASON_KEY).map(String::as_str)
    }

    /// Identity used downstream to collapse repeated scans of the same day.
    pub fn dedup_key(&self) -> (&str, Ipv4Addr, IncidentClass, IncidentType, DateTime<Utc>) {
        (&self.source, self.ip, self.class, self.kind, self.timestamp)
    }
}
