//! Incident construction.
//!
//! Every incident of a run carries the same timestamp: the UTC midnight of
//! the day the run started. Repeated scans on one day therefore produce
//! identical `(source, ip, class, type, timestamp)` keys.

use crate::types::{FeedDefinition, Incident, DEFAULT_CODE_KEY, REASON_KEY};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use std::net::Ipv4Addr;

/// Reason used when neither the returned code nor `default` is mapped.
pub const FALLBACK_REASON: &str = "SPAM Sending host";

/// Truncate an instant to UTC midnight of its day.
pub fn day_bucket(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN))
}

/// Resolve the human readable reason for a returned code.
pub fn resolve_reason<'a>(feed: &'a FeedDefinition, code: &str) -> &'a str {
    feed.codes
        .get(code)
        .or_else(|| feed.codes.get(DEFAULT_CODE_KEY))
        .map(String::as_str)
        .unwrap_or(FALLBACK_REASON)
}

/// Builds incidents for one scan run.
#[derive(Debug, Clone, Copy)]
pub struct IncidentBuilder {
    timestamp: DateTime<Utc>,
}

impl IncidentBuilder {
    /// Create a builder for a run started at `scanned_at`.
    pub fn new(scanned_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: day_bucket(scanned_at),
        }
    }

    /// The bucketed timestamp stamped on every incident.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Build the incident for `ip` listed on `feed` with result `code`.
    pub fn build(&self, ip: Ipv4Addr, feed: &FeedDefinition, code: Ipv4Addr) -> Incident {
        let code = code.to_string();
        let mut information = feed.information.clone();
        information.insert(REASON_KEY.to_string(), resolve_reason(feed, &code).to_string());

        Incident {
            source: feed.name.clone(),
            ip,
            class: feed.class,
            kind: feed.kind,
            timestamp: self.timestamp,
            information,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeedMethod, IncidentClass, IncidentType};
    use std::collections::{BTreeMap, BTreeSet};

    fn feed(codes: &[(&str, &str)]) -> FeedDefinition {
        FeedDefinition {
            name: "sbl".to_string(),
            zone: "sbl.example".to_string(),
            class: IncidentClass::Spam,
            kind: IncidentType::Abuse,
            enabled: true,
            method: FeedMethod::Dns,
            codes: codes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ignore_codes: BTreeSet::new(),
            information: BTreeMap::from([("delisting".to_string(), "https://sbl.example/".to_string())]),
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, 0).unwrap()
    }

    #[test]
    fn test_reason_resolution_order() {
        let exact = feed(&[("127.0.0.2", "direct"), ("default", "generic")]);
        assert_eq!(resolve_reason(&exact, "127.0.0.2"), "direct");
        assert_eq!(resolve_reason(&exact, "127.0.0.4"), "generic");

        let bare = feed(&[("127.0.0.2", "direct")]);
        assert_eq!(resolve_reason(&bare, "127.0.0.9"), FALLBACK_REASON);
    }

    #[test]
    fn test_build_incident() {
        let feed = feed(&[("127.0.0.2", "direct")]);
        let builder = IncidentBuilder::new(at(14, 30));
        let ip = Ipv4Addr::new(198, 51, 100, 1);
        let incident = builder.build(ip, &feed, Ipv4Addr::new(127, 0, 0, 2));

        assert_eq!(incident.source, "sbl");
        assert_eq!(incident.ip, ip);
        assert_eq!(incident.class, IncidentClass::Spam);
        assert_eq!(incident.kind, IncidentType::Abuse);
        assert_eq!(incident.reason(), Some("direct"));
        assert_eq!(incident.information.get("delisting").map(String::as_str), Some("https://sbl.example/"));
        assert_eq!(incident.timestamp, Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unmapped_code_uses_fallback() {
        let feed = feed(&[("127.0.0.2", "direct")]);
        let incident = IncidentBuilder::new(at(1, 0)).build(
            Ipv4Addr::new(198, 51, 100, 1),
            &feed,
            Ipv4Addr::new(127, 0, 0, 10),
        );
        assert_eq!(incident.reason(), Some("SPAM Sending host"));
    }

    #[test]
    fn test_same_day_same_timestamp() {
        let feed = feed(&[("127.0.0.2", "direct")]);
        let ip = Ipv4Addr::new(198, 51, 100, 1);
        let code = Ipv4Addr::new(127, 0, 0, 2);

        let morning = IncidentBuilder::new(at(0, 5)).build(ip, &feed, code);
        let evening = IncidentBuilder::new(at(23, 55)).build(ip, &feed, code);
        assert_eq!(morning.timestamp, evening.timestamp);
        assert_eq!(morning.dedup_key(), evening.dedup_key());

        let next_day = IncidentBuilder::new(at(23, 55) + chrono::Duration::minutes(10))
            .build(ip, &feed, code);
        assert_ne!(next_day.timestamp, morning.timestamp);
    }
}
