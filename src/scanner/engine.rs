//! Scan engine.
//!
//! Runs every configured mode entry in order: enumerate its addresses, skip
//! and count the ones that are not IPv4, then check each remaining address
//! against every active feed with bounded concurrency.

use super::incident::IncidentBuilder;
use super::rate_limiter::RateLimiter;
use super::rbl::{parse_address, RblLookup};
use super::resolver::DnsResolver;
use super::targets::{TargetEnumerator, Targets};
use crate::config::{RawConfig, ScanSettings};
use crate::error::{ConfigError, ScanResult};
use crate::storage::TicketStore;
use crate::types::{FeedDefinition, Incident};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Result of a completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Valid addresses checked, summed over all mode entries.
    pub addresses_scanned: u64,
    /// RBL queries issued.
    pub lookups: u64,
    /// Targets skipped because they are not IPv4 addresses.
    pub warning_count: usize,
    pub incidents: Vec<Incident>,
}

/// Terminal state of a scan run.
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Success(ScanReport),
    Failed { reason: String },
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Incidents of a successful run, empty otherwise.
    pub fn incidents(&self) -> &[Incident] {
        match self {
            Self::Success(report) => &report.incidents,
            Self::Failed { .. } => &[],
        }
    }
}

impl From<ScanResult<ScanReport>> for ScanOutcome {
    fn from(result: ScanResult<ScanReport>) -> Self {
        match result {
            Ok(report) => Self::Success(report),
            Err(e) => Self::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Drives a scan from validated settings.
pub struct ScanEngine {
    settings: ScanSettings,
    resolver: Arc<dyn DnsResolver>,
    tickets: Option<Arc<dyn TicketStore>>,
    limiter: Option<RateLimiter>,
    show_progress: bool,
}

impl ScanEngine {
    pub fn new(settings: ScanSettings, resolver: Arc<dyn DnsResolver>) -> Self {
        let limiter = RateLimiter::new(settings.rate_limit);
        Self {
            settings,
            resolver,
            tickets: None,
            limiter,
            show_progress: false,
        }
    }

    /// Set the ticket store used by the `tickets` mode.
    pub fn with_ticket_store(mut self, store: Arc<dyn TicketStore>) -> Self {
        self.tickets = Some(store);
        self
    }

    /// Show a progress bar while lookups run.
    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Run the scan, reporting failure as [`ScanOutcome::Failed`].
    pub async fn run(&self) -> ScanOutcome {
        self.scan().await.into()
    }

    /// Run the scan.
    pub async fn scan(&self) -> ScanResult<ScanReport> {
        if self.settings.uses_tickets() && self.tickets.is_none() {
            return Err(ConfigError::MissingTicketStore.into());
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let builder = IncidentBuilder::new(started_at);
        let lookup = RblLookup::new(Arc::clone(&self.resolver), self.limiter.clone());
        let enumerator = self.enumerator();

        let feeds: Vec<&FeedDefinition> = self.settings.active_feeds().collect();
        for feed in self.settings.feeds.values().filter(|f| f.enabled && !f.is_scannable()) {
            warn!(feed = %feed.name, method = %feed.method, "feed method not supported by DNS scan, skipping");
        }

        let mut report = ScanReport {
            started_at,
            duration_ms: 0,
            addresses_scanned: 0,
            lookups: 0,
            warning_count: 0,
            incidents: Vec::new(),
        };

        for target in &self.settings.targets {
            let (count, incidents) = match enumerator.enumerate(target).await? {
                Targets::Blocks(blocks) => {
                    let count: u64 = blocks.iter().map(|b| b.host_count()).sum();
                    let addresses = blocks.iter().flat_map(|b| b.hosts());
                    let incidents = self.check_addresses(&lookup, &builder, addresses, count, &feeds).await;
                    (count, incidents)
                }
                Targets::Entries(entries) => {
                    let mut addresses = Vec::with_capacity(entries.len());
                    for entry in &entries {
                        match parse_address(entry) {
                            Some(addr) => addresses.push(addr),
                            None => {
                                warn!(mode = %target.mode(), %entry, "not a valid IPv4 address, skipping");
                                report.warning_count += 1;
                            }
                        }
                    }

                    let count = addresses.len() as u64;
                    let incidents = self
                        .check_addresses(&lookup, &builder, addresses.into_iter(), count, &feeds)
                        .await;
                    (count, incidents)
                }
            };

            info!(
                mode = %target.mode(),
                addresses = count,
                incidents = incidents.len(),
                "mode complete"
            );

            report.addresses_scanned += count;
            report.lookups += count * feeds.len() as u64;
            report.incidents.extend(incidents);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            incidents = report.incidents.len(),
            warnings = report.warning_count,
            duration_ms = report.duration_ms,
            "scan complete"
        );

        Ok(report)
    }

    /// Check one address against a single feed by name.
    ///
    /// Unknown or inactive feeds yield nothing; an unknown name is logged as
    /// an error since feed names come from validated configuration.
    pub async fn check_feed(&self, address: &str, feed_name: &str) -> Option<Incident> {
        let Some(feed) = self.settings.feeds.get(feed_name) else {
            error!(feed = %feed_name, "lookup requested for unknown feed");
            return None;
        };
        if !feed.is_scannable() {
            return None;
        }

        let addr = parse_address(address)?;
        let lookup = RblLookup::new(Arc::clone(&self.resolver), self.limiter.clone());
        lookup.lookup(addr, feed, &IncidentBuilder::new(Utc::now())).await
    }

    fn enumerator(&self) -> TargetEnumerator {
        let enumerator = TargetEnumerator::new(Arc::clone(&self.resolver), self.limiter.clone());
        match &self.tickets {
            Some(store) => enumerator.with_ticket_store(Arc::clone(store)),
            None => enumerator,
        }
    }

    /// Fan out lookups over every (address, feed) pair.
    ///
    /// `addresses` is consumed as lookups complete, so large blocks are never
    /// held in memory. `count` is its length.
    async fn check_addresses<I>(
        &self,
        lookup: &RblLookup,
        builder: &IncidentBuilder,
        addresses: I,
        count: u64,
        feeds: &[&FeedDefinition],
    ) -> Vec<Incident>
    where
        I: Iterator<Item = Ipv4Addr>,
    {
        let total = count * feeds.len() as u64;
        if total == 0 {
            return Vec::new();
        }

        let concurrency = self.settings.concurrency;
        let progress = self.show_progress.then(|| progress_bar(total));
        let semaphore = Arc::new(Semaphore::new(concurrency));

        let pairs = addresses.flat_map(|addr| feeds.iter().map(move |feed| (addr, *feed)));

        let incidents: Vec<Incident> = stream::iter(pairs)
            .map(|(addr, feed)| {
                let semaphore = Arc::clone(&semaphore);
                let progress = progress.clone();

                async move {
                    // The semaphore is never closed, so acquire cannot fail.
                    let _permit = semaphore.acquire().await.ok();
                    let incident = lookup.lookup(addr, feed, builder).await;

                    if let Some(ref pb) = progress {
                        pb.inc(1);
                        if incident.is_some() {
                            pb.set_message(format!("{} listed on {}", addr, feed.name));
                        }
                    }

                    incident
                }
            })
            .buffer_unordered(concurrency)
            .filter_map(|incident| async move { incident })
            .collect()
            .await;

        if let Some(pb) = progress {
            pb.finish_with_message("lookups complete");
        }

        incidents
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Validate `raw` and run a scan with the given collaborators.
///
/// Configuration problems come back as [`ScanOutcome::Failed`] before any
/// lookup is issued.
pub async fn scan_from_raw(
    raw: RawConfig,
    resolver: Arc<dyn DnsResolver>,
    tickets: Option<Arc<dyn TicketStore>>,
) -> ScanOutcome {
    let settings = match raw.validate() {
        Ok(settings) => settings,
        Err(e) => {
            error!("invalid scan configuration: {}", e);
            return ScanOutcome::Failed {
                reason: e.to_string(),
            };
        }
    };

    let engine = ScanEngine::new(settings, resolver);
    let engine = match tickets {
        Some(store) => engine.with_ticket_store(store),
        None => engine,
    };

    engine.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::resolver::StaticResolver;
    use crate::storage::JsonTicketStore;
    use serde_json::json;
    use std::io::Write;

    fn feed(zone: &str) -> serde_json::Value {
        json!({
            "zone": zone,
            "class": "SPAM",
            "type": "ABUSE",
            "enabled": true,
            "method": "dns",
            "codes": { "127.0.0.2": "listed" }
        })
    }

    fn raw(value: serde_json::Value) -> RawConfig {
        serde_json::from_value(value).unwrap()
    }

    fn report(outcome: ScanOutcome) -> ScanReport {
        match outcome {
            ScanOutcome::Success(report) => report,
            ScanOutcome::Failed { reason } => panic!("scan failed: {}", reason),
        }
    }

    #[tokio::test]
    async fn test_end_to_end_single_hit() {
        let resolver = Arc::new(
            StaticResolver::new().with_a("1.100.51.198.sbl.example.", Ipv4Addr::new(127, 0, 0, 2)),
        );
        let config = raw(json!({
            "modes": ["ipaddresses"],
            "ipaddresses": ["198.51.100.1"],
            "feeds": { "sbl": feed("sbl.example") }
        }));

        let report = report(scan_from_raw(config, resolver, None).await);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.warning_count, 0);

        let incident = &report.incidents[0];
        assert_eq!(incident.ip, Ipv4Addr::new(198, 51, 100, 1));
        assert_eq!(incident.source, "sbl");
        assert_eq!(incident.reason(), Some("listed"));
    }

    #[tokio::test]
    async fn test_invalid_address_counts_one_warning() {
        let resolver = Arc::new(StaticResolver::new());
        let config = raw(json!({
            "modes": ["ipaddresses"],
            "ipaddresses": ["not-an-ip", "198.51.100.1"],
            "feeds": { "one": feed("one.example"), "two": feed("two.example") }
        }));

        let report = report(scan_from_raw(config, Arc::clone(&resolver) as Arc<dyn DnsResolver>, None).await);
        assert_eq!(report.warning_count, 1);
        assert!(report.incidents.is_empty());
        assert_eq!(report.addresses_scanned, 1);
        assert_eq!(resolver.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_mode_fails_without_incidents() {
        let config = raw(json!({
            "modes": ["bogus"],
            "feeds": { "sbl": feed("sbl.example") }
        }));

        let outcome = scan_from_raw(config, Arc::new(StaticResolver::new()), None).await;
        match &outcome {
            ScanOutcome::Failed { reason } => assert!(reason.contains("not an option")),
            ScanOutcome::Success(_) => panic!("expected failure"),
        }
        assert!(outcome.incidents().is_empty());
    }

    #[tokio::test]
    async fn test_modes_accumulate_and_disabled_feeds_skipped() {
        let resolver = Arc::new(
            StaticResolver::new()
                .with_a("1.100.51.198.sbl.example.", Ipv4Addr::new(127, 0, 0, 2))
                .with_a("2.2.0.192.sbl.example.", Ipv4Addr::new(127, 0, 0, 4))
                .with_a("1.100.51.198.off.example.", Ipv4Addr::new(127, 0, 0, 2)),
        );
        let mut disabled = feed("off.example");
        disabled["enabled"] = json!(false);
        let mut file_feed = feed("file.example");
        file_feed["method"] = json!("file");

        let config = raw(json!({
            "modes": ["ipaddresses", "netblocks"],
            "ipaddresses": ["198.51.100.1"],
            "netblocks": ["192.0.2.0/30"],
            "feeds": { "sbl": feed("sbl.example"), "off": disabled, "zonefile": file_feed },
            "concurrency": 2
        }));

        let report = report(
            scan_from_raw(config, Arc::clone(&resolver) as Arc<dyn DnsResolver>, None).await,
        );
        assert_eq!(report.incidents.len(), 2);
        assert_eq!(report.addresses_scanned, 3);
        assert_eq!(report.lookups, 3);
        assert!(report.incidents.iter().all(|i| i.source == "sbl"));

        let hit = report
            .incidents
            .iter()
            .find(|i| i.ip == Ipv4Addr::new(192, 0, 2, 2))
            .unwrap();
        assert_eq!(hit.reason(), Some("SPAM Sending host"));

        let queries = resolver.queries();
        assert!(queries.iter().all(|q| q.ends_with(".sbl.example.")));
    }

    #[tokio::test]
    async fn test_netblock_hosts_streamed_to_lookups() {
        let resolver = Arc::new(
            StaticResolver::new().with_a("7.1.0.10.sbl.example.", Ipv4Addr::new(127, 0, 0, 2)),
        );
        let config = raw(json!({
            "modes": ["netblocks"],
            "netblocks": ["10.0.0.0/23"],
            "feeds": { "sbl": feed("sbl.example") },
            "concurrency": 8
        }));

        let report = report(
            scan_from_raw(config, Arc::clone(&resolver) as Arc<dyn DnsResolver>, None).await,
        );
        assert_eq!(report.addresses_scanned, 508);
        assert_eq!(report.lookups, 508);
        assert_eq!(resolver.queries().len(), 508);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].ip, Ipv4Addr::new(10, 0, 1, 7));
    }

    #[tokio::test]
    async fn test_oversized_concurrency_fails_before_lookups() {
        let resolver = Arc::new(StaticResolver::new());
        let config = raw(json!({
            "modes": ["ipaddresses"],
            "ipaddresses": ["198.51.100.1"],
            "feeds": { "sbl": feed("sbl.example") },
            "concurrency": u64::MAX
        }));

        let outcome = scan_from_raw(config, Arc::clone(&resolver) as Arc<dyn DnsResolver>, None).await;
        assert!(matches!(outcome, ScanOutcome::Failed { ref reason } if reason.contains("concurrency")));
        assert!(resolver.queries().is_empty());
    }

    #[tokio::test]
    async fn test_tickets_mode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"id": 1, "ip": "203.0.113.5", "status": "OPEN"}]"#)
            .unwrap();

        let resolver = Arc::new(
            StaticResolver::new().with_a("5.113.0.203.sbl.example.", Ipv4Addr::new(127, 0, 0, 2)),
        );
        let config = raw(json!({
            "modes": ["tickets"],
            "feeds": { "sbl": feed("sbl.example") }
        }));

        let store: Arc<dyn TicketStore> = Arc::new(JsonTicketStore::new(file.path()));
        let report = report(scan_from_raw(config, resolver, Some(store)).await);
        assert_eq!(report.incidents.len(), 1);
        assert_eq!(report.incidents[0].ip, Ipv4Addr::new(203, 0, 113, 5));
    }

    #[tokio::test]
    async fn test_tickets_mode_requires_store() {
        let config = raw(json!({
            "modes": ["tickets"],
            "feeds": { "sbl": feed("sbl.example") }
        }));

        let resolver = Arc::new(StaticResolver::new());
        let outcome = scan_from_raw(config, Arc::clone(&resolver) as Arc<dyn DnsResolver>, None).await;
        assert!(!outcome.is_success());
        assert!(resolver.queries().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_netblock_fails_run() {
        let config = raw(json!({
            "modes": ["netblocks"],
            "netblocks": ["192.0.2.0/40"],
            "feeds": { "sbl": feed("sbl.example") }
        }));

        let outcome = scan_from_raw(config, Arc::new(StaticResolver::new()), None).await;
        assert!(matches!(outcome, ScanOutcome::Failed { ref reason } if reason.contains("CIDR")));
    }

    #[tokio::test]
    async fn test_check_feed_by_name() {
        let resolver = Arc::new(
            StaticResolver::new().with_a("1.100.51.198.sbl.example.", Ipv4Addr::new(127, 0, 0, 2)),
        );
        let settings = raw(json!({
            "modes": ["ipaddresses"],
            "ipaddresses": ["198.51.100.1"],
            "feeds": { "sbl": feed("sbl.example") }
        }))
        .validate()
        .unwrap();
        let engine = ScanEngine::new(settings, resolver);

        assert!(engine.check_feed("198.51.100.1", "sbl").await.is_some());
        assert!(engine.check_feed("198.51.100.1", "missing").await.is_none());
        assert!(engine.check_feed("not-an-ip", "sbl").await.is_none());
    }
}
