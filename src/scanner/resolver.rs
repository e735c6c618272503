//! DNS resolver abstraction.
//!
//! The scanner only needs two queries: forward A lookups for RBL checks and
//! TXT lookups for ASN expansion. [`SystemResolver`] answers them from the
//! network, [`StaticResolver`] from an in-memory table.

use crate::error::{ScanError, ScanResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// Trait for DNS backends used by the scanner.
///
/// A name that does not exist, or exists without records of the requested
/// type, is `Ok` with an empty list. `Err` is reserved for resolution
/// failures such as timeouts.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve `name` to its IPv4 addresses.
    async fn lookup_ipv4(&self, name: &str) -> ScanResult<Vec<Ipv4Addr>>;

    /// Fetch the TXT records of `name`, one string per record.
    async fn lookup_txt(&self, name: &str) -> ScanResult<Vec<String>>;
}

/// Resolver using the host's DNS configuration.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Create a resolver from the system configuration, falling back to
    /// the library defaults when it cannot be read.
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            warn!("failed to read system DNS configuration, using defaults: {}", e);
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = timeout;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn lookup_ipv4(&self, name: &str) -> ScanResult<Vec<Ipv4Addr>> {
        match self.inner.lookup_ip(name).await {
            Ok(response) => Ok(response
                .iter()
                .filter_map(|ip| match ip {
                    IpAddr::V4(v4) => Some(v4),
                    IpAddr::V6(_) => None,
                })
                .collect()),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(ScanError::DnsResolution(format!("{}: {}", name, e))),
        }
    }

    async fn lookup_txt(&self, name: &str) -> ScanResult<Vec<String>> {
        match self.inner.txt_lookup(name).await {
            Ok(response) => Ok(response
                .iter()
                .map(|txt| {
                    txt.iter()
                        .map(|data| String::from_utf8_lossy(data).to_string())
                        .collect::<Vec<_>>()
                        .join("")
                })
                .collect()),
            Err(e) if matches!(e.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(ScanError::DnsResolution(format!("{}: {}", name, e))),
        }
    }
}

/// In-memory resolver answering from fixed tables.
///
/// Names are matched case-insensitively and without the trailing root dot.
/// Every query is recorded and can be inspected with [`StaticResolver::queries`].
#[derive(Default)]
pub struct StaticResolver {
    a: HashMap<String, Vec<Ipv4Addr>>,
    txt: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer A queries for `name` with `addr`.
    pub fn with_a(mut self, name: &str, addr: Ipv4Addr) -> Self {
        self.a.entry(normalize(name)).or_default().push(addr);
        self
    }

    /// Answer TXT queries for `name` with one more record.
    pub fn with_txt(mut self, name: &str, record: impl Into<String>) -> Self {
        self.txt.entry(normalize(name)).or_default().push(record.into());
        self
    }

    /// Make every query for `name` fail.
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(normalize(name));
        self
    }

    /// Names queried so far, in query order, as they were passed in.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, name: &str) -> ScanResult<String> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(name.to_string());

        let key = normalize(name);
        if self.failing.contains(&key) {
            return Err(ScanError::DnsResolution(format!("{}: simulated failure", name)));
        }
        Ok(key)
    }
}

#[async_trait]
impl DnsResolver for StaticResolver {
    async fn lookup_ipv4(&self, name: &str) -> ScanResult<Vec<Ipv4Addr>> {
        let key = self.record(name)?;
        Ok(self.a.get(&key).cloned().unwrap_or_default())
    }

    async fn lookup_txt(&self, name: &str) -> ScanResult<Vec<String>> {
        let key = self.record(name)?;
        Ok(self.txt.get(&key).cloned().unwrap_or_default())
    }
}

fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
