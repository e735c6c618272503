//! Per-address RBL lookups.
//!
//! An address is listed on a feed when the reversed-octet name under the
//! feed zone resolves. The returned address is the listing code.

use super::incident::IncidentBuilder;
use super::rate_limiter::{throttle, RateLimiter};
use super::resolver::DnsResolver;
use crate::types::{FeedDefinition, Incident};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of checking one address against one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not listed, or the lookup failed.
    Clean,
    /// Listed with a code the feed ignores.
    Ignored(Ipv4Addr),
    /// Listed with this code.
    Listed(Ipv4Addr),
}

/// Build the RBL query name: reversed octets, the zone, and the root dot.
pub fn query_name(addr: Ipv4Addr, zone: &str) -> String {
    let [a, b, c, d] = addr.octets();
    format!("{}.{}.{}.{}.{}.", d, c, b, a, zone.trim_end_matches('.'))
}

/// Parse a scan target as an IPv4 address.
pub fn parse_address(target: &str) -> Option<Ipv4Addr> {
    target.trim().parse().ok()
}

/// Performs RBL lookups for enabled DNS feeds.
#[derive(Clone)]
pub struct RblLookup {
    resolver: Arc<dyn DnsResolver>,
    limiter: Option<RateLimiter>,
}

impl RblLookup {
    pub fn new(resolver: Arc<dyn DnsResolver>, limiter: Option<RateLimiter>) -> Self {
        Self { resolver, limiter }
    }

    /// Check `addr` against `feed`.
    ///
    /// Resolution failures count as clean; they are logged so an operator
    /// can tell a broken zone from a clean range.
    pub async fn check(&self, addr: Ipv4Addr, feed: &FeedDefinition) -> Verdict {
        let name = query_name(addr, &feed.zone);
        throttle(self.limiter.as_ref()).await;
        debug!(feed = %feed.name, query = %name, "RBL lookup");

        let code = match self.resolver.lookup_ipv4(&name).await {
            Ok(answers) => match answers.first() {
                Some(code) => *code,
                None => {
                    trace!(feed = %feed.name, %addr, "not listed");
                    return Verdict::Clean;
                }
            },
            Err(e) => {
                warn!(feed = %feed.name, %addr, "RBL lookup failed, treating as not listed: {}", e);
                return Verdict::Clean;
            }
        };

        if feed.is_ignored(&code.to_string()) {
            debug!(feed = %feed.name, %addr, %code, "ignored listing code");
            return Verdict::Ignored(code);
        }

        debug!(feed = %feed.name, %addr, %code, "listed");
        Verdict::Listed(code)
    }

    /// Check `addr` against `feed` and build the incident for a hit.
    pub async fn lookup(
        &self,
        addr: Ipv4Addr,
        feed: &FeedDefinition,
        builder: &IncidentBuilder,
    ) -> Option<Incident> {
        match self.check(addr, feed).await {
            Verdict::Listed(code) => Some(builder.build(addr, feed, code)),
            Verdict::Clean | Verdict::Ignored(_) => None,
        }
    }
}
