//! ASN to netblock resolution.
//!
//! Announced prefixes are looked up through the ASCC TXT service at
//! `as<N>.ascc.dnsbl.bit.nl`, one prefix per TXT record.

use super::rate_limiter::{throttle, RateLimiter};
use super::resolver::DnsResolver;
use crate::error::ScanResult;
use crate::types::CidrBlock;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Zone serving ASN announcements.
pub const ASN_ZONE: &str = "ascc.dnsbl.bit.nl";

/// TXT query name for `asn`.
pub fn asn_query_name(asn: u32) -> String {
    format!("as{}.{}", asn, ASN_ZONE)
}

/// Expands ASNs to netblocks for one resolution pass.
///
/// A netblock is expanded at most once per pass, however many ASNs or TXT
/// records announce it.
pub struct AsnResolver {
    resolver: Arc<dyn DnsResolver>,
    limiter: Option<RateLimiter>,
    seen: HashSet<String>,
}

impl AsnResolver {
    pub fn new(resolver: Arc<dyn DnsResolver>, limiter: Option<RateLimiter>) -> Self {
        Self {
            resolver,
            limiter,
            seen: HashSet::new(),
        }
    }

    /// Netblocks announced by `asn`. A failed lookup yields none.
    pub async fn netblocks(&self, asn: u32) -> Vec<String> {
        let name = asn_query_name(asn);
        throttle(self.limiter.as_ref()).await;

        match self.resolver.lookup_txt(&name).await {
            Ok(records) => records
                .into_iter()
                .map(|record| record.trim().to_string())
                .filter(|record| !record.is_empty())
                .collect(),
            Err(e) => {
                warn!(asn, "ASN lookup failed, skipping: {}", e);
                Vec::new()
            }
        }
    }

    /// Append every netblock of `asn` not yet expanded in this pass. Returns
    /// the number of netblocks added.
    pub async fn expand(&mut self, asn: u32, out: &mut Vec<CidrBlock>) -> ScanResult<usize> {
        let mut expanded = 0;

        for netblock in self.netblocks(asn).await {
            if self.seen.contains(&netblock) {
                debug!(asn, %netblock, "netblock already expanded");
                continue;
            }

            let block = CidrBlock::parse(&netblock)?;
            debug!(asn, %block, hosts = block.host_count(), "expanded netblock");
            out.push(block);

            self.seen.insert(netblock);
            expanded += 1;
        }

        Ok(expanded)
    }

    /// Netblocks expanded so far in this pass.
    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }
}
