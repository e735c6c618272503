//! Target enumeration.
//!
//! Turns one configured mode entry into the addresses to scan. CIDR-based
//! modes yield parsed blocks whose hosts are produced on demand. Literal
//! entries are not validated here; the engine counts and skips the ones that
//! are not IPv4 addresses.

use super::asn::AsnResolver;
use super::rate_limiter::RateLimiter;
use super::resolver::DnsResolver;
use crate::error::{ConfigError, ScanResult};
use crate::storage::TicketStore;
use crate::types::{CidrBlock, ModeTarget};
use std::sync::Arc;
use tracing::info;

/// Addresses of one mode entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    /// Netblocks, expanded lazily through [`CidrBlock::hosts`].
    Blocks(Vec<CidrBlock>),
    /// Literal entries from the configuration or the ticket store.
    Entries(Vec<String>),
}

impl Targets {
    /// Number of candidate addresses.
    pub fn count(&self) -> u64 {
        match self {
            Self::Blocks(blocks) => blocks.iter().map(CidrBlock::host_count).sum(),
            Self::Entries(entries) => entries.len() as u64,
        }
    }
}

/// Produces scan addresses for mode entries.
pub struct TargetEnumerator {
    resolver: Arc<dyn DnsResolver>,
    limiter: Option<RateLimiter>,
    tickets: Option<Arc<dyn TicketStore>>,
}

impl TargetEnumerator {
    pub fn new(resolver: Arc<dyn DnsResolver>, limiter: Option<RateLimiter>) -> Self {
        Self {
            resolver,
            limiter,
            tickets: None,
        }
    }

    /// Set the ticket store used by the `tickets` mode.
    pub fn with_ticket_store(mut self, store: Arc<dyn TicketStore>) -> Self {
        self.tickets = Some(store);
        self
    }

    /// Enumerate the addresses of one mode entry.
    pub async fn enumerate(&self, target: &ModeTarget) -> ScanResult<Targets> {
        let targets = match target {
            ModeTarget::Asns(asns) => {
                let mut resolver = AsnResolver::new(Arc::clone(&self.resolver), self.limiter.clone());
                let mut blocks = Vec::new();
                for &asn in asns {
                    resolver.expand(asn, &mut blocks).await?;
                }
                info!(
                    asns = asns.len(),
                    netblocks = resolver.seen().len(),
                    "resolved ASNs"
                );
                Targets::Blocks(blocks)
            }
            ModeTarget::Netblocks(blocks) => Targets::Blocks(
                blocks
                    .iter()
                    .map(|block| CidrBlock::parse(block))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            ModeTarget::IpAddresses(addresses) => Targets::Entries(addresses.clone()),
            ModeTarget::Tickets => {
                let store = self.tickets.as_ref().ok_or(ConfigError::MissingTicketStore)?;
                Targets::Entries(
                    store
                        .open_tickets()
                        .await?
                        .into_iter()
                        .map(|ticket| ticket.ip)
                        .collect(),
                )
            }
        };

        info!(mode = %target.mode(), addresses = targets.count(), "enumerated targets");
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::scanner::resolver::StaticResolver;
    use crate::storage::JsonTicketStore;
    use std::io::Write;

    fn enumerator(resolver: StaticResolver) -> TargetEnumerator {
        TargetEnumerator::new(Arc::new(resolver), None)
    }

    #[tokio::test]
    async fn test_ipaddresses_pass_through() {
        let target = ModeTarget::IpAddresses(vec!["198.51.100.1".to_string(), "not-an-ip".to_string()]);
        let out = enumerator(StaticResolver::new()).enumerate(&target).await.unwrap();
        assert_eq!(
            out,
            Targets::Entries(vec!["198.51.100.1".to_string(), "not-an-ip".to_string()])
        );
    }

    #[tokio::test]
    async fn test_netblocks_expanded() {
        let target = ModeTarget::Netblocks(vec!["192.0.2.0/30".to_string(), "10.0.0.0/24".to_string()]);
        let out = enumerator(StaticResolver::new()).enumerate(&target).await.unwrap();
        assert_eq!(out.count(), 2 + 254);
        let Targets::Blocks(blocks) = out else {
            panic!("expected blocks");
        };
        assert_eq!(blocks[0].hosts().next(), Some(std::net::Ipv4Addr::new(192, 0, 2, 1)));
    }

    #[tokio::test]
    async fn test_large_netblock_not_materialized() {
        let target = ModeTarget::Netblocks(vec!["10.0.0.0/8".to_string()]);
        let out = enumerator(StaticResolver::new()).enumerate(&target).await.unwrap();
        assert_eq!(out.count(), 65536 * 254);
        assert_eq!(out, Targets::Blocks(vec![CidrBlock::parse("10.0.0.0/8").unwrap()]));
    }

    #[tokio::test]
    async fn test_invalid_netblock() {
        let target = ModeTarget::Netblocks(vec!["192.0.2.0".to_string()]);
        let result = enumerator(StaticResolver::new()).enumerate(&target).await;
        assert!(matches!(result, Err(ScanError::InvalidCidr(_))));
    }

    #[tokio::test]
    async fn test_asns_expanded() {
        let resolver = StaticResolver::new().with_txt("as64496.ascc.dnsbl.bit.nl", "192.0.2.0/30");
        let out = enumerator(resolver)
            .enumerate(&ModeTarget::Asns(vec![64496, 64496]))
            .await
            .unwrap();
        assert_eq!(out, Targets::Blocks(vec![CidrBlock::parse("192.0.2.0/30").unwrap()]));
    }

    #[tokio::test]
    async fn test_tickets_from_store() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{"id": 7, "ip": "203.0.113.9", "status": "OPEN"},
                 {"id": 8, "ip": "203.0.113.10", "status": "CLOSED"}]"#,
        )
        .unwrap();

        let out = enumerator(StaticResolver::new())
            .with_ticket_store(Arc::new(JsonTicketStore::new(file.path())))
            .enumerate(&ModeTarget::Tickets)
            .await
            .unwrap();
        assert_eq!(out, Targets::Entries(vec!["203.0.113.9".to_string()]));
    }

    #[tokio::test]
    async fn test_tickets_without_store() {
        let result = enumerator(StaticResolver::new()).enumerate(&ModeTarget::Tickets).await;
        assert!(matches!(result, Err(ScanError::Config(ConfigError::MissingTicketStore))));
    }
}
