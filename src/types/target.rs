//! CIDR block parsing and host expansion.
//!
//! Expansion walks from the network address up to, but not including, the
//! last address of the block, and additionally drops any address whose last
//! octet is `0` or `255` whatever the prefix length. Blocks that are not
//! /24-aligned therefore lose some usable hosts, and a /32 expands to nothing.

use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
}

/// A validated IPv4 CIDR block, normalized to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    network: Ipv4Network,
}

impl CidrBlock {
    /// Parse `addr/prefix`. The prefix is mandatory and host bits in `addr`
    /// are masked off.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        let invalid = || TargetError::InvalidCidr(s.to_string());

        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;

        let network = Ipv4Network::new(addr, prefix).map_err(|_| invalid())?;
        let network = Ipv4Network::new(network.network(), prefix).map_err(|_| invalid())?;

        Ok(Self { network })
    }

    /// Prefix length (0-32).
    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    /// Number of addresses in the block, before host filtering.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix()))
    }

    /// First and last address of the block (inclusive).
    pub fn range(&self) -> (Ipv4Addr, Ipv4Addr) {
        let (begin, end) = self.bounds();
        (Ipv4Addr::from(begin as u32), Ipv4Addr::from(end as u32))
    }

    /// Number of addresses [`hosts`](Self::hosts) yields, computed without
    /// walking the block.
    pub fn host_count(&self) -> u64 {
        if self.prefix() < 24 {
            // Each /24 keeps .1 to .254; the skipped last address is a .255.
            self.size() / 256 * 254
        } else {
            self.hosts().count() as u64
        }
    }

    /// Iterate the scannable hosts of this block in ascending order.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> {
        let (begin, end) = self.bounds();
        (begin..end)
            .map(|n| Ipv4Addr::from(n as u32))
            .filter(is_scannable_host)
    }

    fn bounds(&self) -> (u64, u64) {
        let begin = u64::from(u32::from(self.network.network()));
        (begin, begin + self.size() - 1)
    }
}

impl FromStr for CidrBlock {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.network(), self.prefix())
    }
}

/// Expand a CIDR string into its scannable host addresses.
pub fn expand_cidr(s: &str) -> Result<Vec<Ipv4Addr>, TargetError> {
    Ok(CidrBlock::parse(s)?.hosts().collect())
}

/// Drops `.0` and `.255` addresses.
fn is_scannable_host(addr: &Ipv4Addr) -> bool {
    !matches!(addr.octets()[3], 0 | 255)
}
