//! Scan modes and their validated targets.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How scan targets are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Autonomous systems, expanded to their announced netblocks.
    Asns,
    /// CIDR blocks, expanded to host addresses.
    Netblocks,
    /// Literal addresses.
    #[serde(rename = "ipaddresses")]
    IpAddresses,
    /// Addresses of currently open tickets.
    Tickets,
}

impl ScanMode {
    /// All supported modes.
    pub const ALL: [ScanMode; 4] = [Self::Asns, Self::Netblocks, Self::IpAddresses, Self::Tickets];

    /// Configuration key / display name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asns => "asns",
            Self::Netblocks => "netblocks",
            Self::IpAddresses => "ipaddresses",
            Self::Tickets => "tickets",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = ConfigError;

    /// Mode names match exactly; `"Asns"` is not a mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownMode(s.to_string()))
    }
}

/// One configured mode together with its validated targets.
///
/// Entries are dispatched in the order they were configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeTarget {
    Asns(Vec<u32>),
    Netblocks(Vec<String>),
    IpAddresses(Vec<String>),
    Tickets,
}

impl ModeTarget {
    /// The mode this entry belongs to.
    pub fn mode(&self) -> ScanMode {
        match self {
            Self::Asns(_) => ScanMode::Asns,
            Self::Netblocks(_) => ScanMode::Netblocks,
            Self::IpAddresses(_) => ScanMode::IpAddresses,
            Self::Tickets => ScanMode::Tickets,
        }
    }
}
