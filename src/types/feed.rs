//! RBL feed definitions and the abuse taxonomy.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Key in [`FeedDefinition::codes`] used when no exact code matches.
pub const DEFAULT_CODE_KEY: &str = "default";

/// Abuse classification attached to every incident of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentClass {
    BotnetController,
    BotnetInfection,
    CompromisedServer,
    CompromisedWebsite,
    DdosSendingServer,
    DistributionWebsite,
    Harvesting,
    Informational,
    MalwareInfection,
    OpenDnsResolver,
    OpenProxyServer,
    PhishingWebsite,
    RblListed,
    Spam,
    Spamtrap,
}

impl IncidentClass {
    pub const ALL: [IncidentClass; 15] = [
        Self::BotnetController,
        Self::BotnetInfection,
        Self::CompromisedServer,
        Self::CompromisedWebsite,
        Self::DdosSendingServer,
        Self::DistributionWebsite,
        Self::Harvesting,
        Self::Informational,
        Self::MalwareInfection,
        Self::OpenDnsResolver,
        Self::OpenProxyServer,
        Self::PhishingWebsite,
        Self::RblListed,
        Self::Spam,
        Self::Spamtrap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BotnetController => "BOTNET_CONTROLLER",
            Self::BotnetInfection => "BOTNET_INFECTION",
            Self::CompromisedServer => "COMPROMISED_SERVER",
            Self::CompromisedWebsite => "COMPROMISED_WEBSITE",
            Self::DdosSendingServer => "DDOS_SENDING_SERVER",
            Self::DistributionWebsite => "DISTRIBUTION_WEBSITE",
            Self::Harvesting => "HARVESTING",
            Self::Informational => "INFORMATIONAL",
            Self::MalwareInfection => "MALWARE_INFECTION",
            Self::OpenDnsResolver => "OPEN_DNS_RESOLVER",
            Self::OpenProxyServer => "OPEN_PROXY_SERVER",
            Self::PhishingWebsite => "PHISHING_WEBSITE",
            Self::RblListed => "RBL_LISTED",
            Self::Spam => "SPAM",
            Self::Spamtrap => "SPAMTRAP",
        }
    }
}

impl fmt::Display for IncidentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown incident class: {}", s))
    }
}

/// Severity type of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
    Abuse,
    Info,
    Escalation,
}

impl IncidentType {
    pub const ALL: [IncidentType; 3] = [Self::Abuse, Self::Info, Self::Escalation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abuse => "ABUSE",
            Self::Info => "INFO",
            Self::Escalation => "ESCALATION",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown incident type: {}", s))
    }
}

/// How a feed is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMethod {
    /// Live reversed-octet A lookups against the feed zone.
    Dns,
    /// Downloaded zone files. Not scanned by this engine.
    File,
}

impl FromStr for FeedMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dns" => Ok(Self::Dns),
            "file" => Ok(Self::File),
            _ => Err(format!("unknown feed method: {}", s)),
        }
    }
}

impl fmt::Display for FeedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dns => write!(f, "dns"),
            Self::File => write!(f, "file"),
        }
    }
}

/// A validated RBL feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedDefinition {
    /// Unique feed name.
    pub name: String,
    /// Zone suffix the reversed address is looked up under.
    pub zone: String,
    pub class: IncidentClass,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    pub enabled: bool,
    pub method: FeedMethod,
    /// Returned address → human readable reason.
    pub codes: BTreeMap<String, String>,
    /// Returned addresses that do not count as a listing.
    pub ignore_codes: BTreeSet<String>,
    /// Static metadata copied into every incident.
    pub information: BTreeMap<String, String>,
}

impl FeedDefinition {
    /// Whether the DNS scanner should query this feed.
    pub fn is_scannable(&self) -> bool {
        self.enabled && self.method == FeedMethod::Dns
    }

    pub fn is_ignored(&self, code: &str) -> bool {
        self.ignore_codes.contains(code)
    }
}
