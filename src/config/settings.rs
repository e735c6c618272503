//! Scan settings and configuration paths.
//!
//! [`RawConfig`] mirrors the JSON file. [`ScanSettings`] is the validated,
//! strongly typed form the scan engine is built from.

use super::feeds::RawFeed;
use crate::error::{ConfigError, ConfigResult};
use crate::types::{FeedDefinition, ModeTarget, ScanMode};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/rblscan)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/rblscan)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve the XDG directories for this application.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("org", "rblscan", "rblscan").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Default scan configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Default ticket export used by the `tickets` mode.
    pub fn tickets_file(&self) -> PathBuf {
        self.data_dir.join("tickets.json")
    }
}

/// Upper bound for `concurrency`.
pub const MAX_CONCURRENCY: usize = 65_536;

fn default_concurrency() -> usize {
    16
}

fn default_timeout() -> u64 {
    5000
}

/// Scan configuration as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    /// Ordered list of mode names.
    #[serde(default)]
    pub modes: Option<Vec<String>>,
    #[serde(default)]
    pub asns: Option<Value>,
    #[serde(default)]
    pub netblocks: Option<Value>,
    #[serde(default)]
    pub ipaddresses: Option<Value>,
    /// Feed name → feed definition.
    #[serde(default)]
    pub feeds: Option<BTreeMap<String, Value>>,
    /// Maximum number of DNS lookups in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-query DNS timeout in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Maximum DNS queries per second, 0 for unlimited.
    #[serde(default)]
    pub rate_limit: u32,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            modes: None,
            asns: None,
            netblocks: None,
            ipaddresses: None,
            feeds: None,
            concurrency: default_concurrency(),
            timeout_ms: default_timeout(),
            rate_limit: 0,
        }
    }
}

impl RawConfig {
    /// Load a configuration file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse a configuration document.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Validate into [`ScanSettings`].
    pub fn validate(self) -> ConfigResult<ScanSettings> {
        let modes = self
            .modes
            .as_ref()
            .filter(|modes| !modes.is_empty())
            .ok_or(ConfigError::MissingModes)?;

        let mut targets = Vec::with_capacity(modes.len());
        for name in modes {
            let mode: ScanMode = name.parse()?;
            targets.push(self.mode_target(mode)?);
        }

        let raw_feeds = self
            .feeds
            .filter(|feeds| !feeds.is_empty())
            .ok_or(ConfigError::MissingFeeds)?;

        let mut feeds = BTreeMap::new();
        for (name, value) in raw_feeds {
            let feed = RawFeed::from_value(&name, value)?.validate(&name)?;
            feeds.insert(name, feed);
        }

        if !(1..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidSetting {
                name: "concurrency".to_string(),
                reason: format!("must be between 1 and {}", MAX_CONCURRENCY),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "timeout_ms".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(ScanSettings {
            targets,
            feeds,
            concurrency: self.concurrency,
            timeout: Duration::from_millis(self.timeout_ms),
            rate_limit: self.rate_limit,
        })
    }

    fn mode_target(&self, mode: ScanMode) -> ConfigResult<ModeTarget> {
        match mode {
            ScanMode::Asns => {
                let asns = target_list(mode, self.asns.as_ref())?
                    .iter()
                    .map(|entry| parse_asn(entry))
                    .collect::<ConfigResult<Vec<u32>>>()?;
                Ok(ModeTarget::Asns(asns))
            }
            ScanMode::Netblocks => Ok(ModeTarget::Netblocks(target_list(
                mode,
                self.netblocks.as_ref(),
            )?)),
            ScanMode::IpAddresses => Ok(ModeTarget::IpAddresses(target_list(
                mode,
                self.ipaddresses.as_ref(),
            )?)),
            ScanMode::Tickets => Ok(ModeTarget::Tickets),
        }
    }
}

/// Extract a non-empty list of target strings for `mode`.
///
/// JSON numbers are accepted and converted, so `"asns": [64496]` works.
fn target_list(mode: ScanMode, value: Option<&Value>) -> ConfigResult<Vec<String>> {
    let missing = || ConfigError::MissingModeConfig(mode.to_string());

    let items = value.and_then(Value::as_array).ok_or_else(missing)?;
    if items.is_empty() {
        return Err(missing());
    }

    items
        .iter()
        .map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(ConfigError::InvalidTarget {
                mode: mode.to_string(),
                target: other.to_string(),
            }),
        })
        .collect()
}

/// Parse `64496` or `AS64496`.
fn parse_asn(entry: &str) -> ConfigResult<u32> {
    let digits = entry
        .strip_prefix("AS")
        .or_else(|| entry.strip_prefix("as"))
        .unwrap_or(entry);

    digits.parse().map_err(|_| ConfigError::InvalidTarget {
        mode: ScanMode::Asns.to_string(),
        target: entry.to_string(),
    })
}

/// Validated scan settings.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Mode entries in configured order.
    pub targets: Vec<ModeTarget>,
    /// Feed name → feed.
    pub feeds: BTreeMap<String, FeedDefinition>,
    pub concurrency: usize,
    pub timeout: Duration,
    pub rate_limit: u32,
}

impl ScanSettings {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        RawConfig::load_from(path)?.validate()
    }

    /// Whether any configured entry needs a ticket store.
    pub fn uses_tickets(&self) -> bool {
        self.targets.iter().any(|t| t.mode() == ScanMode::Tickets)
    }

    /// Feeds the DNS scanner will query, in name order.
    pub fn active_feeds(&self) -> impl Iterator<Item = &FeedDefinition> {
        self.feeds.values().filter(|feed| feed.is_scannable())
    }
}
