//! Feed schema validation.
//!
//! Feeds are read loosely from the configuration file and checked one by
//! one, so an error names the feed it came from.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{FeedDefinition, FeedMethod, IncidentClass, IncidentType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A feed as written in the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFeed {
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub codes: Option<BTreeMap<String, String>>,
    #[serde(default, alias = "ignoreCodes")]
    pub ignore_codes: BTreeSet<String>,
    #[serde(default)]
    pub information: BTreeMap<String, String>,
}

impl RawFeed {
    /// Parse one entry of the `feeds` map.
    pub fn from_value(name: &str, value: serde_json::Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| invalid(name, e.to_string()))
    }

    /// Validate this feed into a [`FeedDefinition`].
    pub fn validate(self, name: &str) -> ConfigResult<FeedDefinition> {
        if name.trim().is_empty() {
            return Err(invalid(name, "name cannot be empty"));
        }

        let zone = self
            .zone
            .map(|z| z.trim().trim_end_matches('.').to_string())
            .filter(|z| !z.is_empty())
            .ok_or_else(|| invalid(name, "'zone' must be a non-empty string"))?;

        let class: IncidentClass = required(name, "class", self.class)?
            .parse()
            .map_err(|e: String| invalid(name, e))?;

        let kind: IncidentType = required(name, "type", self.kind)?
            .parse()
            .map_err(|e: String| invalid(name, e))?;

        let enabled = self
            .enabled
            .ok_or_else(|| invalid(name, "'enabled' must be a boolean"))?;

        let method: FeedMethod = required(name, "method", self.method)?
            .parse()
            .map_err(|e: String| invalid(name, e))?;

        let codes = self
            .codes
            .filter(|codes| !codes.is_empty())
            .ok_or_else(|| invalid(name, "'codes' must be a non-empty map"))?;

        Ok(FeedDefinition {
            name: name.to_string(),
            zone,
            class,
            kind,
            enabled,
            method,
            codes,
            ignore_codes: self.ignore_codes,
            information: self.information,
        })
    }
}

fn required(name: &str, field: &str, value: Option<String>) -> ConfigResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| invalid(name, format!("'{}' is required", field)))
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidFeed {
        name: name.to_string(),
        reason: reason.into(),
    }
}
