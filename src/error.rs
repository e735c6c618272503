//! Error types for rblscan.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("ticket store error: {0}")]
    TicketStore(#[from] StorageError),
}

impl From<crate::types::TargetError> for ScanError {
    fn from(err: crate::types::TargetError) -> Self {
        match err {
            crate::types::TargetError::InvalidCidr(cidr) => Self::InvalidCidr(cidr),
        }
    }
}

/// Errors raised while loading or validating scan configuration.
///
/// All of these are fatal: a scan never starts against invalid configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("no scan modes configured")]
    MissingModes,

    #[error("mode '{0}' is not an option (expected one of: asns, netblocks, ipaddresses, tickets)")]
    UnknownMode(String),

    #[error("mode '{0}' requires a non-empty list of targets")]
    MissingModeConfig(String),

    #[error("invalid {mode} target '{target}'")]
    InvalidTarget { mode: String, target: String },

    #[error("no feeds configured")]
    MissingFeeds,

    #[error("feed '{name}' is invalid: {reason}")]
    InvalidFeed { name: String, reason: String },

    #[error("mode 'tickets' requires a ticket store")]
    MissingTicketStore,

    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },
}

/// Errors raised by ticket storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to load tickets: {0}")]
    LoadFailed(String),

    #[error("invalid ticket data: {0}")]
    InvalidFormat(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_message() {
        let err = ConfigError::UnknownMode("bogus".to_string());
        assert!(err.to_string().contains("not an option"));
    }

    #[test]
    fn test_config_error_wraps_into_scan_error() {
        let err: ScanError = ConfigError::MissingFeeds.into();
        assert!(matches!(err, ScanError::Config(ConfigError::MissingFeeds)));
    }
}
