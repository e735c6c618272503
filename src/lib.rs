//! # rblscan - DNS Blackhole List Scanner
//!
//! rblscan checks ranges of IPv4 addresses against DNS Realtime Blackhole
//! List (RBL) zones and reports an abuse incident for every address a zone
//! lists.
//!
//! ## Features
//!
//! - **Flexible Targeting**: ASNs, CIDR netblocks, literal addresses and open tickets
//! - **Typed Feeds**: per-zone classification, code-to-reason mapping and ignored codes
//! - **Daily Buckets**: incident timestamps are truncated to UTC midnight
//! - **High Performance**: async lookups with bounded concurrency and rate limiting
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use rblscan::config::RawConfig;
//! use rblscan::scanner::{ScanEngine, ScanOutcome, SystemResolver};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = RawConfig::load_from("scan.json".as_ref())?.validate()?;
//!     let resolver = Arc::new(SystemResolver::new(Duration::from_secs(5)));
//!
//!     if let ScanOutcome::Success(report) = ScanEngine::new(settings, resolver).run().await {
//!         for incident in &report.incidents {
//!             println!("{} listed on {}", incident.ip, incident.source);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Feeds, modes, CIDR blocks and incidents
//! - [`scanner`] - Target enumeration, RBL lookups and the scan engine
//! - [`config`] - Configuration loading and validation
//! - [`storage`] - Ticket store access for the `tickets` mode
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ScanError, StorageError};
pub use scanner::{ScanEngine, ScanOutcome, ScanReport};
pub use types::{FeedDefinition, Incident, ModeTarget, ScanMode};
