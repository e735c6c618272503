//! Configuration management for rblscan.
//!
//! Loads the JSON scan configuration, validates it once and exposes the
//! strongly typed [`ScanSettings`] the engine runs from.

mod feeds;
mod settings;

pub use feeds::RawFeed;
pub use settings::{Paths, RawConfig, ScanSettings};
