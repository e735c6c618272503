//! Scanner module - coordinates target expansion and RBL lookups.
//!
//! Data flows one way: [`TargetEnumerator`] (using [`AsnResolver`] and CIDR
//! expansion) produces addresses, [`RblLookup`] checks them per feed, and
//! [`IncidentBuilder`] turns hits into incidents collected by [`ScanEngine`].

pub mod asn;
pub mod engine;
pub mod incident;
pub mod rate_limiter;
pub mod rbl;
pub mod resolver;
pub mod targets;

pub use asn::{asn_query_name, AsnResolver};
pub use engine::{scan_from_raw, ScanEngine, ScanOutcome, ScanReport};
pub use incident::{day_bucket, IncidentBuilder, FALLBACK_REASON};
pub use rate_limiter::RateLimiter;
pub use rbl::{parse_address, query_name, RblLookup, Verdict};
pub use resolver::{DnsResolver, StaticResolver, SystemResolver};
pub use targets::{TargetEnumerator, Targets};
