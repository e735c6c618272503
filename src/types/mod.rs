//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod feed;
mod incident;
mod mode;
mod target;

pub use feed::{FeedDefinition, FeedMethod, IncidentClass, IncidentType, DEFAULT_CODE_KEY};
pub use incident::{Incident, REASON_KEY};
pub use mode::{ModeTarget, ScanMode};
pub use target::{expand_cidr, CidrBlock, TargetError};
