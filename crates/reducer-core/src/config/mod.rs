//! Configuration tables.
//!
//! - `RuleSet` - naming tables, pitch buckets and per-tier reduction limits
//! - `TierRule` - spacing multiplier, lane cap and chord cap of one derived tier

mod rules;

pub use rules::*;
