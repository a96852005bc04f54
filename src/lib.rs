pub mod analyzers;
pub mod config;
pub mod fetch;
pub mod matcher;
pub mod output;
pub mod parser;
pub mod stats;
pub mod store;

pub use analyzers::analyzer::{compute_speed_tiers, compute_speed_tiers_with};
pub use analyzers::types::{SkipCounts, SpeedTier, SpeedTierReport, TierMembership};
pub use config::TierConfig;
pub use stats::{Multiplier, stat_value};
