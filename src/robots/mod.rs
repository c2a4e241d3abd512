//! robots.txt permission rules and the two-tier cache.

pub mod cache;
pub mod redis_tier;
pub mod rules;

pub use cache::{
    domain_of, HttpRobotsFetcher, RobotsCache, RobotsFetcher, SharedEntry, SharedRobotsTier,
    TierError, DEFAULT_SHARED_TTL_SECS,
};
pub use redis_tier::RedisTier;
pub use rules::RobotsRules;
