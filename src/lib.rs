//! Web Extraction Orchestration Library
//!
//! A request-building and orchestration layer over a pluggable extraction
//! engine. Callers describe what to extract from a page (text, links, social
//! profiles, video metadata, product data, article data), tune HTTP transport
//! options, and opt into robots.txt compliance backed by a two-tier
//! permission cache. A batch front end fans the same configuration out over
//! many URLs under a concurrency cap.
//!
//! # Design Philosophy
//!
//! - Configuration-driven: activities are opt-in, nothing is extracted by default
//! - Engine-agnostic: the [`Engine`] trait is the only rendering/parsing seam
//! - Polite by default where asked: robots.txt checks fail open, never closed
//! - Failure isolation: one bad page never sinks a batch
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use webextract::{Extractor, LinkOptions};
//! use webextract::testing::MockEngine;
//!
//! let engine = Arc::new(MockEngine::new());
//! let mut extractor = Extractor::new(engine, "https://example.com");
//! extractor.extract_text(true);
//! extractor.extract_links(LinkOptions::internal());
//! extractor.enable_robots_check();
//!
//! let result = extractor.run().await?;
//! println!("{:?}", result.text);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Activity configuration, HTTP options, result types
//! - [`engine`] - The extraction engine trait and its request/output types
//! - [`extractor`] - Single-page extraction request builder and runner
//! - [`batch`] - Bounded-concurrency multi-URL orchestration
//! - [`robots`] - robots.txt parsing and the two-tier permission cache
//! - [`testing`] - Mock implementations for testing

pub mod batch;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod robots;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractionError, Result};

pub use engine::{Engine, EngineError, EngineOutput, RequestSnapshot};

pub use types::{
    activity::{Activities, FieldSelector, LinkFilter, LinkOptions, TextActivity},
    http::{HttpOptions, UserAgent, DEFAULT_USER_AGENT},
    result::{ContentInfo, ExtractionResult, GroupedLinks, LinkInfo, LinkSummary},
};

pub use extractor::Extractor;

pub use batch::{batch_extract, BatchConfig};

// Re-export the robots permission layer
pub use robots::{
    domain_of, HttpRobotsFetcher, RedisTier, RobotsCache, RobotsFetcher, RobotsRules, SharedEntry,
    SharedRobotsTier, TierError, DEFAULT_SHARED_TTL_SECS,
};

// Re-export testing utilities
pub use testing::{MockEngine, MockRobotsFetcher, MockSharedTier};
