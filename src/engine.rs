//! Engine trait for the pluggable extraction capability.
//!
//! The engine is the external collaborator that performs the actual
//! fetch/parse/extract work. It is treated as a pure function of a frozen
//! request snapshot: the core hands it an owned [`RequestSnapshot`] and gets
//! back a categorized [`EngineOutput`] or an [`EngineError`]. No state is
//! shared with it beyond the robots permission cache, which the core resolves
//! before the engine is ever invoked.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::activity::Activities;
use crate::types::http::HttpOptions;
use crate::types::result::GroupedLinks;

/// Frozen configuration handed to the engine by `run()`.
///
/// Built from the owning extractor the instant `run` is invoked; later
/// mutations of the extractor never reach an in-flight engine call.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    /// Target URL, used for fetching, link resolution, and domain classification
    pub url: String,

    /// Literal HTML override; when present the engine must use it verbatim
    /// instead of fetching the URL
    pub html: Option<String>,

    /// Enabled activities and their resolved field selectors
    pub activities: Activities,

    /// HTTP fetch options (timeout, user agent, headers)
    pub http: HttpOptions,
}

/// Raw categorized output produced by an engine run.
///
/// Categories the caller did not enable may still be populated by a sloppy
/// engine; result shaping discards them (see `ExtractionResult::from_engine`).
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub text: Option<String>,
    pub language: Option<String>,
    pub language_confidence: Option<f64>,
    pub links: Option<GroupedLinks>,
    pub socials: Option<HashMap<String, String>>,
    pub videos: Option<HashMap<String, String>>,
    pub product: Option<HashMap<String, String>>,
    pub article: Option<HashMap<String, String>>,
}

impl EngineOutput {
    /// Create an empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extracted text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set detected language and confidence.
    pub fn with_language(mut self, code: impl Into<String>, confidence: f64) -> Self {
        self.language = Some(code.into());
        self.language_confidence = Some(confidence);
        self
    }

    /// Set grouped links.
    pub fn with_links(mut self, links: GroupedLinks) -> Self {
        self.links = Some(links);
        self
    }

    /// Set social metadata fields.
    pub fn with_socials(mut self, socials: HashMap<String, String>) -> Self {
        self.socials = Some(socials);
        self
    }

    /// Set video/book metadata fields.
    pub fn with_videos(mut self, videos: HashMap<String, String>) -> Self {
        self.videos = Some(videos);
        self
    }

    /// Set product metadata fields.
    pub fn with_product(mut self, product: HashMap<String, String>) -> Self {
        self.product = Some(product);
        self
    }

    /// Set article metadata fields.
    pub fn with_article(mut self, article: HashMap<String, String>) -> Self {
        self.article = Some(article);
        self
    }
}

/// Errors from the engine's fetch/parse/extract steps.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Content could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Fetch timed out
    #[error("timeout: {0}")]
    Timeout(String),

    /// Any other engine failure
    #[error("{0}")]
    Other(String),
}

/// The extraction capability behind a narrow synchronous interface.
///
/// Implementations block for the duration of network I/O and parsing; callers
/// that must not block their scheduler use `Extractor::run_offloaded` or the
/// batch orchestrator, both of which move this call onto the blocking pool.
pub trait Engine: Send + Sync {
    /// Execute one extraction against a frozen request snapshot.
    fn run(&self, request: &RequestSnapshot) -> Result<EngineOutput, EngineError>;

    /// Get the engine name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
