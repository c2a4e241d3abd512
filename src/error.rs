//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors surfaced by extraction requests and configuration calls.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// `run()` was invoked with no activity enabled; the engine is never called
    #[error("no activities configured; enable at least one extract_* activity before run()")]
    NoActivities,

    /// The extraction engine could not be loaded or initialized
    #[error("extraction engine unavailable: {0}")]
    EngineUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The engine failed during fetch/parse/extract
    #[error("engine execution failed: {0}")]
    Engine(#[from] EngineError),

    /// robots.txt disallows the target URL
    #[error("robots.txt disallows: {url}")]
    RobotsDisallowed { url: String },

    /// A robots cache operation was attempted before enabling robots checking
    #[error("robots checking not enabled")]
    RobotsNotEnabled,

    /// Shared robots cache tier could not be bound or operated on
    #[error("shared robots cache error: {0}")]
    SharedCache(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Target URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
