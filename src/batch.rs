//! Bounded-concurrency batch extraction.
//!
//! Fans a list of targets out to independent extraction requests under a
//! semaphore cap. Tasks share parameters, not mutable state: each builds its
//! own extractor from the batch configuration. A failure (or panic) in one
//! task never cancels siblings; failed targets are logged and dropped, so the
//! result collection is compacted to successes only, preserving input order
//! among the retained subset.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::engine::Engine;
use crate::extractor::Extractor;
use crate::types::activity::{FieldSelector, LinkOptions};
use crate::types::result::ExtractionResult;

/// Uniform activity configuration applied to every target in a batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Extract text content
    pub extract_text: bool,

    /// Detect the language of extracted text
    pub language_detection: bool,

    /// Link extraction flags; links are enabled only when at least one flag
    /// is set, and the usual precedence rule applies
    pub links: LinkOptions,

    /// Extract all social metadata fields
    pub extract_socials: bool,

    /// Extract all video/book metadata fields
    pub extract_video: bool,

    /// Extract all product metadata fields
    pub extract_product: bool,

    /// Extract all article metadata fields
    pub extract_article: bool,

    /// Maximum number of in-flight extraction tasks
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extract_text: false,
            language_detection: false,
            links: LinkOptions::default(),
            extract_socials: true,
            extract_video: true,
            extract_product: true,
            extract_article: true,
            max_concurrent: 10,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable text extraction.
    pub fn with_text(mut self, language_detection: bool) -> Self {
        self.extract_text = true;
        self.language_detection = language_detection;
        self
    }

    /// Enable link extraction with the given flags.
    pub fn with_links(mut self, links: LinkOptions) -> Self {
        self.links = links;
        self
    }

    /// Disable all metadata categories; enable back selectively via fields.
    pub fn without_metadata(mut self) -> Self {
        self.extract_socials = false;
        self.extract_video = false;
        self.extract_product = false;
        self.extract_article = false;
        self
    }

    /// Set the concurrency cap.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Build one extractor configured per this batch.
    fn build_extractor(&self, engine: Arc<dyn Engine>, url: &str) -> Extractor {
        let mut extractor = Extractor::new(engine, url);

        if self.extract_text {
            extractor.extract_text(self.language_detection);
        }
        if self.links.any() {
            extractor.extract_links(self.links);
        }
        // Batch flags are an informed choice: pass the all-sentinel explicitly
        // so per-task runs stay free of the omission advisory.
        if self.extract_socials {
            extractor.extract_socials(Some(FieldSelector::All));
        }
        if self.extract_video {
            extractor.extract_video(Some(FieldSelector::All));
        }
        if self.extract_product {
            extractor.extract_product(Some(FieldSelector::All));
        }
        if self.extract_article {
            extractor.extract_article(Some(FieldSelector::All));
        }

        extractor
    }
}

/// Extract from many URLs concurrently, at most `config.max_concurrent` in
/// flight at any instant.
///
/// Returns the successful results only. Callers must not assume
/// index-to-input correspondence: failed targets are dropped, not replaced by
/// placeholders.
pub async fn batch_extract(
    engine: Arc<dyn Engine>,
    urls: &[String],
    config: &BatchConfig,
) -> Vec<ExtractionResult> {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

    let handles: Vec<_> = urls
        .iter()
        .map(|url| {
            let url = url.clone();
            let engine = Arc::clone(&engine);
            let config = config.clone();
            let semaphore = Arc::clone(&semaphore);

            tokio::spawn(async move {
                // Closed only if the semaphore is dropped, which it is not
                let _permit = semaphore.acquire_owned().await.ok()?;

                let extractor = config.build_extractor(engine, &url);
                match extractor.run_offloaded().await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!(url = %url, error = %e, "batch extraction task failed");
                        None
                    }
                }
            })
        })
        .collect();

    let mut results = Vec::with_capacity(urls.len());
    for outcome in join_all(handles).await {
        match outcome {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {}
            Err(e) => {
                // A panicked task is isolated to its target
                warn!(error = %e, "batch extraction task aborted");
            }
        }
    }

    results
}
