//! The extraction request: builder-style configuration plus `run`.
//!
//! An [`Extractor`] is created empty, mutated only through explicit
//! configuration calls, and frozen into a [`RequestSnapshot`] the instant
//! `run` is invoked. Activity calls are pure mutations; nothing here performs
//! I/O until `run` (or an explicit robots check).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::engine::{Engine, EngineError, RequestSnapshot};
use crate::error::{ExtractionError, Result};
use crate::robots::{domain_of, RedisTier, RobotsCache};
use crate::types::activity::{Activities, FieldSelector, LinkFilter, LinkOptions, TextActivity};
use crate::types::http::HttpOptions;
use crate::types::result::ExtractionResult;

/// A single configurable extraction request.
///
/// # Example
///
/// ```rust,ignore
/// use webextract::{Extractor, FieldSelector, LinkOptions};
///
/// let mut extractor = Extractor::new(engine, "https://example.com/article");
/// extractor.extract_text(true);
/// extractor.extract_article(Some(FieldSelector::named(["title", "author"])));
/// extractor.extract_links(LinkOptions::internal());
/// let result = extractor.run().await?;
/// ```
pub struct Extractor {
    engine: Arc<dyn Engine>,
    url: String,
    html: Option<String>,
    activities: Activities,
    http: HttpOptions,
    robots: Option<RobotsCache>,
}

impl Extractor {
    /// Create a request targeting a URL.
    pub fn new(engine: Arc<dyn Engine>, url: impl Into<String>) -> Self {
        Self {
            engine,
            url: url.into(),
            html: None,
            activities: Activities::default(),
            http: HttpOptions::default(),
            robots: None,
        }
    }

    /// Create a request with a literal HTML override. The engine uses the
    /// HTML verbatim; the URL is still used for link resolution and domain
    /// classification.
    pub fn with_html(engine: Arc<dyn Engine>, url: impl Into<String>, html: impl Into<String>) -> Self {
        let mut extractor = Self::new(engine, url);
        extractor.html = Some(html.into());
        extractor
    }

    /// Create a request from a fallible engine loader.
    ///
    /// A loader failure means the extraction capability is unavailable; it is
    /// fatal at construction time and never retried here.
    pub fn from_loader<F>(loader: F, url: impl Into<String>) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<
            Arc<dyn Engine>,
            Box<dyn std::error::Error + Send + Sync>,
        >,
    {
        let engine = loader().map_err(ExtractionError::EngineUnavailable)?;
        Ok(Self::new(engine, url))
    }

    /// The target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    // --- activity configuration -------------------------------------------

    /// Enable text extraction, optionally with language detection.
    pub fn extract_text(&mut self, language_detection: bool) {
        self.activities.text = Some(TextActivity { language_detection });
    }

    /// Enable link extraction with the given flags (see [`LinkOptions`] for
    /// the precedence rule).
    pub fn extract_links(&mut self, opts: LinkOptions) {
        self.activities.links = Some(LinkFilter::resolve(opts));
    }

    /// Enable social metadata extraction. `None` collapses to all fields and
    /// emits the advisory diagnostic.
    pub fn extract_socials(&mut self, fields: Option<FieldSelector>) {
        self.activities.socials = Some(FieldSelector::resolve("socials", fields));
    }

    /// Enable video/book metadata extraction.
    pub fn extract_video(&mut self, fields: Option<FieldSelector>) {
        self.activities.video = Some(FieldSelector::resolve("video", fields));
    }

    /// Enable product metadata extraction.
    pub fn extract_product(&mut self, fields: Option<FieldSelector>) {
        self.activities.product = Some(FieldSelector::resolve("product", fields));
    }

    /// Enable article metadata extraction.
    pub fn extract_article(&mut self, fields: Option<FieldSelector>) {
        self.activities.article = Some(FieldSelector::resolve("article", fields));
    }

    // --- HTTP options ------------------------------------------------------

    /// Set the request timeout in seconds.
    pub fn set_timeout(&mut self, timeout_secs: u64) {
        self.http.set_timeout(timeout_secs);
    }

    /// Use a fixed user agent; clears the random flag.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.http.set_user_agent(user_agent);
    }

    /// Pick a random user agent per request.
    pub fn set_random_user_agent(&mut self, enabled: bool) {
        self.http.set_random_user_agent(enabled);
    }

    /// Add one header.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.http.add_header(name, value);
    }

    /// Replace all headers.
    pub fn set_headers(&mut self, headers: HashMap<String, String>) {
        self.http.set_headers(headers);
    }

    // --- robots policy -----------------------------------------------------

    /// Enable robots.txt checking with an instance-local cache only.
    ///
    /// The local tier is cleared unconditionally when this extractor is
    /// dropped, whether or not extraction succeeded.
    pub fn enable_robots_check(&mut self) {
        self.robots = Some(RobotsCache::new_local());
    }

    /// Enable robots.txt checking with the local tier plus a Redis-backed
    /// shared tier (default TTL 1800s).
    pub fn enable_robots_check_with_redis(&mut self, redis_url: &str) -> Result<()> {
        let tier = RedisTier::new(redis_url).map_err(ExtractionError::SharedCache)?;
        self.robots = Some(RobotsCache::with_shared(Arc::new(tier)));
        Ok(())
    }

    /// Install a pre-built robots cache (custom tiers or fetchers).
    pub fn set_robots_cache(&mut self, cache: RobotsCache) {
        self.robots = Some(cache);
    }

    /// Set the TTL for subsequent shared-tier writes.
    pub fn set_robots_ttl(&mut self, ttl_secs: u64) -> Result<()> {
        match self.robots {
            Some(ref cache) => {
                cache.set_ttl(ttl_secs);
                Ok(())
            }
            None => Err(ExtractionError::RobotsNotEnabled),
        }
    }

    /// Supply robots.txt content for the target's domain manually, bypassing
    /// any fetch.
    pub async fn set_robots_txt(&mut self, content: &str) -> Result<()> {
        let cache = self
            .robots
            .as_ref()
            .ok_or(ExtractionError::RobotsNotEnabled)?;

        if domain_of(&self.url).is_none() {
            return Err(ExtractionError::InvalidUrl {
                url: self.url.clone(),
            });
        }

        cache
            .seed_manual(&self.url, content)
            .await
            .map_err(ExtractionError::SharedCache)
    }

    /// Check whether the target URL is permitted by robots.txt.
    ///
    /// Permits when robots checking is not enabled, and fails open when no
    /// rules can be obtained.
    pub async fn check_robots_allowed(&self) -> bool {
        match self.robots {
            Some(ref cache) => {
                let user_agent = self.http.user_agent.resolve();
                cache.is_allowed(&self.url, &user_agent).await
            }
            None => true,
        }
    }

    /// Delete the shared-tier entry for the target's domain, forcing the next
    /// check to refetch.
    pub async fn remove_robots_from_shared(&self) -> Result<()> {
        let cache = self
            .robots
            .as_ref()
            .ok_or(ExtractionError::RobotsNotEnabled)?;

        let domain = domain_of(&self.url).ok_or_else(|| ExtractionError::InvalidUrl {
            url: self.url.clone(),
        })?;

        cache
            .remove_shared(&domain)
            .await
            .map_err(ExtractionError::SharedCache)
    }

    /// Empty the instance-local robots tier.
    pub fn clear_robots_cache(&self) {
        if let Some(ref cache) = self.robots {
            cache.clear_local();
        }
    }

    /// Handle to the robots cache, if enabled. Clones share tiers, so a held
    /// handle observes the local tier being cleared on drop.
    pub fn robots_cache(&self) -> Option<RobotsCache> {
        self.robots.clone()
    }

    // --- execution ---------------------------------------------------------

    /// Freeze the current configuration into an engine snapshot.
    fn snapshot(&self) -> RequestSnapshot {
        RequestSnapshot {
            url: self.url.clone(),
            html: self.html.clone(),
            activities: self.activities.clone(),
            http: self.http.clone(),
        }
    }

    async fn execute(&self, offload: bool) -> Result<ExtractionResult> {
        if !self.activities.any_enabled() {
            return Err(ExtractionError::NoActivities);
        }

        if self.robots.is_some() && !self.check_robots_allowed().await {
            return Err(ExtractionError::RobotsDisallowed {
                url: self.url.clone(),
            });
        }

        let snapshot = self.snapshot();
        debug!(url = %self.url, engine = self.engine.name(), offload, "running extraction");

        let output = if offload {
            let engine = Arc::clone(&self.engine);
            tokio::task::spawn_blocking(move || engine.run(&snapshot))
                .await
                .map_err(|e| EngineError::Other(format!("engine task failed: {e}")))??
        } else {
            self.engine.run(&snapshot)?
        };

        Ok(ExtractionResult::from_engine(
            self.url.clone(),
            &self.activities,
            output,
        ))
    }

    /// Execute the extraction with the configured activities.
    ///
    /// Validates, freezes the configuration, resolves the robots policy, and
    /// invokes the engine synchronously on the current task. Identical inputs
    /// produce identical engine calls, so retrying after a failure is safe.
    pub async fn run(&self) -> Result<ExtractionResult> {
        self.execute(false).await
    }

    /// Identical to [`run`](Self::run), but the engine invocation is moved to
    /// the blocking pool so sibling tasks keep making progress.
    pub async fn run_offloaded(&self) -> Result<ExtractionResult> {
        self.execute(true).await
    }
}

impl Drop for Extractor {
    fn drop(&mut self) {
        // Guaranteed local-tier cleanup, success or failure
        if let Some(ref cache) = self.robots {
            cache.clear_local();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockEngine, MockRobotsFetcher};

    const HELLO: &str = "<html><body><h1>Hello World</h1></body></html>";

    #[tokio::test]
    async fn test_run_without_activities_never_calls_engine() {
        let engine = Arc::new(MockEngine::new());
        let extractor = Extractor::new(engine.clone(), "https://example.com");

        let err = extractor.run().await.unwrap_err();
        assert!(matches!(err, ExtractionError::NoActivities));
        assert_eq!(engine.run_call_count(), 0);
    }

    #[tokio::test]
    async fn test_text_extraction_from_html_override() {
        let engine = Arc::new(MockEngine::new());
        let mut extractor = Extractor::with_html(engine, "https://example.com", HELLO);
        extractor.extract_text(false);

        let result = extractor.run().await.unwrap();

        let text = result.text.expect("text extracted");
        assert!(text.contains("Hello World"));
        assert!(result.links.is_none());
        assert!(result.socials.is_none());
        assert!(result.videos.is_none());
        assert!(result.product.is_none());
        assert!(result.article.is_none());
        assert!(result.language.is_none());
    }

    #[tokio::test]
    async fn test_run_offloaded_matches_run() {
        let engine = Arc::new(MockEngine::new());
        let mut extractor = Extractor::with_html(engine, "https://example.com", HELLO);
        extractor.extract_text(false);

        let result = extractor.run_offloaded().await.unwrap();
        assert!(result.text.unwrap().contains("Hello World"));
    }

    #[tokio::test]
    async fn test_engine_failure_propagates() {
        let engine = Arc::new(MockEngine::new().with_failure("https://bad.example.com"));
        let mut extractor = Extractor::new(engine, "https://bad.example.com");
        extractor.extract_text(false);

        let err = extractor.run().await.unwrap_err();
        assert!(matches!(err, ExtractionError::Engine(_)));
    }

    #[tokio::test]
    async fn test_robots_disallowed_blocks_engine() {
        let engine = Arc::new(MockEngine::new());
        let mut extractor = Extractor::new(engine.clone(), "https://example.com/private/page");
        extractor.extract_text(false);

        extractor.set_robots_cache(
            RobotsCache::new_local().with_fetcher(Arc::new(MockRobotsFetcher::returning(
                "User-agent: *\nDisallow: /private/\n",
            ))),
        );

        let err = extractor.run().await.unwrap_err();
        assert!(matches!(err, ExtractionError::RobotsDisallowed { .. }));
        assert_eq!(engine.run_call_count(), 0);
    }

    #[tokio::test]
    async fn test_local_tier_cleared_on_drop_even_after_failure() {
        let engine = Arc::new(MockEngine::new().with_failure("https://example.com/x"));
        let cache_handle;
        {
            let mut extractor = Extractor::new(engine, "https://example.com/x");
            extractor.extract_text(false);
            extractor.set_robots_cache(
                RobotsCache::new_local()
                    .with_fetcher(Arc::new(MockRobotsFetcher::returning(""))),
            );
            cache_handle = extractor.robots_cache().unwrap();

            // Robots resolution populates the local tier, then the engine fails
            assert!(extractor.run().await.is_err());
            assert_eq!(cache_handle.local_entry_count(), 1);
        }

        // Scope exit cleared the tier unconditionally
        assert_eq!(cache_handle.local_entry_count(), 0);
    }

    #[tokio::test]
    async fn test_robots_ops_require_enable() {
        let engine = Arc::new(MockEngine::new());
        let mut extractor = Extractor::new(engine, "https://example.com");

        assert!(matches!(
            extractor.set_robots_ttl(60),
            Err(ExtractionError::RobotsNotEnabled)
        ));
        assert!(matches!(
            extractor.set_robots_txt("User-agent: *\n").await,
            Err(ExtractionError::RobotsNotEnabled)
        ));
        assert!(matches!(
            extractor.remove_robots_from_shared().await,
            Err(ExtractionError::RobotsNotEnabled)
        ));

        // Not enabled means permitted
        assert!(extractor.check_robots_allowed().await);
    }

    #[tokio::test]
    async fn test_manual_robots_content_is_used() {
        let engine = Arc::new(MockEngine::new());
        let mut extractor = Extractor::new(engine, "https://example.com/private/page");
        extractor.enable_robots_check();
        extractor
            .set_robots_txt("User-agent: *\nDisallow: /private/\n")
            .await
            .unwrap();

        assert!(!extractor.check_robots_allowed().await);
    }

    #[tokio::test]
    async fn test_reconfiguring_selector_replaces_not_merges() {
        let engine = Arc::new(MockEngine::new());
        let mut extractor = Extractor::new(engine, "https://example.com");

        extractor.extract_article(Some(FieldSelector::named(["title"])));
        extractor.extract_article(Some(FieldSelector::named(["author"])));

        let snapshot = extractor.snapshot();
        assert_eq!(
            snapshot.activities.article,
            Some(FieldSelector::named(["author"]))
        );
    }

    #[test]
    fn test_from_loader_failure_is_engine_unavailable() {
        let err = Extractor::from_loader(|| Err("native module missing".into()), "https://example.com")
            .err()
            .unwrap();
        assert!(matches!(err, ExtractionError::EngineUnavailable(_)));
    }
}
