//! Integration tests for the full extraction workflow.
//!
//! These tests exercise the public API end to end:
//! 1. Configure activities on a request
//! 2. Resolve robots.txt permission through both cache tiers
//! 3. Run the engine and shape the result
//! 4. Fan a batch out under a concurrency cap

use std::sync::Arc;

use webextract::testing::{MockEngine, MockRobotsFetcher, MockSharedTier};
use webextract::{
    batch_extract, BatchConfig, Extractor, FieldSelector, LinkOptions, RobotsCache,
};

const ROBOTS: &str = "User-agent: *\nDisallow: /private/\n";

/// Helper to build an extractor wired to a shared tier and a canned fetcher.
fn extractor_with_robots(
    engine: Arc<MockEngine>,
    url: &str,
    tier: &MockSharedTier,
    robots_body: &str,
) -> Extractor {
    let mut extractor = Extractor::new(engine, url);
    extractor.set_robots_cache(
        RobotsCache::with_shared(Arc::new(tier.clone()))
            .with_fetcher(Arc::new(MockRobotsFetcher::returning(robots_body))),
    );
    extractor
}

#[tokio::test]
async fn test_full_request_workflow() {
    let engine = Arc::new(MockEngine::new());
    let tier = MockSharedTier::new();

    let mut extractor =
        extractor_with_robots(engine.clone(), "https://example.org/about", &tier, ROBOTS);
    extractor.extract_text(true);
    extractor.extract_links(LinkOptions::all());
    extractor.extract_article(Some(FieldSelector::named(["title", "author"])));
    extractor.set_timeout(10);
    extractor.set_user_agent("IntegrationBot/1.0");

    let result = extractor.run().await.unwrap();

    assert_eq!(result.url, "https://example.org/about");
    assert!(result.text.is_some());
    assert!(result.language.is_some());
    assert!(result.links.is_some());
    assert!(result.article.is_some());
    // Categories never enabled stay absent
    assert!(result.socials.is_none());
    assert!(result.product.is_none());

    // The robots resolution wrote through to the shared tier
    assert_eq!(tier.set_call_count(), 1);
    assert_eq!(engine.run_call_count(), 1);
}

#[tokio::test]
async fn test_disallowed_path_never_reaches_engine() {
    let engine = Arc::new(MockEngine::new());
    let tier = MockSharedTier::new();

    let mut extractor = extractor_with_robots(
        engine.clone(),
        "https://example.org/private/report",
        &tier,
        ROBOTS,
    );
    extractor.extract_text(false);

    assert!(extractor.run().await.is_err());
    assert_eq!(engine.run_call_count(), 0);
}

#[tokio::test]
async fn test_shared_tier_spans_requests() {
    let engine = Arc::new(MockEngine::new());
    let tier = MockSharedTier::new();

    // First request fetches and populates the shared tier
    {
        let mut first =
            extractor_with_robots(engine.clone(), "https://example.org/a", &tier, ROBOTS);
        first.extract_text(false);
        first.run().await.unwrap();
    }
    assert_eq!(tier.set_call_count(), 1);
    tier.reset_calls();

    // Second request has its own (empty) local tier but hits the shared one;
    // its fetcher would permit everything, proving it was never consulted
    let mut second = extractor_with_robots(
        engine.clone(),
        "https://example.org/private/x",
        &tier,
        "",
    );
    second.extract_text(false);

    assert!(second.run().await.is_err());
    assert_eq!(tier.get_call_count(), 1);
}

#[tokio::test]
async fn test_batch_workflow_with_mixed_outcomes() {
    let engine = Arc::new(
        MockEngine::new()
            .with_failure("https://example.org/page/2")
            .with_failure("https://example.org/page/5"),
    );

    let urls: Vec<String> = (0..8)
        .map(|i| format!("https://example.org/page/{i}"))
        .collect();

    let config = BatchConfig::new()
        .with_text(true)
        .with_links(LinkOptions::internal())
        .with_max_concurrent(3);

    let results = batch_extract(engine.clone(), &urls, &config).await;

    assert_eq!(results.len(), 6);
    assert_eq!(engine.run_call_count(), 8);
    assert!(engine.max_in_flight() <= 3);

    for result in &results {
        assert!(result.text.is_some());
        assert!(result.language.is_some());
        assert!(result.links.is_some());
        // Default metadata categories ride along
        assert!(result.article.is_some());
    }
}

#[tokio::test]
async fn test_manual_robots_then_grouped_export() {
    let engine = Arc::new(MockEngine::new());
    let mut extractor = Extractor::new(engine, "https://example.org/docs/intro");
    extractor.enable_robots_check();
    extractor
        .set_robots_txt("User-agent: *\nDisallow: /drafts/\n")
        .await
        .unwrap();
    extractor.extract_text(false);
    extractor.extract_socials(Some(FieldSelector::All));

    assert!(extractor.check_robots_allowed().await);

    let result = extractor.run().await.unwrap();
    let grouped = result.to_grouped();

    assert!(!grouped["text"].is_null());
    assert!(!grouped["socials"].is_null());
    assert!(grouped["product"].is_null());
}
