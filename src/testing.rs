//! Mock implementations for testing.
//!
//! Deterministic stand-ins for the engine, the shared robots tier, and the
//! live robots fetcher, with call counters for verification. Public so
//! downstream crates can test against the same mocks.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::engine::{Engine, EngineError, EngineOutput, RequestSnapshot};
use crate::robots::{RobotsFetcher, SharedEntry, SharedRobotsTier, TierError};
use crate::types::result::GroupedLinks;

/// Crude tag stripper for synthesizing mock text output from an HTML
/// override. Not a parser; test fixtures only.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Configurable mock engine.
///
/// Returns canned output per URL when configured, otherwise synthesizes a
/// full categorized output (text from the HTML override when present, one
/// entry per metadata map) so result-shaping can be exercised. Tracks call
/// counts and the high-water mark of concurrent `run` calls.
#[derive(Default)]
pub struct MockEngine {
    canned: Mutex<HashMap<String, EngineOutput>>,
    fail_urls: HashSet<String>,
    panic_urls: HashSet<String>,
    latency: Option<Duration>,
    run_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this output for the given URL.
    pub fn with_output(self, url: impl Into<String>, output: EngineOutput) -> Self {
        self.canned.lock().unwrap().insert(url.into(), output);
        self
    }

    /// Fail runs for the given URL.
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.fail_urls.insert(url.into());
        self
    }

    /// Panic on runs for the given URL (task-isolation tests).
    pub fn with_panic(mut self, url: impl Into<String>) -> Self {
        self.panic_urls.insert(url.into());
        self
    }

    /// Sleep this long inside each run (concurrency tests).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Total number of `run` invocations.
    pub fn run_call_count(&self) -> usize {
        self.run_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `run` calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn synthesize(&self, request: &RequestSnapshot) -> EngineOutput {
        let text = match request.html {
            Some(ref html) => strip_tags(html),
            None => format!("Content from {}", request.url),
        };

        let mut map = HashMap::new();
        map.insert("title".to_string(), "Mock Title".to_string());

        EngineOutput::new()
            .with_text(text)
            .with_language("eng", 0.9)
            .with_links(GroupedLinks::default())
            .with_socials(map.clone())
            .with_videos(map.clone())
            .with_product(map.clone())
            .with_article(map)
    }
}

impl Engine for MockEngine {
    fn run(&self, request: &RequestSnapshot) -> Result<EngineOutput, EngineError> {
        self.run_calls.fetch_add(1, Ordering::SeqCst);

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_urls.contains(&request.url) {
            panic!("mock engine panic for {}", request.url);
        }
        if self.fail_urls.contains(&request.url) {
            return Err(EngineError::Http(format!(
                "simulated fetch failure for {}",
                request.url
            )));
        }

        let canned = self.canned.lock().unwrap().get(&request.url).cloned();
        Ok(canned.unwrap_or_else(|| self.synthesize(request)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// In-memory shared robots tier with call tracking.
///
/// `insert_aged` backdates the fetch timestamp, so TTL expiry is testable
/// without sleeping.
#[derive(Default)]
pub struct MockSharedTier {
    entries: Arc<Mutex<HashMap<String, SharedEntry>>>,
    get_calls: Arc<AtomicUsize>,
    set_calls: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
}

impl MockSharedTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry fetched `age_secs` ago.
    pub fn insert_aged(&self, domain: impl Into<String>, content: impl Into<String>, age_secs: i64) {
        let entry = SharedEntry {
            content: content.into(),
            fetched_at: Utc::now() - chrono::Duration::seconds(age_secs),
        };
        self.entries.lock().unwrap().insert(domain.into(), entry);
    }

    /// Make subsequent reads fail (broken-tier tests).
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn get_call_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_call_count(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.get_calls.store(0, Ordering::SeqCst);
        self.set_calls.store(0, Ordering::SeqCst);
    }
}

impl Clone for MockSharedTier {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            get_calls: Arc::clone(&self.get_calls),
            set_calls: Arc::clone(&self.set_calls),
            fail_reads: Arc::clone(&self.fail_reads),
        }
    }
}

#[async_trait]
impl SharedRobotsTier for MockSharedTier {
    async fn get(&self, domain: &str) -> Result<Option<SharedEntry>, TierError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err("simulated shared tier outage".into());
        }
        Ok(self.entries.lock().unwrap().get(domain).cloned())
    }

    async fn set(&self, domain: &str, content: &str, _ttl_secs: u64) -> Result<(), TierError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(domain.to_string(), SharedEntry::new(content));
        Ok(())
    }

    async fn delete(&self, domain: &str) -> Result<(), TierError> {
        self.entries.lock().unwrap().remove(domain);
        Ok(())
    }
}

/// Mock live robots.txt fetcher with canned content or forced failure.
pub struct MockRobotsFetcher {
    content: Option<String>,
    fetches: AtomicUsize,
}

impl MockRobotsFetcher {
    /// Always return this body.
    pub fn returning(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Always fail (network-down tests).
    pub fn failing() -> Self {
        Self {
            content: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of fetch attempts.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RobotsFetcher for MockRobotsFetcher {
    async fn fetch(&self, _robots_url: &str) -> Result<String, TierError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.content {
            Some(ref content) => Ok(content.clone()),
            None => Err("simulated network failure".into()),
        }
    }
}
