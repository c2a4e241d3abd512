//! Two-tier robots.txt permission cache.
//!
//! Resolution order is local tier, then shared tier (when configured and not
//! past its TTL), then a live fetch that populates both tiers. The local tier
//! has no TTL and lives exactly as long as the owning extraction request; the
//! shared tier outlives any single request.
//!
//! Permission checks are fail-open: when no robots rules can be obtained at
//! all (network failure, missing file, broken shared tier) the check permits,
//! because the absence of a policy must never be fatal to extraction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use url::Url;

use crate::robots::rules::RobotsRules;

/// Default shared-tier TTL: 30 minutes.
pub const DEFAULT_SHARED_TTL_SECS: u64 = 1800;

/// Boxed error for tier and fetcher implementations.
pub type TierError = Box<dyn std::error::Error + Send + Sync>;

/// A shared-tier entry: raw robots.txt content plus when it was fetched.
#[derive(Debug, Clone)]
pub struct SharedEntry {
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

impl SharedEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Whether this entry is older than `ttl_secs`.
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.fetched_at);
        age.num_seconds() < 0 || age.num_seconds() as u64 > ttl_secs
    }
}

/// Cross-request robots.txt store (e.g. Redis).
///
/// Writes are value-replacing; last write wins on concurrent refreshes, which
/// is acceptable because entries are keyed by domain and never merged.
#[async_trait]
pub trait SharedRobotsTier: Send + Sync {
    /// Get the entry for a domain, if present.
    async fn get(&self, domain: &str) -> Result<Option<SharedEntry>, TierError>;

    /// Store content for a domain with a write TTL.
    async fn set(&self, domain: &str, content: &str, ttl_secs: u64) -> Result<(), TierError>;

    /// Delete the entry for a domain.
    async fn delete(&self, domain: &str) -> Result<(), TierError>;
}

/// Live robots.txt retrieval, pluggable so tests substitute a mock.
#[async_trait]
pub trait RobotsFetcher: Send + Sync {
    /// Fetch the robots.txt body for a site. A missing file (404) is an empty
    /// body, not an error.
    async fn fetch(&self, robots_url: &str) -> Result<String, TierError>;
}

/// Fetcher backed by a reqwest client with a short fixed timeout.
pub struct HttpRobotsFetcher {
    client: reqwest::Client,
}

impl HttpRobotsFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpRobotsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RobotsFetcher for HttpRobotsFetcher {
    async fn fetch(&self, robots_url: &str) -> Result<String, TierError> {
        let response = self.client.get(robots_url).send().await?;
        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            // No robots.txt means no policy: permit everything
            Ok(String::new())
        }
    }
}

/// The two-tier permission cache owned by one extraction request.
///
/// Cloning shares both tiers; the owning request clears the local tier on
/// drop, and clones observe that.
#[derive(Clone)]
pub struct RobotsCache {
    local: Arc<RwLock<HashMap<String, Arc<RobotsRules>>>>,
    shared: Option<Arc<dyn SharedRobotsTier>>,
    ttl_secs: Arc<AtomicU64>,
    fetcher: Arc<dyn RobotsFetcher>,
}

impl RobotsCache {
    /// Local tier only, no shared tier.
    pub fn new_local() -> Self {
        Self {
            local: Arc::new(RwLock::new(HashMap::new())),
            shared: None,
            ttl_secs: Arc::new(AtomicU64::new(DEFAULT_SHARED_TTL_SECS)),
            fetcher: Arc::new(HttpRobotsFetcher::new()),
        }
    }

    /// Local tier plus a shared tier with the default TTL.
    pub fn with_shared(tier: Arc<dyn SharedRobotsTier>) -> Self {
        Self {
            shared: Some(tier),
            ..Self::new_local()
        }
    }

    /// Replace the live fetcher (tests).
    pub fn with_fetcher(mut self, fetcher: Arc<dyn RobotsFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Set the TTL applied to subsequent shared-tier writes and freshness
    /// checks. Does not rewrite already-cached entries.
    pub fn set_ttl(&self, ttl_secs: u64) {
        self.ttl_secs.store(ttl_secs, Ordering::Relaxed);
    }

    /// Current shared-tier TTL in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs.load(Ordering::Relaxed)
    }

    /// Number of domains in the local tier.
    pub fn local_entry_count(&self) -> usize {
        self.local.read().unwrap().len()
    }

    /// Empty the local tier. Invoked unconditionally when the owning request
    /// is dropped.
    pub fn clear_local(&self) {
        self.local.write().unwrap().clear();
    }

    /// Delete the shared entry for a domain, forcing the next resolution past
    /// the shared tier.
    pub async fn remove_shared(&self, domain: &str) -> Result<(), TierError> {
        if let Some(ref shared) = self.shared {
            shared.delete(domain).await?;
        }
        Ok(())
    }

    /// Seed the local tier for a page's domain with manually supplied
    /// content, bypassing any fetch. Written through to the shared tier when
    /// one is configured.
    pub async fn seed_manual(&self, page_url: &str, content: &str) -> Result<(), TierError> {
        let domain = domain_of(page_url).ok_or_else(|| -> TierError {
            format!("no host in URL: {page_url}").into()
        })?;

        let rules = Arc::new(RobotsRules::parse(content));
        self.local.write().unwrap().insert(domain.clone(), rules);

        if let Some(ref shared) = self.shared {
            shared.set(&domain, content, self.ttl_secs()).await?;
        }
        Ok(())
    }

    /// Check whether `page_url`'s path is permitted for `user_agent`.
    ///
    /// Fail-open: any resolution failure permits.
    pub async fn is_allowed(&self, page_url: &str, user_agent: &str) -> bool {
        let Ok(url) = Url::parse(page_url) else {
            warn!(url = %page_url, "unparseable URL in robots check, permitting");
            return true;
        };
        let rules = self.resolve(&url).await;
        rules.is_allowed(user_agent, url.path())
    }

    /// Resolve rules for a URL's domain: local -> shared (fresh) -> fetch.
    async fn resolve(&self, url: &Url) -> Arc<RobotsRules> {
        let Some(domain) = url.host_str().map(str::to_string) else {
            return Arc::new(RobotsRules::default());
        };

        if let Some(rules) = self.local.read().unwrap().get(&domain) {
            return Arc::clone(rules);
        }

        if let Some(content) = self.shared_lookup(&domain).await {
            let rules = Arc::new(RobotsRules::parse(&content));
            self.local
                .write()
                .unwrap()
                .insert(domain, Arc::clone(&rules));
            return rules;
        }

        self.fetch_and_populate(url, &domain).await
    }

    /// Consult the shared tier; a stale or errored entry is treated as absent.
    async fn shared_lookup(&self, domain: &str) -> Option<String> {
        let shared = self.shared.as_ref()?;
        match shared.get(domain).await {
            Ok(Some(entry)) => {
                if entry.is_expired(self.ttl_secs()) {
                    debug!(domain = %domain, "shared robots entry expired");
                    None
                } else {
                    Some(entry.content)
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(domain = %domain, error = %e, "shared robots tier read failed");
                None
            }
        }
    }

    /// Live-fetch robots.txt and populate both tiers. Failures fall back to
    /// the permit-all default without caching.
    async fn fetch_and_populate(&self, url: &Url, domain: &str) -> Arc<RobotsRules> {
        let robots_url = format!("{}://{}/robots.txt", url.scheme(), domain);

        let content = match self.fetcher.fetch(&robots_url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(url = %robots_url, error = %e, "robots.txt fetch failed, permitting");
                return Arc::new(RobotsRules::default());
            }
        };

        let rules = Arc::new(RobotsRules::parse(&content));
        self.local
            .write()
            .unwrap()
            .insert(domain.to_string(), Arc::clone(&rules));

        if let Some(ref shared) = self.shared {
            if let Err(e) = shared.set(domain, &content, self.ttl_secs()).await {
                warn!(domain = %domain, error = %e, "shared robots tier write failed");
            }
        }

        rules
    }
}

/// Extract the host from a URL string.
pub fn domain_of(page_url: &str) -> Option<String> {
    Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
