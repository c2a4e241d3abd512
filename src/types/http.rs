//! HTTP fetch options carried into the engine snapshot.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// User agent sent when the caller sets neither a fixed string nor the
/// randomize flag.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const USER_AGENT_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

/// User agent policy: a fixed string, or a fresh random pick per request.
/// The two are mutually exclusive; last-set wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAgent {
    Fixed(String),
    Random,
}

impl Default for UserAgent {
    fn default() -> Self {
        UserAgent::Fixed(DEFAULT_USER_AGENT.to_string())
    }
}

impl UserAgent {
    /// Resolve to a concrete user agent string for one request.
    pub fn resolve(&self) -> String {
        match self {
            UserAgent::Fixed(ua) => ua.clone(),
            UserAgent::Random => USER_AGENT_POOL
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(DEFAULT_USER_AGENT)
                .to_string(),
        }
    }
}

/// HTTP options for a request: timeout, user agent, and a header map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOptions {
    /// Request timeout in whole seconds
    pub timeout_secs: u64,

    /// User agent policy
    pub user_agent: UserAgent,

    /// Custom headers, name -> value
    pub headers: HashMap<String, String>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: UserAgent::default(),
            headers: HashMap::new(),
        }
    }
}

impl HttpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout in seconds.
    pub fn set_timeout(&mut self, timeout_secs: u64) {
        self.timeout_secs = timeout_secs;
    }

    /// Use a fixed user agent; clears the randomize flag.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = UserAgent::Fixed(user_agent.into());
    }

    /// Enable or disable random per-request user agents.
    pub fn set_random_user_agent(&mut self, enabled: bool) {
        self.user_agent = if enabled {
            UserAgent::Random
        } else {
            UserAgent::default()
        };
    }

    /// Add one header, overwriting any prior value for the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Replace the whole header map.
    pub fn set_headers(&mut self, headers: HashMap<String, String>) {
        self.headers = headers;
    }
}
