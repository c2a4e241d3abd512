//! Redis-backed shared robots.txt tier.
//!
//! Entries are stored as small JSON blobs under `robots:{domain}` with a
//! server-side expiry matching the write TTL. The fetch timestamp rides along
//! so the cache's own TTL check stays authoritative even if the caller lowers
//! the TTL after a write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::robots::cache::{SharedEntry, SharedRobotsTier, TierError};

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    content: String,
    fetched_at: DateTime<Utc>,
}

/// Shared tier bound to a Redis instance by connection URL.
pub struct RedisTier {
    client: redis::Client,
}

impl RedisTier {
    /// Bind to a Redis endpoint (e.g. `redis://localhost:6379`).
    ///
    /// Fails only on an unparseable URL; connections are established lazily
    /// per operation.
    pub fn new(redis_url: &str) -> Result<Self, TierError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn key(domain: &str) -> String {
        format!("robots:{domain}")
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, TierError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl SharedRobotsTier for RedisTier {
    async fn get(&self, domain: &str) -> Result<Option<SharedEntry>, TierError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(Self::key(domain)).await?;

        match raw {
            Some(raw) => {
                let stored: StoredEntry = serde_json::from_str(&raw)?;
                Ok(Some(SharedEntry {
                    content: stored.content,
                    fetched_at: stored.fetched_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, domain: &str, content: &str, ttl_secs: u64) -> Result<(), TierError> {
        let stored = StoredEntry {
            content: content.to_string(),
            fetched_at: Utc::now(),
        };
        let raw = serde_json::to_string(&stored)?;

        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(Self::key(domain), raw, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, domain: &str) -> Result<(), TierError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(Self::key(domain)).await?;
        Ok(())
    }
}
