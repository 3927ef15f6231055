//! Short-TTL response cache at the transport boundary.
//!
//! Sliding a time cursor across the dashboard re-issues the identical
//! batched query many times per hour; caching the raw body keeps that off
//! the provider. Entries expire lazily on read.

use bytes::Bytes;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Bytes)>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        {
            let entries = self.entries.read().await;
            if let Some((inserted, body)) = entries.get(key) {
                if inserted.elapsed() <= self.ttl {
                    return Some(body.clone());
                }
            } else {
                return None;
            }
        }

        // Expired: drop the stale entry.
        self.entries.write().await.remove(key);
        None
    }

    pub async fn put(&self, key: String, body: Bytes) {
        self.entries.write().await.insert(key, (Instant::now(), body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_and_expiry() {
        let cache = ResponseCache::new(Duration::from_millis(50));
        cache.put("q".to_string(), Bytes::from("body")).await;

        assert_eq!(cache.get("q").await, Some(Bytes::from("body")));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("q").await, None);
    }

    #[tokio::test]
    async fn test_miss() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        assert!(cache.get("absent").await.is_none());
    }
}
