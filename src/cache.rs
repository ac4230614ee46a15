// src/cache.rs
//! In-memory TTL cache for raw (pre-normalization) API payloads.
//!
//! Entries go stale lazily: nothing is purged, a lookup past the TTL just
//! misses. Growth is bounded only by the number of distinct request URLs in
//! one session, which is accepted for this single-session scope.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    enabled: bool,
    key_prefix: String,
}

impl ResponseCache {
    pub fn new(ttl: Duration, enabled: bool, key_prefix: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            enabled,
            key_prefix: key_prefix.into(),
        }
    }

    /// Cache key for a request URL: configured prefix + SHA-256 of the URL.
    pub fn signature(&self, url: &str) -> String {
        let digest = Sha256::digest(url.as_bytes());
        format!("{}{:x}", self.key_prefix, digest)
    }

    /// Payload for `signature` if present and fresh. A disabled cache always
    /// misses.
    pub fn get(&self, signature: &str) -> Option<Value> {
        self.get_at(signature, Instant::now())
    }

    fn get_at(&self, signature: &str, now: Instant) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.read().expect("cache lock poisoned");
        let entry = entries.get(signature)?;
        // Strict less-than: an entry exactly TTL old is already stale
        if now.duration_since(entry.stored_at) < self.ttl {
            metrics::counter!("playlist_cache_hits_total").increment(1);
            Some(entry.payload.clone())
        } else {
            None
        }
    }

    /// Store `payload` under `signature`, replacing any previous entry.
    /// No-op when the cache is disabled.
    pub fn put(&self, signature: &str, payload: Value) {
        if !self.enabled {
            return;
        }
        let entry = CacheEntry {
            payload,
            stored_at: Instant::now(),
        };
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(signature.to_string(), entry);
    }

    pub fn clear(&self) {
        self.entries.write().expect("cache lock poisoned").clear();
        tracing::debug!("response cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn put_at(&self, signature: &str, payload: Value, stored_at: Instant) {
        self.entries.write().expect("cache lock poisoned").insert(
            signature.to_string(),
            CacheEntry { payload, stored_at },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cache(ttl_ms: u64) -> ResponseCache {
        ResponseCache::new(Duration::from_millis(ttl_ms), true, "test_")
    }

    #[test]
    fn fresh_entry_hits() {
        let c = cache(5_000);
        let sig = c.signature("http://x/videos.php");
        c.put(&sig, json!({ "success": true, "videos": [] }));
        assert_eq!(c.get(&sig), Some(json!({ "success": true, "videos": [] })));
    }

    #[test]
    fn entry_exactly_at_ttl_age_is_stale() {
        let c = cache(5_000);
        let sig = c.signature("http://x/videos.php");
        let now = Instant::now();
        c.put_at(&sig, json!([1]), now - Duration::from_millis(5_000));
        assert_eq!(c.get_at(&sig, now), None);

        // One tick younger is still valid
        c.put_at(&sig, json!([1]), now - Duration::from_millis(4_999));
        assert_eq!(c.get_at(&sig, now), Some(json!([1])));
    }

    #[test]
    fn stale_entry_is_not_purged_until_overwritten() {
        let c = cache(10);
        let sig = c.signature("http://x/videos.php");
        let now = Instant::now();
        c.put_at(&sig, json!([1]), now - Duration::from_secs(60));
        assert_eq!(c.get_at(&sig, now), None);
        assert_eq!(c.len(), 1); // lazy invalidation keeps the slot

        c.put(&sig, json!([2]));
        assert_eq!(c.get(&sig), Some(json!([2])));
        assert_eq!(c.len(), 1); // superseded, not merged
    }

    #[test]
    fn disabled_cache_never_hits_and_put_is_noop() {
        let c = ResponseCache::new(Duration::from_secs(300), false, "test_");
        let sig = c.signature("http://x/videos.php");
        c.put(&sig, json!([1]));
        assert_eq!(c.get(&sig), None);
        assert!(c.is_empty());
    }

    #[test]
    fn clear_drops_all_entries() {
        let c = cache(5_000);
        c.put(&c.signature("http://a"), json!(1));
        c.put(&c.signature("http://b"), json!(2));
        assert_eq!(c.len(), 2);
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn signature_is_prefixed_and_distinct_per_url() {
        let c = cache(5_000);
        let a = c.signature("http://x/videos.php?category=a");
        let b = c.signature("http://x/videos.php?category=b");
        assert!(a.starts_with("test_"));
        assert_ne!(a, b);
        assert_eq!(a, c.signature("http://x/videos.php?category=a"));
    }
}
