// Short-TTL in-memory memoization of API responses
//
// Keyed by request signature (typically the search query string). Values
// are stored as JSON so the cache doesn't need to know the shapes it
// holds. Read-check-then-write is fine here: the Mutex serializes access.
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Five minutes, matching how fast search results go stale in practice
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    data: String,
    expires_at: Instant,
}

/// In-memory request cache with per-entry TTL
pub struct RequestCache {
    entries: Mutex<HashMap<String, Entry>>,
    default_ttl: Duration,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Fetch a cached value; expired entries are dropped on the way out
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) => Instant::now() > entry.expires_at,
        };

        if expired {
            entries.remove(key);
            debug!("Cache entry expired: {}", key);
            return None;
        }

        let entry = entries.get(key)?;
        match serde_json::from_str(&entry.data) {
            Ok(value) => Some(value),
            Err(e) => {
                // A stored value we can't read back is as good as a miss
                debug!("Cache entry for {} unreadable: {}", key, e);
                entries.remove(key);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> crate::Result<()> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> crate::Result<()> {
        let data = serde_json::to_string(value)?;
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                data,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    /// Drop entries whose key contains `pattern`; drop everything when
    /// no pattern is given
    pub fn invalidate(&self, pattern: Option<&str>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match pattern {
            None => entries.clear(),
            Some(p) => entries.retain(|key, _| !key.contains(p)),
        }
    }

    pub fn clear(&self) {
        self.invalidate(None);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_values() {
        let cache = RequestCache::new();
        cache.set("key", &vec![1u32, 2, 3]).unwrap();
        assert_eq!(cache.get::<Vec<u32>>("key"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn miss_on_unknown_key() {
        let cache = RequestCache::new();
        assert_eq!(cache.get::<String>("nope"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = RequestCache::new();
        cache
            .set_with_ttl("short", &"value".to_string(), Duration::from_millis(0))
            .unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get::<String>("short"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_by_substring() {
        let cache = RequestCache::new();
        cache.set("search:bounty", &1u32).unwrap();
        cache.set("search:label", &2u32).unwrap();
        cache.set("user:octocat", &3u32).unwrap();

        cache.invalidate(Some("search:"));

        assert_eq!(cache.get::<u32>("search:bounty"), None);
        assert_eq!(cache.get::<u32>("search:label"), None);
        assert_eq!(cache.get::<u32>("user:octocat"), Some(3));
    }

    #[test]
    fn invalidate_without_pattern_clears_all() {
        let cache = RequestCache::new();
        cache.set("a", &1u32).unwrap();
        cache.set("b", &2u32).unwrap();

        cache.invalidate(None);

        assert!(cache.is_empty());
    }
}
