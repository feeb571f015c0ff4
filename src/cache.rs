use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;

pub const QUOTE_TTL: Duration = Duration::from_secs(10);
pub const CHART_TTL: Duration = Duration::from_secs(60);
pub const DIVIDEND_TTL: Duration = Duration::from_secs(6 * 60 * 60);
pub const TOTAL_RETURNS_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// In-memory store whose entries remember when they were inserted.
///
/// Freshness is decided by the caller's TTL at lookup time; an entry found stale is removed
/// on that lookup and nothing is ever swept in the background.
pub struct Cache<V> {
    entries: DashMap<String, CacheEntry<V>>,
}

struct CacheEntry<V> {
    value: V,
    timestamp: i64,
}

pub fn cache_key(kind: &str, discriminator: &str) -> String {
    format!("{kind}:{discriminator}")
}

impl<V: Clone> Cache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        self.get_at(key, ttl, Utc::now().timestamp_millis())
    }

    pub fn get_at(&self, key: &str, ttl: Duration, now_ms: i64) -> Option<V> {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);

        if let Some(entry) = self.entries.get(key) {
            if now_ms.saturating_sub(entry.timestamp) < ttl_ms {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }

        self.entries
            .remove_if(key, |_, entry| now_ms.saturating_sub(entry.timestamp) >= ttl_ms);

        None
    }

    pub fn set(&self, key: &str, value: V) {
        self.set_at(key, value, Utc::now().timestamp_millis());
    }

    pub fn set_at(&self, key: &str, value: V, now_ms: i64) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                timestamp: now_ms,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<V: Clone> Default for Cache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("quote", "SCHD"), "quote:SCHD");
        assert_eq!(cache_key("chart", "SCHD:1y:1d"), "chart:SCHD:1y:1d");
    }

    #[test]
    fn test_get_before_and_at_ttl_boundary() {
        let cache: Cache<f64> = Cache::new();
        cache.set_at("quote:JEPI", 57.3, 1_000);

        let ttl = Duration::from_millis(10_000);
        assert_eq!(cache.get_at("quote:JEPI", ttl, 1_000), Some(57.3));
        assert_eq!(cache.get_at("quote:JEPI", ttl, 10_999), Some(57.3));
        assert_eq!(cache.get_at("quote:JEPI", ttl, 11_000), None);
    }

    #[test]
    fn test_stale_entry_is_evicted_on_lookup() {
        let cache: Cache<String> = Cache::new();
        cache.set_at("dividends:O", "monthly".to_string(), 0);
        cache.set_at("dividends:MAIN", "monthly".to_string(), 5_000);
        assert_eq!(cache.len(), 2);

        assert!(cache.get_at("dividends:O", Duration::from_secs(3), 4_000).is_none());
        assert_eq!(cache.len(), 1);

        // a fresh lookup never removes anything
        assert!(cache.get_at("dividends:MAIN", Duration::from_secs(3), 6_000).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_is_chosen_per_lookup() {
        let cache: Cache<u32> = Cache::new();
        cache.set_at("chart:QYLD:1y:1d", 1, 0);

        assert_eq!(
            cache.get_at("chart:QYLD:1y:1d", Duration::from_secs(60), 30_000),
            Some(1)
        );
        assert_eq!(
            cache.get_at("chart:QYLD:1y:1d", Duration::from_secs(10), 30_000),
            None
        );
    }

    #[test]
    fn test_set_refreshes_timestamp() {
        let cache: Cache<u32> = Cache::new();
        cache.set_at("quote:VYM", 1, 0);
        cache.set_at("quote:VYM", 2, 9_000);

        assert_eq!(cache.get_at("quote:VYM", QUOTE_TTL, 15_000), Some(2));
    }

    #[test]
    fn test_missing_key_and_clear() {
        let cache: Cache<u32> = Cache::default();
        assert!(cache.is_empty());
        assert!(cache.get("quote:NONE", QUOTE_TTL).is_none());

        cache.set("quote:SPYD", 7);
        assert_eq!(cache.get("quote:SPYD", QUOTE_TTL), Some(7));

        cache.clear();
        assert!(cache.is_empty());
    }
}
