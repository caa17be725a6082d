//! Per-key result cache with a freshness window and a retention window.
//!
//! A value younger than `stale_time` is served without refetching. Older
//! values are still returned as placeholders while a refetch is in flight
//! (so the UI does not flicker back to empty), until they pass
//! `cache_time` and are evicted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use saarthi_net_dashboard_models::RequestKey;

struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

/// Lookup result from [`QueryCache::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cached<T> {
    /// Within the freshness window.
    Fresh(T),
    /// Past freshness but still retained.
    Stale(T),
}

impl<T> Cached<T> {
    /// The cached value regardless of freshness.
    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(v) | Self::Stale(v) => v,
        }
    }

    /// Whether the value is within the freshness window.
    pub const fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Cache of one dataset's results, keyed by [`RequestKey`].
pub struct QueryCache<T> {
    entries: HashMap<RequestKey, CacheEntry<T>>,
    stale_time: Duration,
    cache_time: Duration,
}

impl<T: Clone> QueryCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(stale_time: Duration, cache_time: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stale_time,
            cache_time: cache_time.max(stale_time),
        }
    }

    /// Looks up `key` as of `now`, evicting it if past retention.
    pub fn get(&mut self, key: &RequestKey, now: Instant) -> Option<Cached<T>> {
        let age = now.saturating_duration_since(self.entries.get(key)?.fetched_at);

        if age >= self.cache_time {
            log::debug!("Evicting cached {key} after {age:?}");
            self.entries.remove(key);
            return None;
        }

        let value = self.entries.get(key)?.value.clone();
        Some(if age < self.stale_time {
            Cached::Fresh(value)
        } else {
            Cached::Stale(value)
        })
    }

    /// Stores `value` for `key`, fetched at `now`.
    pub fn insert(&mut self, key: RequestKey, value: T, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: now,
            },
        );
    }

    /// Drops every entry past retention as of `now`.
    pub fn evict_expired(&mut self, now: Instant) {
        let cache_time = self.cache_time;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < cache_time);
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saarthi_net_dashboard_models::Period;

    const STALE: Duration = Duration::from_secs(300);
    const RETAIN: Duration = Duration::from_secs(1800);

    fn key(district: &str) -> RequestKey {
        RequestKey::new(district, Period::Last30Days)
    }

    #[test]
    fn fresh_then_stale_then_evicted() {
        let mut cache = QueryCache::new(STALE, RETAIN);
        let t0 = Instant::now();
        cache.insert(key("patna"), 1, t0);

        assert_eq!(cache.get(&key("patna"), t0 + Duration::from_secs(10)), Some(Cached::Fresh(1)));
        assert_eq!(cache.get(&key("patna"), t0 + STALE), Some(Cached::Stale(1)));
        assert_eq!(cache.get(&key("patna"), t0 + RETAIN), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_are_independent() {
        let mut cache = QueryCache::new(STALE, RETAIN);
        let t0 = Instant::now();
        cache.insert(key("patna"), 1, t0);

        assert!(cache.get(&key("gaya"), t0).is_none());
        assert!(
            cache
                .get(&RequestKey::new("patna", Period::Last7Days), t0)
                .is_none()
        );
    }

    #[test]
    fn evict_expired_keeps_recent_entries() {
        let mut cache = QueryCache::new(STALE, RETAIN);
        let t0 = Instant::now();
        cache.insert(key("patna"), 1, t0);
        cache.insert(key("gaya"), 2, t0 + Duration::from_secs(1000));

        cache.evict_expired(t0 + RETAIN);

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("gaya"), t0 + RETAIN).is_some_and(|c| !c.is_fresh()));
    }
}
