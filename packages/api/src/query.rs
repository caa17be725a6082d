//! One dataset's query slot.
//!
//! A [`DatasetQuery`] owns the cache and the display state of a single
//! dataset. It never surfaces an error value to its reader: after a final
//! failure its data is the last value it showed without error (for this
//! or any earlier key), or the dataset's all-empty fallback record.

use std::time::Instant;

use saarthi_net_dashboard_models::{Layer, RequestKey};

use crate::ApiError;
use crate::cache::QueryCache;
use crate::config::QueryConfig;

/// Lifecycle of a dataset query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Never started, or the key was not fetchable.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed after all retries.
    Error,
    /// Data for the current key is available.
    Success,
}

/// Query slot for one dataset.
pub struct DatasetQuery<T> {
    layer: Layer,
    cache: QueryCache<T>,
    status: QueryStatus,
    key: Option<RequestKey>,
    data: Option<T>,
    last_good: Option<T>,
    error: Option<String>,
}

impl<T: Clone + Default> DatasetQuery<T> {
    /// Creates an idle slot for the dataset behind `layer`.
    #[must_use]
    pub fn new(layer: Layer, config: &QueryConfig) -> Self {
        Self {
            layer,
            cache: QueryCache::new(config.stale_time, config.cache_time),
            status: QueryStatus::Idle,
            key: None,
            data: None,
            last_good: None,
            error: None,
        }
    }

    /// Points the slot at `key`.
    ///
    /// Returns `true` if a fetch is needed. A fresh cache hit is served
    /// immediately as a success; a stale hit becomes placeholder data
    /// while loading; otherwise the previous data stays as the placeholder.
    /// Any cached value shown this way also becomes the last good value.
    pub fn begin(&mut self, key: &RequestKey, now: Instant) -> bool {
        self.key = Some(key.clone());
        self.error = None;

        if !key.is_fetchable() {
            self.status = QueryStatus::Idle;
            return false;
        }

        match self.cache.get(key, now) {
            Some(cached) if cached.is_fresh() => {
                log::debug!("{}: serving fresh cache for {key}", self.layer);
                let value = cached.into_value();
                self.last_good = Some(value.clone());
                self.data = Some(value);
                self.status = QueryStatus::Success;
                false
            }
            Some(stale) => {
                let value = stale.into_value();
                self.last_good = Some(value.clone());
                self.data = Some(value);
                self.status = QueryStatus::Loading;
                true
            }
            None => {
                self.status = QueryStatus::Loading;
                true
            }
        }
    }

    /// Applies the outcome of a fetch for `key`.
    ///
    /// Successful values are always cached. The slot itself only changes
    /// if `key` is still the slot's current key; returns whether it did.
    pub fn complete(&mut self, key: &RequestKey, outcome: Result<T, ApiError>, now: Instant) -> bool {
        let is_current = self.key.as_ref() == Some(key);

        match outcome {
            Ok(value) => {
                self.cache.insert(key.clone(), value.clone(), now);
                if !is_current {
                    log::debug!("{}: discarding superseded response for {key}", self.layer);
                    return false;
                }
                self.last_good = Some(value.clone());
                self.data = Some(value);
                self.status = QueryStatus::Success;
                self.error = None;
            }
            Err(e) => {
                if !is_current {
                    log::debug!("{}: ignoring superseded failure for {key}: {e}", self.layer);
                    return false;
                }
                log::warn!("{}: fetch for {key} failed, using fallback: {e}", self.layer);
                self.data = Some(self.last_good.clone().unwrap_or_default());
                self.status = QueryStatus::Error;
                self.error = Some(e.to_string());
            }
        }

        self.cache.evict_expired(now);
        true
    }

    /// The dataset this slot serves.
    #[must_use]
    pub const fn layer(&self) -> Layer {
        self.layer
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> QueryStatus {
        self.status
    }

    /// Key the slot currently tracks.
    #[must_use]
    pub const fn key(&self) -> Option<&RequestKey> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Data to display: the current value, a placeholder while loading,
    /// or the fallback after a failure. `None` only before the first
    /// result.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Last value shown without error, fetched or served from cache, for
    /// any key.
    #[must_use]
    pub const fn last_good(&self) -> Option<&T> {
        self.last_good.as_ref()
    }

    /// Message of the last failure for the current key.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saarthi_net_dashboard_models::Period;
    use saarthi_net_dashboard_models::insights::MigrationData;
    use std::time::Duration;

    fn key(district: &str) -> RequestKey {
        RequestKey::new(district, Period::Last30Days)
    }

    fn failure() -> ApiError {
        ApiError::Status {
            status: 503,
            url: "http://localhost/api/migration".to_string(),
        }
    }

    fn sample(percent: f64) -> MigrationData {
        MigrationData {
            net_migration_percent: Some(percent),
            ..MigrationData::default()
        }
    }

    fn slot() -> DatasetQuery<MigrationData> {
        DatasetQuery::new(Layer::Migration, &QueryConfig::default())
    }

    #[test]
    fn failure_without_history_yields_fallback_record() {
        let mut query = slot();
        let now = Instant::now();

        assert!(query.begin(&key("patna"), now));
        assert!(query.is_loading());
        query.complete(&key("patna"), Err(failure()), now);

        assert!(query.is_error());
        assert_eq!(query.data(), Some(&MigrationData::default()));
        assert!(query.error().is_some_and(|e| e.contains("503")));
    }

    #[test]
    fn failure_after_success_keeps_last_good_value() {
        let mut query = slot();
        let now = Instant::now();

        query.begin(&key("patna"), now);
        query.complete(&key("patna"), Ok(sample(12.4)), now);

        query.begin(&key("gaya"), now);
        assert_eq!(query.data(), Some(&sample(12.4)), "previous data is the placeholder");
        query.complete(&key("gaya"), Err(failure()), now);

        assert!(query.is_error());
        assert_eq!(query.data(), Some(&sample(12.4)));
        assert_eq!(query.last_good(), Some(&sample(12.4)));
    }

    #[test]
    fn fresh_cache_hit_skips_fetch() {
        let mut query = slot();
        let now = Instant::now();
        query.begin(&key("patna"), now);
        query.complete(&key("patna"), Ok(sample(1.0)), now);
        query.begin(&key("gaya"), now);
        query.complete(&key("gaya"), Ok(sample(2.0)), now);

        assert!(!query.begin(&key("patna"), now + Duration::from_secs(60)));
        assert_eq!(query.status(), QueryStatus::Success);
        assert_eq!(query.data(), Some(&sample(1.0)));
    }

    #[test]
    fn stale_cache_hit_is_placeholder_while_refetching() {
        let mut query = slot();
        let now = Instant::now();
        query.begin(&key("patna"), now);
        query.complete(&key("patna"), Ok(sample(1.0)), now);

        let later = now + Duration::from_secs(301);
        assert!(query.begin(&key("patna"), later));
        assert!(query.is_loading());
        assert_eq!(query.data(), Some(&sample(1.0)));
    }

    #[test]
    fn superseded_response_does_not_overwrite_current_key() {
        let mut query = slot();
        let now = Instant::now();
        query.begin(&key("patna"), now);
        query.begin(&key("gaya"), now);

        let applied = query.complete(&key("patna"), Ok(sample(9.9)), now);

        assert!(!applied);
        assert!(query.is_loading());
        assert_eq!(query.key(), Some(&key("gaya")));
        assert!(query.last_good().is_none());

        // The superseded value was still cached for its own key.
        assert!(!query.begin(&key("patna"), now));
        assert_eq!(query.data(), Some(&sample(9.9)));
    }

    #[test]
    fn failed_refetch_keeps_own_cached_value() {
        let mut query = slot();
        let t0 = Instant::now();
        query.begin(&key("patna"), t0);
        query.complete(&key("patna"), Ok(sample(12.4)), t0);
        query.begin(&key("gaya"), t0);
        query.complete(&key("gaya"), Ok(sample(-3.0)), t0);

        assert!(!query.begin(&key("patna"), t0 + Duration::from_secs(60)));
        assert_eq!(query.last_good(), Some(&sample(12.4)));

        let stale = t0 + Duration::from_secs(301);
        assert!(query.begin(&key("patna"), stale));
        assert_eq!(query.data(), Some(&sample(12.4)));
        query.complete(&key("patna"), Err(failure()), stale);

        assert!(query.is_error());
        assert_eq!(query.data(), Some(&sample(12.4)));
    }

    #[test]
    fn empty_district_is_not_fetched() {
        let mut query = slot();
        assert!(!query.begin(&key(""), Instant::now()));
        assert_eq!(query.status(), QueryStatus::Idle);
    }
}
