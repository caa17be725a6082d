//! The three dataset queries behind one dashboard view.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use saarthi_net_dashboard_models::api::{
    DigitalRiskApiResponse, MigrationApiResponse, PeriUrbanApiResponse,
};
use saarthi_net_dashboard_models::insights::{DigitalExclusionData, MigrationData, PeriUrbanData};
use saarthi_net_dashboard_models::{Layer, RequestKey};

use crate::ApiError;
use crate::client::DashboardApi;
use crate::config::QueryConfig;
use crate::progress::LoadingReporter;
use crate::query::DatasetQuery;
use crate::retry::with_retry;

pub const LOADING_INITIAL_MESSAGE: &str = "Loading district insights…";
pub const LOADING_PARTIAL_MESSAGE: &str = "Some insights are still loading…";
pub const LOADING_ERROR_MESSAGE: &str = "Data temporarily unavailable";
pub const NO_DATA_MESSAGE: &str = "No data available for this selection";

/// Which datasets still need a network fetch after [`DashboardQueries::begin`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingFetches {
    pub migration: bool,
    pub peri_urban: bool,
    pub digital_risk: bool,
}

impl PendingFetches {
    #[must_use]
    pub const fn any(self) -> bool {
        self.migration || self.peri_urban || self.digital_risk
    }

    #[must_use]
    pub fn count(self) -> usize {
        [self.migration, self.peri_urban, self.digital_risk]
            .into_iter()
            .filter(|p| *p)
            .count()
    }
}

/// Query state of the dashboard: one slot per dataset plus the key they
/// were last pointed at.
pub struct DashboardQueries {
    config: QueryConfig,
    current: Option<RequestKey>,
    migration: DatasetQuery<MigrationData>,
    peri_urban: DatasetQuery<PeriUrbanData>,
    digital_risk: DatasetQuery<DigitalExclusionData>,
}

impl DashboardQueries {
    #[must_use]
    pub fn new(config: QueryConfig) -> Self {
        Self {
            migration: DatasetQuery::new(Layer::Migration, &config),
            peri_urban: DatasetQuery::new(Layer::PeriUrban, &config),
            digital_risk: DatasetQuery::new(Layer::DigitalRisk, &config),
            current: None,
            config,
        }
    }

    /// Key of the most recent [`Self::begin`].
    #[must_use]
    pub const fn current_key(&self) -> Option<&RequestKey> {
        self.current.as_ref()
    }

    /// Whether `key` differs from the key the slots are showing.
    #[must_use]
    pub fn needs_refresh(&self, key: &RequestKey) -> bool {
        self.current.as_ref() != Some(key)
    }

    /// Points all three slots at `key` and reports which ones must fetch.
    pub fn begin(&mut self, key: &RequestKey, now: Instant) -> PendingFetches {
        if self.needs_refresh(key) {
            log::debug!("Request key changed to {key}");
        }
        self.current = Some(key.clone());

        PendingFetches {
            migration: self.migration.begin(key, now),
            peri_urban: self.peri_urban.begin(key, now),
            digital_risk: self.digital_risk.begin(key, now),
        }
    }

    /// Applies a migration fetch outcome. Returns whether the slot changed.
    pub fn complete_migration(
        &mut self,
        key: &RequestKey,
        outcome: Result<MigrationApiResponse, ApiError>,
        now: Instant,
    ) -> bool {
        self.migration
            .complete(key, outcome.map(MigrationData::from), now)
    }

    /// Applies a peri-urban fetch outcome. Returns whether the slot changed.
    pub fn complete_peri_urban(
        &mut self,
        key: &RequestKey,
        outcome: Result<PeriUrbanApiResponse, ApiError>,
        now: Instant,
    ) -> bool {
        self.peri_urban
            .complete(key, outcome.map(PeriUrbanData::from), now)
    }

    /// Applies a digital-risk fetch outcome. Returns whether the slot changed.
    pub fn complete_digital_risk(
        &mut self,
        key: &RequestKey,
        outcome: Result<DigitalRiskApiResponse, ApiError>,
        now: Instant,
    ) -> bool {
        self.digital_risk
            .complete(key, outcome.map(DigitalExclusionData::from), now)
    }

    /// Fetches whatever `key` needs, the three datasets concurrently.
    ///
    /// Each fetch goes through the configured retry policy and writes only
    /// its own slot as soon as it settles. Failures end up as fallback data
    /// in the slot; this never returns an error.
    pub async fn refresh(
        &mut self,
        api: &dyn DashboardApi,
        key: &RequestKey,
        reporter: &dyn LoadingReporter,
    ) -> PendingFetches {
        let pending = self.begin(key, Instant::now());
        if !pending.any() {
            log::debug!("Nothing to fetch for {key}");
            return pending;
        }

        log::info!("Fetching {} dataset(s) for {key}", pending.count());
        reporter.start(LOADING_INITIAL_MESSAGE.to_string());

        let policy = self.config.retry;
        let remaining = AtomicUsize::new(pending.count());
        let remaining = &remaining;
        let settled = move || {
            if remaining.fetch_sub(1, Ordering::SeqCst) > 1 {
                reporter.set_message(LOADING_PARTIAL_MESSAGE.to_string());
            }
        };

        let Self {
            migration,
            peri_urban,
            digital_risk,
            ..
        } = self;

        let migration_fetch = async move {
            if pending.migration {
                let outcome = with_retry(policy, "migration", || api.fetch_migration(key)).await;
                migration.complete(key, outcome.map(MigrationData::from), Instant::now());
                settled();
            }
        };
        let peri_urban_fetch = async move {
            if pending.peri_urban {
                let outcome =
                    with_retry(policy, "peri-urban", || api.fetch_peri_urban(key)).await;
                peri_urban.complete(key, outcome.map(PeriUrbanData::from), Instant::now());
                settled();
            }
        };
        let digital_risk_fetch = async move {
            if pending.digital_risk {
                let outcome =
                    with_retry(policy, "digital-risk", || api.fetch_digital_risk(key)).await;
                digital_risk.complete(
                    key,
                    outcome.map(DigitalExclusionData::from),
                    Instant::now(),
                );
                settled();
            }
        };

        tokio::join!(migration_fetch, peri_urban_fetch, digital_risk_fetch);

        if self.is_error() {
            reporter.finish(LOADING_ERROR_MESSAGE.to_string());
        } else {
            reporter.finish_and_clear();
        }
        pending
    }

    #[must_use]
    pub const fn migration(&self) -> &DatasetQuery<MigrationData> {
        &self.migration
    }

    #[must_use]
    pub const fn peri_urban(&self) -> &DatasetQuery<PeriUrbanData> {
        &self.peri_urban
    }

    #[must_use]
    pub const fn digital_risk(&self) -> &DatasetQuery<DigitalExclusionData> {
        &self.digital_risk
    }

    /// Number of slots currently loading (0 to 3).
    #[must_use]
    pub fn loading_count(&self) -> usize {
        [
            self.migration.is_loading(),
            self.peri_urban.is_loading(),
            self.digital_risk.is_loading(),
        ]
        .into_iter()
        .filter(|l| *l)
        .count()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading_count() > 0
    }

    /// One or two of the three slots are loading.
    #[must_use]
    pub fn is_partially_loading(&self) -> bool {
        matches!(self.loading_count(), 1 | 2)
    }

    #[must_use]
    pub fn is_fully_loading(&self) -> bool {
        self.loading_count() == 3
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of slots whose last fetch failed and now show fallback data.
    #[must_use]
    pub fn error_count(&self) -> usize {
        [
            self.migration.is_error(),
            self.peri_urban.is_error(),
            self.digital_risk.is_error(),
        ]
        .into_iter()
        .filter(|e| *e)
        .count()
    }

    /// Whether any slot has data to show, fallback records included.
    #[must_use]
    pub const fn has_any_data(&self) -> bool {
        self.migration.data().is_some()
            || self.peri_urban.data().is_some()
            || self.digital_risk.data().is_some()
    }

    /// Status line for the current aggregate state, if any.
    #[must_use]
    pub fn loading_message(&self) -> Option<&'static str> {
        if self.is_fully_loading() {
            Some(LOADING_INITIAL_MESSAGE)
        } else if self.is_partially_loading() {
            Some(LOADING_PARTIAL_MESSAGE)
        } else if self.is_error() {
            Some(LOADING_ERROR_MESSAGE)
        } else {
            None
        }
    }
}
