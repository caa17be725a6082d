//! Dashboard controller.
//!
//! Owns the filter store, the dataset queries, and the map panel, and is
//! the only writer of any of them. UI input arrives as [`UiEvent`]s;
//! [`Dashboard::apply`] dispatches to the store and propagates the
//! resulting change to the map. Fetching is a separate step,
//! [`Dashboard::refresh`], so callers decide when to go to the network.

use saarthi_net_api::dashboard::PendingFetches;
use saarthi_net_api::progress::LoadingReporter;
use saarthi_net_api::{ApiConfig, DashboardApi, DashboardQueries};
use saarthi_net_dashboard_models::Layer;
use saarthi_net_store::{FilterAction, FilterStore, StoreChange};

use crate::filters_panel::FiltersPanelView;
use crate::insights_panel::{InsightCard, insight_cards};
use crate::legend::HeaderView;
use crate::map_panel::{MapDataError, MapEvent, MapPanel, Tooltip};

/// User input the dashboard understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectDistrict(String),
    /// Raw period string; invalid values normalize to the default.
    SelectPeriod(String),
    ToggleLayer(Layer),
    Map(MapEvent),
    ResetFilters,
}

/// Result of [`Dashboard::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiOutcome {
    pub change: StoreChange,
    /// Tooltip produced by a map hover.
    pub tooltip: Option<Tooltip>,
    /// The request key no longer matches the loaded data.
    pub needs_refresh: bool,
}

pub struct Dashboard {
    store: FilterStore,
    queries: DashboardQueries,
    map: MapPanel,
}

impl Dashboard {
    /// Builds a dashboard over `store`, using `config` for query tuning
    /// and the map access token.
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError`] if the embedded map layers fail to load.
    pub fn new(store: FilterStore, config: &ApiConfig) -> Result<Self, MapDataError> {
        let map = MapPanel::new(config.map_access_token.clone())?;
        Ok(Self::with_map(store, config, map))
    }

    /// Builds a dashboard around an existing map panel.
    #[must_use]
    pub fn with_map(store: FilterStore, config: &ApiConfig, mut map: MapPanel) -> Self {
        map.sync_visibility(&store.state().layers);
        map.focus_district(&store.state().district);

        Self {
            queries: DashboardQueries::new(config.query),
            store,
            map,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &FilterStore {
        &self.store
    }

    #[must_use]
    pub const fn queries(&self) -> &DashboardQueries {
        &self.queries
    }

    #[must_use]
    pub const fn map(&self) -> &MapPanel {
        &self.map
    }

    pub const fn map_mut(&mut self) -> &mut MapPanel {
        &mut self.map
    }

    /// Whether the store's request key differs from the loaded data.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.queries.needs_refresh(&self.store.request_key())
    }

    /// Applies one UI event.
    pub fn apply(&mut self, event: UiEvent) -> UiOutcome {
        let mut tooltip = None;

        let change = match event {
            UiEvent::SelectDistrict(district) => {
                self.store.dispatch(FilterAction::SetDistrict(district))
            }
            UiEvent::SelectPeriod(period) => self.store.dispatch(FilterAction::SetPeriod(period)),
            UiEvent::ToggleLayer(layer) => {
                if !self.store.can_disable(layer) {
                    log::info!("Keeping {layer} visible, at least one layer must stay on");
                }
                self.store.dispatch(FilterAction::ToggleLayer(layer))
            }
            UiEvent::ResetFilters => self.store.dispatch(FilterAction::ResetFilters),
            UiEvent::Map(map_event) => {
                let response = self.map.handle_event(map_event);
                tooltip = response.tooltip;

                let mut change = response
                    .action
                    .map(|action| self.store.dispatch(action))
                    .unwrap_or_default();
                if let Some(district) = response.selected_district {
                    change = change.merge(self.store.dispatch(FilterAction::SetDistrict(district)));
                }
                change
            }
        };

        let change = self.propagate(change);

        UiOutcome {
            change,
            tooltip,
            needs_refresh: self.needs_refresh(),
        }
    }

    fn propagate(&mut self, mut change: StoreChange) -> StoreChange {
        if change.layers
            && let Some(clear) = self.map.sync_visibility(&self.store.state().layers)
        {
            change = change.merge(self.store.dispatch(clear));
        }
        if change.request_key {
            let district = self.store.state().district.clone();
            self.map.focus_district(&district);
        }
        change
    }

    /// Fetches the datasets for the current request key if it changed
    /// since the last refresh.
    pub async fn refresh(
        &mut self,
        api: &dyn DashboardApi,
        reporter: &dyn LoadingReporter,
    ) -> PendingFetches {
        let key = self.store.request_key();
        if !self.queries.needs_refresh(&key) {
            return PendingFetches::default();
        }
        self.queries.refresh(api, &key, reporter).await
    }

    /// Refetches the current key even if unchanged; fresh cache entries
    /// are still served without a request.
    pub async fn reload(
        &mut self,
        api: &dyn DashboardApi,
        reporter: &dyn LoadingReporter,
    ) -> PendingFetches {
        let key = self.store.request_key();
        self.queries.refresh(api, &key, reporter).await
    }

    #[must_use]
    pub fn header(&self) -> HeaderView {
        HeaderView::from_state(self.store.state())
    }

    #[must_use]
    pub fn filters(&self) -> FiltersPanelView {
        FiltersPanelView::from_store(&self.store)
    }

    #[must_use]
    pub fn insight_cards(&self) -> Vec<InsightCard> {
        insight_cards(&self.queries, self.store.state())
    }
}
