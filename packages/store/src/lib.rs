#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Single-writer filter store for the Saarthi Net dashboard.
//!
//! [`FilterStore`] owns the one [`FilterState`] of a session. Every
//! mutation goes through [`FilterStore::dispatch`], which is also the only
//! place the minimum-visible-layer guard is evaluated. Panels read the
//! state by reference and never keep their own copy of its fields.
//!
//! Each mutation reports a [`StoreChange`] so the caller can tell whether
//! the `(district, period)` request key moved (re-fetch), the layer flags
//! changed (map visibility), or only the hover focus changed (emphasis).

use saarthi_net_dashboard_models::{
    FilterDefaults, FilterState, Layer, LayerState, Period, RequestKey,
};

/// A mutation request against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    /// Replace the district unconditionally.
    SetDistrict(String),
    /// Replace the period; unknown identifiers normalize to the default.
    SetPeriod(String),
    /// Replace the period with an already-validated value.
    SetPeriodValue(Period),
    /// Flip one layer flag, subject to the visible-layer guard.
    ToggleLayer(Layer),
    /// Set one layer flag, subject to the guard when turning it off.
    SetLayer(Layer, bool),
    /// Set or clear the hover focus.
    SetFocusedDistrict(Option<String>),
    /// Restore the configured defaults.
    ResetFilters,
}

/// What a dispatched action changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreChange {
    /// District or period changed; the datasets must be re-fetched.
    pub request_key: bool,
    /// At least one layer flag changed.
    pub layers: bool,
    /// The focused district changed.
    pub focus: bool,
}

impl StoreChange {
    /// `true` if the action left the state untouched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.request_key && !self.layers && !self.focus
    }

    /// Union of two changes, for callers that dispatch several actions
    /// in response to one event.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            request_key: self.request_key || other.request_key,
            layers: self.layers || other.layers,
            focus: self.focus || other.focus,
        }
    }

    fn between(before: &FilterState, after: &FilterState) -> Self {
        Self {
            request_key: before.district != after.district || before.period != after.period,
            layers: before.layers != after.layers,
            focus: before.focused_district != after.focused_district,
        }
    }
}

/// Partial initial state overlaid on the defaults at construction.
#[derive(Debug, Clone, Default)]
pub struct InitialFilterState {
    pub district: Option<String>,
    /// Raw period identifier; invalid values fall back to the default.
    pub period: Option<String>,
    pub layers: Option<LayerState>,
    pub focused_district: Option<String>,
}

/// The filter store.
#[derive(Debug, Clone)]
pub struct FilterStore {
    state: FilterState,
    defaults: FilterDefaults,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterDefaults::default())
    }
}

impl FilterStore {
    /// Creates a store holding `defaults.initial_state()`.
    #[must_use]
    pub fn new(defaults: FilterDefaults) -> Self {
        Self::with_initial(defaults, InitialFilterState::default())
    }

    /// Creates a store from the defaults overlaid with `initial`.
    ///
    /// An initial layer set below the minimum is repaired by enabling the
    /// configured fallback layer first, then the remaining layers in
    /// priority order.
    #[must_use]
    pub fn with_initial(defaults: FilterDefaults, initial: InitialFilterState) -> Self {
        let mut state = defaults.initial_state();

        if let Some(district) = initial.district {
            state.district = district;
        }
        if let Some(period) = initial.period {
            state.period = Period::parse_or(&period, defaults.period);
        }
        if let Some(layers) = initial.layers {
            state.layers = layers;
        }
        state.focused_district = initial.focused_district;
        repair_layers(&mut state.layers, &defaults);

        Self { state, defaults }
    }

    /// Read-only view of the current state.
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// The configured defaults.
    #[must_use]
    pub const fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }

    /// The `(district, period)` key the datasets are fetched for.
    #[must_use]
    pub fn request_key(&self) -> RequestKey {
        self.state.request_key()
    }

    /// Number of visible layers.
    #[must_use]
    pub fn active_layer_count(&self) -> usize {
        self.state.layers.active_count()
    }

    /// Whether `layer` may be turned off right now.
    ///
    /// This is the canonical guard: toggles rendered by the filters panel
    /// are disabled exactly when this returns `false` for an active layer.
    #[must_use]
    pub fn can_disable(&self, layer: Layer) -> bool {
        if !self.state.layers.is_active(layer) {
            return true;
        }
        self.state.layers.active_count() > effective_minimum(&self.defaults)
    }

    /// Applies `action` and reports what changed.
    pub fn dispatch(&mut self, action: FilterAction) -> StoreChange {
        let before = self.state.clone();

        match action {
            FilterAction::SetDistrict(district) => {
                self.state.district = district;
            }
            FilterAction::SetPeriod(period) => {
                let parsed = Period::parse_or(&period, self.defaults.period);
                if !Period::is_valid(&period) {
                    log::debug!("Normalizing unknown period {period:?} to {parsed}");
                }
                self.state.period = parsed;
            }
            FilterAction::SetPeriodValue(period) => {
                self.state.period = period;
            }
            FilterAction::ToggleLayer(layer) => {
                let value = !self.state.layers.is_active(layer);
                self.apply_layer(layer, value);
            }
            FilterAction::SetLayer(layer, value) => {
                self.apply_layer(layer, value);
            }
            FilterAction::SetFocusedDistrict(focused) => {
                self.state.focused_district = focused;
            }
            FilterAction::ResetFilters => {
                let mut state = self.defaults.initial_state();
                repair_layers(&mut state.layers, &self.defaults);
                self.state = state;
            }
        }

        StoreChange::between(&before, &self.state)
    }

    fn apply_layer(&mut self, layer: Layer, value: bool) {
        if !value && !self.can_disable(layer) {
            log::debug!("Ignoring request to hide {layer}: it is the last visible layer");
            return;
        }
        self.state.layers.set(layer, value);
    }

    /// Replaces the district.
    pub fn set_district(&mut self, district: impl Into<String>) -> StoreChange {
        self.dispatch(FilterAction::SetDistrict(district.into()))
    }

    /// Replaces the period from a raw identifier.
    pub fn set_period(&mut self, period: impl Into<String>) -> StoreChange {
        self.dispatch(FilterAction::SetPeriod(period.into()))
    }

    /// Replaces the period with a typed value.
    pub fn set_period_value(&mut self, period: Period) -> StoreChange {
        self.dispatch(FilterAction::SetPeriodValue(period))
    }

    /// Flips `layer` unless it is the last visible one.
    pub fn toggle_layer(&mut self, layer: Layer) -> StoreChange {
        self.dispatch(FilterAction::ToggleLayer(layer))
    }

    /// Sets `layer` to `value`; hiding the last visible layer is ignored.
    pub fn set_layer(&mut self, layer: Layer, value: bool) -> StoreChange {
        self.dispatch(FilterAction::SetLayer(layer, value))
    }

    /// Sets or clears the focused district.
    pub fn set_focused_district(&mut self, district: Option<String>) -> StoreChange {
        self.dispatch(FilterAction::SetFocusedDistrict(district))
    }

    /// Clears the focused district.
    pub fn clear_focused_district(&mut self) -> StoreChange {
        self.dispatch(FilterAction::SetFocusedDistrict(None))
    }

    /// Restores the configured defaults.
    pub fn reset_filters(&mut self) -> StoreChange {
        self.dispatch(FilterAction::ResetFilters)
    }
}

/// The minimum, capped at the number of layers so it is always reachable.
fn effective_minimum(defaults: &FilterDefaults) -> usize {
    defaults.min_visible_layers.min(Layer::all().len())
}

/// Brings `layers` up to the minimum: the fallback layer first, then the
/// remaining layers in priority order.
fn repair_layers(layers: &mut LayerState, defaults: &FilterDefaults) {
    let min = effective_minimum(defaults);
    if layers.active_count() >= min {
        return;
    }

    log::warn!(
        "Layers {layers:?} below minimum of {min}, enabling {}",
        defaults.fallback_layer
    );
    layers.set(defaults.fallback_layer, true);
    for layer in Layer::all() {
        if layers.active_count() >= min {
            break;
        }
        layers.set(*layer, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saarthi_net_dashboard_models::ALL_DISTRICTS;

    fn single_layer_store() -> FilterStore {
        FilterStore::new(FilterDefaults::demo())
    }

    /// Every toggle sequence of length `len` over the three layers.
    fn toggle_sequences(len: u32) -> impl Iterator<Item = Vec<Layer>> {
        let layers = Layer::all();
        (0..3usize.pow(len)).map(move |mut n| {
            (0..len)
                .map(|_| {
                    let layer = layers[n % 3];
                    n /= 3;
                    layer
                })
                .collect()
        })
    }

    #[test]
    fn toggle_sequences_never_drop_below_minimum() {
        for defaults in [FilterDefaults::default(), FilterDefaults::demo()] {
            for sequence in toggle_sequences(6) {
                let mut store = FilterStore::new(defaults.clone());
                for layer in sequence {
                    store.toggle_layer(layer);
                    assert!(
                        store.active_layer_count() >= 1,
                        "layers {:?} dropped below minimum",
                        store.state().layers
                    );
                }
            }
        }
    }

    #[test]
    fn toggling_sole_active_layer_is_noop() {
        let mut store = single_layer_store();
        let before = store.state().clone();

        let change = store.toggle_layer(Layer::Migration);

        assert!(change.is_empty());
        assert_eq!(store.state(), &before);
        assert!(!store.can_disable(Layer::Migration));
    }

    #[test]
    fn set_layer_false_respects_guard() {
        let mut store = single_layer_store();
        store.set_layer(Layer::Migration, false);
        assert!(store.state().layers.migration);

        store.set_layer(Layer::DigitalRisk, true);
        let change = store.set_layer(Layer::Migration, false);
        assert!(change.layers);
        assert_eq!(store.state().layers.active_layers(), vec![Layer::DigitalRisk]);
    }

    #[test]
    fn inactive_layer_can_always_be_disabled() {
        let store = single_layer_store();
        assert!(store.can_disable(Layer::PeriUrban));
    }

    #[test]
    fn reset_restores_defaults_after_any_history() {
        let defaults = FilterDefaults::default();
        let mut store = FilterStore::new(defaults.clone());

        store.set_district("gaya");
        store.set_period("1y");
        store.toggle_layer(Layer::DigitalRisk);
        store.toggle_layer(Layer::Migration);
        store.set_focused_district(Some("Gaya".to_string()));

        let change = store.reset_filters();

        assert!(change.request_key && change.layers && change.focus);
        assert_eq!(store.state(), &defaults.initial_state());
        assert_eq!(store.state().district, ALL_DISTRICTS);
    }

    #[test]
    fn invalid_period_is_normalized_to_default() {
        let mut store = FilterStore::default();
        store.set_period("7d");
        assert_eq!(store.state().period, Period::Last7Days);

        store.set_period("fortnight");
        assert_eq!(store.state().period, Period::Last30Days);
    }

    #[test]
    fn focus_changes_never_touch_request_key() {
        let mut store = FilterStore::default();
        let change = store.set_focused_district(Some("Patna".to_string()));
        assert!(change.focus);
        assert!(!change.request_key);

        let change = store.clear_focused_district();
        assert!(change.focus);
        assert!(store.state().focused_district.is_none());
    }

    #[test]
    fn district_change_moves_request_key() {
        let mut store = FilterStore::default();
        let change = store.set_district("darbhanga");
        assert!(change.request_key);
        assert_eq!(
            store.request_key(),
            RequestKey::new("darbhanga", Period::Last30Days)
        );

        let change = store.set_district("darbhanga");
        assert!(change.is_empty());
    }

    #[test]
    fn initial_state_overlay_repairs_empty_layers() {
        let store = FilterStore::with_initial(
            FilterDefaults::default(),
            InitialFilterState {
                district: Some("bhagalpur".to_string()),
                period: Some("bogus".to_string()),
                layers: Some(LayerState::new(false, false, false)),
                focused_district: None,
            },
        );

        assert_eq!(store.state().district, "bhagalpur");
        assert_eq!(store.state().period, Period::Last30Days);
        assert_eq!(store.state().layers.active_layers(), vec![Layer::Migration]);
    }

    #[test]
    fn minimum_of_two_keeps_two_layers() {
        let defaults = FilterDefaults {
            min_visible_layers: 2,
            ..FilterDefaults::default()
        };
        let mut store = FilterStore::new(defaults);
        store.toggle_layer(Layer::PeriUrban);
        assert_eq!(store.active_layer_count(), 2);

        store.toggle_layer(Layer::DigitalRisk);
        store.toggle_layer(Layer::PeriUrban);
        assert_eq!(
            store.state().layers.active_layers(),
            vec![Layer::Migration, Layer::DigitalRisk]
        );
    }

    #[test]
    fn reset_repairs_defaults_below_minimum() {
        let defaults = FilterDefaults {
            min_visible_layers: 2,
            ..FilterDefaults::demo()
        };
        let mut store = FilterStore::new(defaults);
        store.toggle_layer(Layer::DigitalRisk);
        store.toggle_layer(Layer::Migration);
        assert_eq!(
            store.state().layers.active_layers(),
            vec![Layer::PeriUrban, Layer::DigitalRisk]
        );

        store.reset_filters();

        assert_eq!(store.active_layer_count(), 2);
        assert_eq!(
            store.state().layers.active_layers(),
            vec![Layer::Migration, Layer::PeriUrban]
        );
    }
}
