//! Filters panel view model.

use saarthi_net_dashboard_models::{DISTRICT_OPTIONS, Layer, Period};
use saarthi_net_store::FilterStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A layer switch. `disabled` switches are the ones the store would
/// refuse to turn off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerToggle {
    pub layer: Layer,
    pub label: &'static str,
    pub checked: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiltersPanelView {
    pub districts: Vec<SelectOption>,
    pub periods: Vec<SelectOption>,
    pub toggles: Vec<LayerToggle>,
}

impl FiltersPanelView {
    /// Reads the panel state from `store`.
    #[must_use]
    pub fn from_store(store: &FilterStore) -> Self {
        let state = store.state();

        let districts = DISTRICT_OPTIONS
            .iter()
            .map(|option| SelectOption {
                value: option.value,
                label: option.label,
                selected: option.value.eq_ignore_ascii_case(&state.district),
            })
            .collect();

        let periods = Period::all()
            .iter()
            .map(|period| SelectOption {
                value: period.as_ref(),
                label: period.label(),
                selected: *period == state.period,
            })
            .collect();

        let toggles = Layer::all()
            .iter()
            .map(|&layer| {
                let checked = state.layers.is_active(layer);
                LayerToggle {
                    layer,
                    label: layer.toggle_label(),
                    checked,
                    disabled: checked && !store.can_disable(layer),
                }
            })
            .collect();

        Self {
            districts,
            periods,
            toggles,
        }
    }

    #[must_use]
    pub fn toggle(&self, layer: Layer) -> Option<&LayerToggle> {
        self.toggles.iter().find(|t| t.layer == layer)
    }
}
