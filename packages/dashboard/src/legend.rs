//! Legend strip and page header.

use saarthi_net_dashboard_models::{FilterState, Layer, district_label};

pub const TITLE: &str = "Saarthi Net";
pub const SUBTITLE: &str = "Data Intelligence for Migration & Digital Inclusion";
pub const LEGEND_DISCLAIMER: &str =
    "Insights are derived from anonymized, aggregated identity metadata.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendItem {
    pub layer: Layer,
    pub label: &'static str,
}

/// Legend entries, one per layer regardless of visibility.
#[must_use]
pub fn legend_items() -> Vec<LegendItem> {
    Layer::all()
        .iter()
        .map(|&layer| LegendItem {
            layer,
            label: layer.legend_label(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub district: String,
    pub period: &'static str,
}

impl HeaderView {
    #[must_use]
    pub fn from_state(state: &FilterState) -> Self {
        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            district: district_label(&state.district).to_string(),
            period: state.period.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saarthi_net_dashboard_models::FilterDefaults;

    #[test]
    fn legend_lists_every_layer() {
        let labels = legend_items().iter().map(|i| i.label).collect::<Vec<_>>();
        assert_eq!(labels, ["Migration", "Peri-Urban Zones", "Digital Exclusion"]);
    }

    #[test]
    fn header_uses_display_labels() {
        let header = HeaderView::from_state(&FilterDefaults::demo().initial_state());
        assert_eq!(header.district, "Patna");
        assert_eq!(header.period, "Last 30 Days");

        let header = HeaderView::from_state(&FilterDefaults::default().initial_state());
        assert_eq!(header.district, "All Districts");
    }
}
