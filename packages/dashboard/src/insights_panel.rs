//! Insight cards, one per dataset.
//!
//! A card's body is chosen by checking the query's loading state first,
//! then its error state; only then are the rows populated. Every value
//! goes through a null-safe formatter, so an all-`None` fallback record
//! renders as a card of `--`.

use saarthi_net_api::DashboardQueries;
use saarthi_net_dashboard_models::format::{
    format_index, format_percent, format_signed_percent, format_value,
};
use saarthi_net_dashboard_models::insights::{DigitalExclusionData, MigrationData, PeriUrbanData};
use saarthi_net_dashboard_models::{FilterState, Layer, LayerState};

/// How prominently a card is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    /// No layer is active.
    Neutral,
    /// The card's layer is active and a district is hovered on the map.
    Focused,
    /// The card's layer is active.
    Emphasized,
    /// Another layer is active, this one is not.
    Deemphasized,
}

/// Emphasis of the card for `layer`.
#[must_use]
pub fn emphasis(layer: Layer, layers: &LayerState, focused_district: Option<&str>) -> Emphasis {
    if layers.active_count() == 0 {
        Emphasis::Neutral
    } else if layers.is_active(layer) {
        if focused_district.is_some() {
            Emphasis::Focused
        } else {
            Emphasis::Emphasized
        }
    } else {
        Emphasis::Deemphasized
    }
}

/// A label/value line of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRow {
    pub label: &'static str,
    pub value: String,
}

impl InsightRow {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Loading,
    Error,
    Populated(Vec<InsightRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightCard {
    pub layer: Layer,
    pub title: &'static str,
    pub body: CardBody,
    pub emphasis: Emphasis,
}

/// Card heading for `layer`.
#[must_use]
pub const fn card_title(layer: Layer) -> &'static str {
    match layer {
        Layer::Migration => "Migration Overview",
        Layer::PeriUrban => "Peri-Urban Growth Alert",
        Layer::DigitalRisk => "Digital Exclusion Risk",
    }
}

#[must_use]
pub fn migration_rows(data: &MigrationData) -> Vec<InsightRow> {
    vec![
        InsightRow::new(
            "Net Movement",
            format_signed_percent(data.net_migration_percent),
        ),
        InsightRow::new("Trend", format_value(data.trend)),
        InsightRow::new(
            "Primary Source",
            format_value(data.top_source_district.as_deref()),
        ),
        InsightRow::new("Total Volume", format_value(data.total_movement.as_deref())),
    ]
}

/// Peri-urban rows. The explanation line is only present during an
/// alert.
#[must_use]
pub fn peri_urban_rows(data: &PeriUrbanData) -> Vec<InsightRow> {
    let mut rows = vec![
        InsightRow::new("Alert Status", format_value(data.alert_status)),
        InsightRow::new("Growth Index", format_index(data.growth_index)),
        InsightRow::new("Affected Zones", format_value(data.affected_zones)),
    ];
    if let Some(explanation) = &data.explanation {
        rows.push(InsightRow::new("Details", explanation.clone()));
    }
    rows
}

#[must_use]
pub fn digital_risk_rows(data: &DigitalExclusionData) -> Vec<InsightRow> {
    vec![
        InsightRow::new("Aadhaar Coverage", format_percent(data.aadhaar_coverage)),
        InsightRow::new("Digital Usability", format_percent(data.digital_usability)),
        InsightRow::new("Risk Level", format_value(data.risk_level)),
        InsightRow::new(
            "At-Risk Population",
            format_value(data.at_risk_population.as_deref()),
        ),
    ]
}

fn card_body<T: Default>(
    is_loading: bool,
    is_error: bool,
    data: Option<&T>,
    rows: impl FnOnce(&T) -> Vec<InsightRow>,
) -> CardBody {
    if is_loading {
        CardBody::Loading
    } else if is_error {
        CardBody::Error
    } else {
        match data {
            Some(data) => CardBody::Populated(rows(data)),
            None => CardBody::Populated(rows(&T::default())),
        }
    }
}

/// Builds the three cards in layer priority order.
#[must_use]
pub fn insight_cards(queries: &DashboardQueries, state: &FilterState) -> Vec<InsightCard> {
    let focused = state.focused_district.as_deref();

    Layer::all()
        .iter()
        .map(|&layer| {
            let body = match layer {
                Layer::Migration => {
                    let q = queries.migration();
                    card_body(q.is_loading(), q.is_error(), q.data(), migration_rows)
                }
                Layer::PeriUrban => {
                    let q = queries.peri_urban();
                    card_body(q.is_loading(), q.is_error(), q.data(), peri_urban_rows)
                }
                Layer::DigitalRisk => {
                    let q = queries.digital_risk();
                    card_body(q.is_loading(), q.is_error(), q.data(), digital_risk_rows)
                }
            };

            InsightCard {
                layer,
                title: card_title(layer),
                body,
                emphasis: emphasis(layer, &state.layers, focused),
            }
        })
        .collect()
}
