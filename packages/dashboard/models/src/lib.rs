#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, API response, and insight record types for the Saarthi Net
//! dashboard.
//!
//! This crate defines the vocabulary shared by every other package: the
//! [`FilterState`] owned by the filter store, the [`RequestKey`] used by
//! the fetch layer, the raw API contract in [`api`], and the display-side
//! insight records in [`insights`] together with their null-safe
//! formatters in [`format`].

pub mod api;
pub mod format;
pub mod insights;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Sentinel district value meaning "no district filter".
pub const ALL_DISTRICTS: &str = "all";

/// Minimum number of map layers that must stay visible.
pub const MIN_VISIBLE_LAYERS: usize = 1;

/// Layer force-enabled when an initial layer set has nothing visible.
pub const FALLBACK_LAYER: Layer = Layer::Migration;

/// Time window for dashboard data.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Period {
    /// Last 7 days.
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    Last7Days,
    /// Last 30 days.
    #[default]
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    Last30Days,
    /// Last 90 days.
    #[serde(rename = "90d")]
    #[strum(serialize = "90d")]
    Last90Days,
    /// Last year.
    #[serde(rename = "1y")]
    #[strum(serialize = "1y")]
    LastYear,
}

impl Period {
    /// Returns all variants in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Last7Days,
            Self::Last30Days,
            Self::Last90Days,
            Self::LastYear,
        ]
    }

    /// Human-readable label used by the selectors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
            Self::Last90Days => "Last 90 Days",
            Self::LastYear => "Last Year",
        }
    }

    /// Parses `value`, falling back to `default` when it is not one of
    /// the known period identifiers.
    #[must_use]
    pub fn parse_or(value: &str, default: Self) -> Self {
        value.trim().parse().unwrap_or(default)
    }

    /// Returns `true` if `value` names a known period.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        value.trim().parse::<Self>().is_ok()
    }
}

/// One of the three independently toggleable data categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive)]
pub enum Layer {
    /// Migration heatmap.
    #[strum(to_string = "migration")]
    Migration,
    /// Peri-urban alert zones.
    #[strum(to_string = "periUrban", serialize = "peri-urban", serialize = "peri_urban")]
    PeriUrban,
    /// Digital exclusion risk.
    #[strum(
        to_string = "digitalRisk",
        serialize = "digital-risk",
        serialize = "digital_risk"
    )]
    DigitalRisk,
}

impl Layer {
    /// Returns all variants in their fixed priority order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Migration, Self::PeriUrban, Self::DigitalRisk]
    }

    /// Label of the layer toggle in the filters panel.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Migration => "Migration Heatmap",
            Self::PeriUrban => "Peri-Urban Alert Zones",
            Self::DigitalRisk => "Digital Exclusion Risk",
        }
    }

    /// Short label used by the legend strip and map badges.
    #[must_use]
    pub const fn legend_label(self) -> &'static str {
        match self {
            Self::Migration => "Migration",
            Self::PeriUrban => "Peri-Urban Zones",
            Self::DigitalRisk => "Digital Exclusion",
        }
    }
}

/// Visibility flag per [`Layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerState {
    /// Migration heatmap visibility.
    pub migration: bool,
    /// Peri-urban alert zone visibility.
    pub peri_urban: bool,
    /// Digital exclusion risk visibility.
    pub digital_risk: bool,
}

impl LayerState {
    /// Creates a layer state from the three flags.
    #[must_use]
    pub const fn new(migration: bool, peri_urban: bool, digital_risk: bool) -> Self {
        Self {
            migration,
            peri_urban,
            digital_risk,
        }
    }

    /// Returns the flag for `layer`.
    #[must_use]
    pub const fn is_active(&self, layer: Layer) -> bool {
        match layer {
            Layer::Migration => self.migration,
            Layer::PeriUrban => self.peri_urban,
            Layer::DigitalRisk => self.digital_risk,
        }
    }

    /// Sets the flag for `layer`, without any guard.
    pub const fn set(&mut self, layer: Layer, value: bool) {
        match layer {
            Layer::Migration => self.migration = value,
            Layer::PeriUrban => self.peri_urban = value,
            Layer::DigitalRisk => self.digital_risk = value,
        }
    }

    /// Number of visible layers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        Layer::all().iter().filter(|l| self.is_active(**l)).count()
    }

    /// Visible layers in priority order.
    #[must_use]
    pub fn active_layers(&self) -> Vec<Layer> {
        Layer::all()
            .iter()
            .copied()
            .filter(|l| self.is_active(*l))
            .collect()
    }
}

/// The dashboard's filter and interaction state.
///
/// Owned exclusively by the filter store; everything else reads it by
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Selected district identifier, or [`ALL_DISTRICTS`].
    pub district: String,
    /// Selected time window.
    pub period: Period,
    /// Per-layer visibility.
    pub layers: LayerState,
    /// District currently hovered on the map. UI-only, never fetched.
    pub focused_district: Option<String>,
}

impl FilterState {
    /// The `(district, period)` pair data is fetched for.
    #[must_use]
    pub fn request_key(&self) -> RequestKey {
        RequestKey::new(self.district.clone(), self.period)
    }
}

/// Values the filter store starts from and resets to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDefaults {
    /// Initial district.
    pub district: String,
    /// Initial period, also the target of invalid period normalization.
    pub period: Period,
    /// Initial layer visibility.
    pub layers: LayerState,
    /// Minimum number of visible layers.
    pub min_visible_layers: usize,
    /// Layer enabled when an initial layer set is below the minimum.
    pub fallback_layer: Layer,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            district: ALL_DISTRICTS.to_string(),
            period: Period::Last30Days,
            layers: LayerState::new(true, true, false),
            min_visible_layers: MIN_VISIBLE_LAYERS,
            fallback_layer: FALLBACK_LAYER,
        }
    }
}

impl FilterDefaults {
    /// Demo profile: a well-populated district with a single layer on,
    /// so the dashboard shows data without any interaction.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            district: "patna".to_string(),
            layers: LayerState::new(true, false, false),
            ..Self::default()
        }
    }

    /// The state a freshly created or reset store holds.
    #[must_use]
    pub fn initial_state(&self) -> FilterState {
        FilterState {
            district: self.district.clone(),
            period: self.period,
            layers: self.layers,
            focused_district: None,
        }
    }
}

/// Cache and fetch key for all three datasets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    /// District identifier.
    pub district: String,
    /// Time window.
    pub period: Period,
}

impl RequestKey {
    /// Creates a new key.
    #[must_use]
    pub fn new(district: impl Into<String>, period: Period) -> Self {
        Self {
            district: district.into(),
            period,
        }
    }

    /// Whether the key can be fetched at all (non-empty district).
    #[must_use]
    pub fn is_fetchable(&self) -> bool {
        !self.district.trim().is_empty()
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.district, self.period)
    }
}

/// A district selector entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistrictOption {
    /// Identifier sent to the API.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// Districts offered by the selectors.
pub const DISTRICT_OPTIONS: &[DistrictOption] = &[
    DistrictOption {
        value: ALL_DISTRICTS,
        label: "All Districts",
    },
    DistrictOption {
        value: "patna",
        label: "Patna",
    },
    DistrictOption {
        value: "gaya",
        label: "Gaya",
    },
    DistrictOption {
        value: "muzaffarpur",
        label: "Muzaffarpur",
    },
    DistrictOption {
        value: "bhagalpur",
        label: "Bhagalpur",
    },
    DistrictOption {
        value: "darbhanga",
        label: "Darbhanga",
    },
];

/// Label for a district identifier, falling back to the identifier itself
/// for districts outside [`DISTRICT_OPTIONS`].
#[must_use]
pub fn district_label(value: &str) -> &str {
    DISTRICT_OPTIONS
        .iter()
        .find(|o| o.value.eq_ignore_ascii_case(value))
        .map_or(value, |o| o.label)
}
