//! Map panel: layer visibility, hover/click handling, viewport fitting.
//!
//! Each dataset is one [`MapLayer`] parsed once from embedded `GeoJSON`.
//! Toggling a layer only flips its `visible` flag; geometry is never
//! rebuilt. Pointer interaction arrives as [`MapEvent`]s and leaves as a
//! [`MapResponse`] whose [`FilterAction`] the caller dispatches to the
//! store, so hover → focus → emphasis stays a one-way flow.

use std::fmt;

use geo::{BoundingRect, Contains, Coord, Geometry, GeometryCollection, Point, Rect};
use geojson::{GeoJson, JsonObject};
use saarthi_net_dashboard_models::api::ApiRiskLevel;
use saarthi_net_dashboard_models::format::{MISSING, format_index, format_signed_percent};
use saarthi_net_dashboard_models::insights::RiskLevel;
use saarthi_net_dashboard_models::{ALL_DISTRICTS, Layer, LayerState};
use saarthi_net_store::FilterAction;

const MIGRATION_GEOJSON: &str = include_str!("../data/migration.geojson");
const PERI_URBAN_GEOJSON: &str = include_str!("../data/peri_urban.geojson");
const DIGITAL_RISK_GEOJSON: &str = include_str!("../data/digital_risk.geojson");

/// Name shown for a feature with neither a `name` nor a `district`.
pub const UNKNOWN_FEATURE_NAME: &str = "Unknown";

/// Errors loading layer geometry.
#[derive(Debug, thiserror::Error)]
pub enum MapDataError {
    /// The embedded document is not valid `GeoJSON`.
    #[error("Invalid GeoJSON for {layer} layer: {source}")]
    GeoJson {
        layer: Layer,
        #[source]
        source: Box<geojson::Error>,
    },

    /// The document parsed but is not a `FeatureCollection`.
    #[error("{layer} layer is not a FeatureCollection")]
    NotFeatureCollection { layer: Layer },
}

/// One feature of a layer: its properties and, if parseable, its shape.
#[derive(Debug, Clone)]
pub struct MapFeature {
    properties: JsonObject,
    geometry: Option<Geometry<f64>>,
}

impl MapFeature {
    fn property_str(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn property_f64(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Display name: `name`, else `district`, else `"Unknown"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.property_str("name")
            .or_else(|| self.property_str("district"))
            .unwrap_or(UNKNOWN_FEATURE_NAME)
    }

    /// District identifier used when the feature is clicked: `district`,
    /// else `name`, lowercased. `None` for a feature with neither.
    #[must_use]
    pub fn district_id(&self) -> Option<String> {
        self.property_str("district")
            .or_else(|| self.property_str("name"))
            .map(str::to_ascii_lowercase)
    }

    /// Whether the `name` or `district` property equals `district`,
    /// ignoring ASCII case.
    #[must_use]
    pub fn matches_district(&self, district: &str) -> bool {
        ["name", "district"]
            .iter()
            .filter_map(|key| self.property_str(key))
            .any(|value| value.eq_ignore_ascii_case(district))
    }

    #[must_use]
    pub const fn geometry(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref()
    }

    /// One-line metric for this feature as drawn on `layer`.
    #[must_use]
    pub fn tooltip(&self, layer: Layer) -> Tooltip {
        let metric = match layer {
            Layer::Migration => format!(
                "Net migration: {}",
                format_signed_percent(self.property_f64("netMigrationPercent"))
            ),
            Layer::PeriUrban => format!(
                "Growth index: {}",
                format_index(self.property_f64("growthIndex"))
            ),
            Layer::DigitalRisk => {
                let level = self
                    .properties
                    .get("riskLevel")
                    .and_then(|v| serde_json::from_value::<ApiRiskLevel>(v.clone()).ok())
                    .and_then(RiskLevel::from_api);
                match (level, self.property_f64("riskScore")) {
                    (Some(level), Some(score)) => {
                        format!("Risk: {level} ({})", format_index(Some(score)))
                    }
                    (Some(level), None) => format!("Risk: {level}"),
                    (None, _) => format!("Risk: {MISSING}"),
                }
            }
        };

        Tooltip {
            title: self.name().to_string(),
            metric,
        }
    }
}

/// Hover tooltip: feature name plus one metric line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub title: String,
    pub metric: String,
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.title, self.metric)
    }
}

/// One dataset's features and its visibility.
#[derive(Debug, Clone)]
pub struct MapLayer {
    layer: Layer,
    features: Vec<MapFeature>,
    visible: bool,
}

impl MapLayer {
    /// Parses a `FeatureCollection` document for `layer`.
    ///
    /// Features whose geometry cannot be converted are kept without a
    /// shape: they still answer hover events but never match a point or
    /// contribute to a viewport.
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError`] if `geojson` does not parse or is not a
    /// `FeatureCollection`.
    pub fn parse(layer: Layer, geojson: &str) -> Result<Self, MapDataError> {
        let parsed: GeoJson = geojson.parse().map_err(|e| MapDataError::GeoJson {
            layer,
            source: Box::new(e),
        })?;

        let GeoJson::FeatureCollection(collection) = parsed else {
            return Err(MapDataError::NotFeatureCollection { layer });
        };

        let features = collection
            .features
            .into_iter()
            .map(|feature| {
                let geometry = feature.geometry.and_then(|g| {
                    Geometry::<f64>::try_from(g)
                        .inspect_err(|e| log::warn!("Skipping {layer} feature geometry: {e}"))
                        .ok()
                });
                MapFeature {
                    properties: feature.properties.unwrap_or_default(),
                    geometry,
                }
            })
            .collect::<Vec<_>>();

        log::debug!("Loaded {} features into the {layer} layer", features.len());

        Ok(Self {
            layer,
            features,
            visible: false,
        })
    }

    #[must_use]
    pub const fn layer(&self) -> Layer {
        self.layer
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    fn matching_geometries(&self, district: &str) -> Vec<Geometry<f64>> {
        self.features
            .iter()
            .filter(|f| f.matches_district(district))
            .filter_map(|f| f.geometry.clone())
            .collect()
    }
}

/// Visible map extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Rect<f64>,
}

impl Viewport {
    #[must_use]
    pub const fn new(bounds: Rect<f64>) -> Self {
        Self { bounds }
    }

    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    #[must_use]
    pub fn center(&self) -> Coord<f64> {
        self.bounds.center()
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let center = self.center();
        write!(
            f,
            "center ({:.3}, {:.3}), {:.2}° × {:.2}°",
            center.x,
            center.y,
            self.bounds.width(),
            self.bounds.height()
        )
    }
}

/// Pointer interaction with a feature. `feature` indexes
/// [`MapLayer::features`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    Hover { layer: Layer, feature: usize },
    Leave { layer: Layer },
    Click { layer: Layer, feature: usize },
}

/// What the map wants done after an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapResponse {
    /// Store action to dispatch (focus changes only).
    pub action: Option<FilterAction>,
    /// Tooltip to show after a hover.
    pub tooltip: Option<Tooltip>,
    /// District identifier chosen by a click.
    pub selected_district: Option<String>,
}

impl MapResponse {
    /// `true` if the event was ignored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.action.is_none() && self.tooltip.is_none() && self.selected_district.is_none()
    }
}

/// Snapshot of the panel for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    /// No map access token is configured.
    Placeholder { active_layers: usize },
    Interactive {
        active_layers: Vec<Layer>,
        viewport: Viewport,
        hovered: Option<Tooltip>,
    },
}

type DistrictSelected = Box<dyn FnMut(&str) + Send>;

/// The map panel.
pub struct MapPanel {
    layers: Vec<MapLayer>,
    viewport: Viewport,
    hovered: Option<(Layer, usize)>,
    access_token: Option<String>,
    on_district_selected: Option<DistrictSelected>,
}

impl fmt::Debug for MapPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapPanel")
            .field("layers", &self.layers)
            .field("viewport", &self.viewport)
            .field("hovered", &self.hovered)
            .field("has_access_token", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl MapPanel {
    /// Builds the panel from the embedded layer data.
    ///
    /// # Errors
    ///
    /// Returns [`MapDataError`] if an embedded layer fails to parse.
    pub fn new(access_token: Option<String>) -> Result<Self, MapDataError> {
        Ok(Self::from_layers(
            vec![
                MapLayer::parse(Layer::Migration, MIGRATION_GEOJSON)?,
                MapLayer::parse(Layer::PeriUrban, PERI_URBAN_GEOJSON)?,
                MapLayer::parse(Layer::DigitalRisk, DIGITAL_RISK_GEOJSON)?,
            ],
            access_token,
        ))
    }

    /// Builds the panel from already parsed layers. All layers start
    /// hidden until [`Self::sync_visibility`].
    #[must_use]
    pub fn from_layers(layers: Vec<MapLayer>, access_token: Option<String>) -> Self {
        let all_shapes = layers
            .iter()
            .flat_map(|l| l.features.iter().filter_map(|f| f.geometry.clone()))
            .collect::<Vec<_>>();
        let bounds = GeometryCollection::from(all_shapes)
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(Coord { x: -180.0, y: -90.0 }, Coord { x: 180.0, y: 90.0 }));

        if access_token.is_none() {
            log::info!("Map access token missing, map panel renders as a placeholder");
        }

        Self {
            layers,
            viewport: Viewport::new(bounds),
            hovered: None,
            access_token,
            on_district_selected: None,
        }
    }

    /// Registers the callback invoked with the district identifier of a
    /// clicked feature.
    pub fn set_on_district_selected(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_district_selected = Some(Box::new(callback));
    }

    #[must_use]
    pub fn layer(&self, layer: Layer) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Applies the store's layer flags.
    ///
    /// If the hovered feature's layer was hidden, returns the action that
    /// clears the focused district.
    pub fn sync_visibility(&mut self, layers: &LayerState) -> Option<FilterAction> {
        for map_layer in &mut self.layers {
            map_layer.visible = layers.is_active(map_layer.layer);
        }

        match self.hovered {
            Some((layer, _)) if !layers.is_active(layer) => {
                self.hovered = None;
                Some(FilterAction::SetFocusedDistrict(None))
            }
            _ => None,
        }
    }

    /// Index of the first feature on `layer` whose shape contains `point`.
    #[must_use]
    pub fn feature_at(&self, layer: Layer, point: Point<f64>) -> Option<usize> {
        self.layer(layer)?
            .features
            .iter()
            .position(|f| f.geometry.as_ref().is_some_and(|g| g.contains(&point)))
    }

    /// Index of the first feature on `layer` matching `district`.
    #[must_use]
    pub fn find_feature(&self, layer: Layer, district: &str) -> Option<usize> {
        self.layer(layer)?
            .features
            .iter()
            .position(|f| f.matches_district(district))
    }

    fn visible_feature(&self, layer: Layer, feature: usize) -> Option<&MapFeature> {
        let map_layer = self.layer(layer).filter(|l| l.visible)?;
        map_layer.features.get(feature)
    }

    /// Handles one pointer event. Events on hidden layers are ignored.
    pub fn handle_event(&mut self, event: MapEvent) -> MapResponse {
        match event {
            MapEvent::Hover { layer, feature } => {
                let Some(hit) = self.visible_feature(layer, feature) else {
                    log::trace!("Ignoring hover on hidden or missing {layer} feature {feature}");
                    return MapResponse::default();
                };
                let name = hit.name().to_string();
                let tooltip = hit.tooltip(layer);
                self.hovered = Some((layer, feature));

                MapResponse {
                    action: Some(FilterAction::SetFocusedDistrict(Some(name))),
                    tooltip: Some(tooltip),
                    selected_district: None,
                }
            }
            MapEvent::Leave { layer } => {
                if !self.layer(layer).is_some_and(MapLayer::is_visible) {
                    return MapResponse::default();
                }
                self.hovered = None;

                MapResponse {
                    action: Some(FilterAction::SetFocusedDistrict(None)),
                    ..MapResponse::default()
                }
            }
            MapEvent::Click { layer, feature } => {
                let Some(hit) = self.visible_feature(layer, feature) else {
                    return MapResponse::default();
                };
                let Some(district) = hit.district_id() else {
                    log::debug!("Ignoring click on unnamed {layer} feature {feature}");
                    return MapResponse::default();
                };
                log::debug!("District selected on the {layer} layer: {district}");
                if let Some(callback) = self.on_district_selected.as_mut() {
                    callback(&district);
                }

                MapResponse {
                    selected_district: Some(district),
                    ..MapResponse::default()
                }
            }
        }
    }

    /// Tooltip of the feature under the pointer, if any.
    #[must_use]
    pub fn hovered_tooltip(&self) -> Option<Tooltip> {
        let (layer, feature) = self.hovered?;
        self.visible_feature(layer, feature)
            .map(|f| f.tooltip(layer))
    }

    /// Fits the viewport to the features matching `district`.
    ///
    /// Layers are tried in priority order (migration, peri-urban, digital
    /// risk) regardless of visibility; the first with matches wins. With
    /// no match, or for the all-districts sentinel, the viewport is left
    /// unchanged. Returns whether it moved.
    pub fn focus_district(&mut self, district: &str) -> bool {
        if district.is_empty() || district.eq_ignore_ascii_case(ALL_DISTRICTS) {
            return false;
        }

        for layer in Layer::all() {
            let Some(map_layer) = self.layer(*layer) else {
                continue;
            };
            let shapes = map_layer.matching_geometries(district);
            if shapes.is_empty() {
                continue;
            }
            if let Some(bounds) = GeometryCollection::from(shapes).bounding_rect() {
                self.viewport = Viewport::new(bounds);
                log::debug!("Viewport fitted to {district} from the {layer} layer");
                return true;
            }
        }

        log::debug!("No features match {district}, viewport unchanged");
        false
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> MapView {
        let active_layers = self
            .layers
            .iter()
            .filter(|l| l.visible)
            .map(MapLayer::layer)
            .collect::<Vec<_>>();

        if self.access_token.is_none() {
            return MapView::Placeholder {
                active_layers: active_layers.len(),
            };
        }

        MapView::Interactive {
            active_layers,
            viewport: self.viewport,
            hovered: self.hovered_tooltip(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn panel() -> MapPanel {
        let mut panel = MapPanel::new(Some("pk.test".to_string())).unwrap();
        panel.sync_visibility(&LayerState::new(true, true, true));
        panel
    }

    #[test]
    fn embedded_layers_parse() {
        let panel = panel();
        for layer in Layer::all() {
            let map_layer = panel.layer(*layer).unwrap();
            assert!(!map_layer.features().is_empty());
            assert!(map_layer.features().iter().all(|f| f.geometry().is_some()));
        }
    }

    #[test]
    fn hover_sets_focus_and_tooltip() {
        let mut panel = panel();
        let patna = panel.find_feature(Layer::Migration, "patna").unwrap();

        let response = panel.handle_event(MapEvent::Hover {
            layer: Layer::Migration,
            feature: patna,
        });

        assert_eq!(
            response.action,
            Some(FilterAction::SetFocusedDistrict(Some("Patna".to_string())))
        );
        let tooltip = response.tooltip.unwrap();
        assert_eq!(tooltip.metric, "Net migration: +12.4%");
        assert_eq!(tooltip.to_string(), "Patna\nNet migration: +12.4%");
    }

    #[test]
    fn tooltip_metrics_per_layer() {
        let panel = panel();
        let feature = |layer, district| {
            let idx = panel.find_feature(layer, district).unwrap();
            panel.layer(layer).unwrap().features()[idx].tooltip(layer)
        };

        assert_eq!(feature(Layer::PeriUrban, "patna").metric, "Growth index: 0.73");
        assert_eq!(feature(Layer::DigitalRisk, "patna").metric, "Risk: High (0.81)");
        assert_eq!(feature(Layer::DigitalRisk, "bhagalpur").metric, "Risk: Medium");
        assert_eq!(feature(Layer::Migration, "darbhanga").metric, "Net migration: --");
    }

    #[test]
    fn unnamed_feature_is_unknown() {
        let mut panel = panel();
        let unnamed = panel
            .layer(Layer::PeriUrban)
            .unwrap()
            .features()
            .iter()
            .position(|f| f.name() == UNKNOWN_FEATURE_NAME)
            .unwrap();

        let response = panel.handle_event(MapEvent::Hover {
            layer: Layer::PeriUrban,
            feature: unnamed,
        });

        assert_eq!(
            response.action,
            Some(FilterAction::SetFocusedDistrict(Some("Unknown".to_string())))
        );
    }

    #[test]
    fn click_on_unnamed_feature_selects_nothing() {
        let mut panel = panel();
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        panel.set_on_district_selected(move |d| sink.lock().unwrap().push(d.to_string()));
        let unnamed = panel
            .layer(Layer::PeriUrban)
            .unwrap()
            .features()
            .iter()
            .position(|f| f.name() == UNKNOWN_FEATURE_NAME)
            .unwrap();

        let response = panel.handle_event(MapEvent::Click {
            layer: Layer::PeriUrban,
            feature: unnamed,
        });

        assert!(response.is_empty());
        assert!(selected.lock().unwrap().is_empty());
    }

    #[test]
    fn leave_clears_focus() {
        let mut panel = panel();
        panel.handle_event(MapEvent::Hover {
            layer: Layer::Migration,
            feature: 0,
        });

        let response = panel.handle_event(MapEvent::Leave {
            layer: Layer::Migration,
        });

        assert_eq!(response.action, Some(FilterAction::SetFocusedDistrict(None)));
        assert!(panel.hovered_tooltip().is_none());
    }

    #[test]
    fn hidden_layers_ignore_events() {
        let mut panel = panel();
        panel.sync_visibility(&LayerState::new(true, false, false));

        let response = panel.handle_event(MapEvent::Hover {
            layer: Layer::DigitalRisk,
            feature: 0,
        });
        assert!(response.is_empty());

        let response = panel.handle_event(MapEvent::Leave {
            layer: Layer::PeriUrban,
        });
        assert!(response.is_empty());
    }

    #[test]
    fn hiding_hovered_layer_clears_focus() {
        let mut panel = panel();
        panel.handle_event(MapEvent::Hover {
            layer: Layer::DigitalRisk,
            feature: 0,
        });

        let action = panel.sync_visibility(&LayerState::new(true, false, false));

        assert_eq!(action, Some(FilterAction::SetFocusedDistrict(None)));
    }

    #[test]
    fn click_selects_without_touching_focus() {
        let mut panel = panel();
        let selected = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selected);
        panel.set_on_district_selected(move |d| sink.lock().unwrap().push(d.to_string()));
        let gaya = panel.find_feature(Layer::Migration, "Gaya").unwrap();

        let response = panel.handle_event(MapEvent::Click {
            layer: Layer::Migration,
            feature: gaya,
        });

        assert!(response.action.is_none());
        assert_eq!(response.selected_district.as_deref(), Some("gaya"));
        assert_eq!(*selected.lock().unwrap(), vec!["gaya".to_string()]);
    }

    #[test]
    fn point_lookup_uses_shapes() {
        let panel = panel();
        let idx = panel
            .feature_at(Layer::Migration, Point::new(85.14, 25.59))
            .unwrap();
        assert_eq!(panel.layer(Layer::Migration).unwrap().features()[idx].name(), "Patna");
        assert!(panel.feature_at(Layer::Migration, Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn focus_fits_first_matching_layer() {
        let mut panel = panel();

        assert!(panel.focus_district("PATNA"));
        let bounds = panel.viewport().bounds();
        assert!((bounds.min().x - 84.70).abs() < 1e-9);
        assert!((bounds.max().y - 25.75).abs() < 1e-9);
    }

    #[test]
    fn focus_falls_through_to_lower_priority_layers() {
        let mut panel = panel();

        assert!(panel.focus_district("kishanganj"));
        assert!((panel.viewport().center().x - 87.95).abs() < 1e-9);
    }

    #[test]
    fn unmatched_district_keeps_viewport() {
        let mut panel = panel();
        let before = panel.viewport();

        assert!(!panel.focus_district("siwan"));
        assert!(!panel.focus_district(ALL_DISTRICTS));
        assert_eq!(panel.viewport(), before);
    }

    #[test]
    fn missing_token_renders_placeholder() {
        let mut panel = MapPanel::new(None).unwrap();
        panel.sync_visibility(&LayerState::new(true, true, false));

        assert_eq!(panel.view(), MapView::Placeholder { active_layers: 2 });
    }

    #[test]
    fn rejects_non_collection_documents() {
        let err = MapLayer::parse(
            Layer::Migration,
            r#"{"type":"Point","coordinates":[85.1,25.6]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, MapDataError::NotFeatureCollection { .. }));
        assert!(MapLayer::parse(Layer::Migration, "not json").is_err());
    }
}
