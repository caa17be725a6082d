//! Menu-driven dashboard session.
//!
//! Every pass fetches whatever the current filters need, prints the
//! dashboard, then asks for the next interaction. Map interactions are
//! picked from the feature list of a visible layer, standing in for the
//! pointer.

use dialoguer::Select;
use saarthi_net_api::{ApiConfig, HttpDashboardApi};
use saarthi_net_cli_utils::{IndicatifSpinner, MultiProgress};
use saarthi_net_dashboard::render::render_dashboard;
use saarthi_net_dashboard::{Dashboard, MapEvent, UiEvent};
use saarthi_net_dashboard_models::{DISTRICT_OPTIONS, FilterDefaults, Layer, Period};
use saarthi_net_store::FilterStore;

/// Actions available on each pass of the session.
enum DashboardAction {
    SelectDistrict,
    SelectPeriod,
    ToggleLayer,
    Hover,
    Leave,
    Click,
    ResetFilters,
    Reload,
    Quit,
}

impl DashboardAction {
    const ALL: &[Self] = &[
        Self::SelectDistrict,
        Self::SelectPeriod,
        Self::ToggleLayer,
        Self::Hover,
        Self::Leave,
        Self::Click,
        Self::ResetFilters,
        Self::Reload,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::SelectDistrict => "Change district",
            Self::SelectPeriod => "Change period",
            Self::ToggleLayer => "Toggle a map layer",
            Self::Hover => "Hover over a map feature",
            Self::Leave => "Move the pointer off the map",
            Self::Click => "Click a map feature",
            Self::ResetFilters => "Reset filters",
            Self::Reload => "Reload data",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the session until the user quits.
///
/// # Errors
///
/// Returns an error if the API client or the map layers cannot be built,
/// or if a prompt fails (e.g. no terminal attached).
pub async fn run(
    multi: &MultiProgress,
    defaults: FilterDefaults,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env();
    let api = HttpDashboardApi::new(&config)?;
    let spinner = IndicatifSpinner::new(multi);
    let mut dashboard = Dashboard::new(FilterStore::new(defaults), &config)?;

    log::info!("Reading district insights from {}", api.base_url());

    let labels: Vec<&str> = DashboardAction::ALL
        .iter()
        .map(DashboardAction::label)
        .collect();

    loop {
        dashboard.refresh(&api, spinner.as_ref()).await;
        println!("{}", render_dashboard(&dashboard));

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let event = match DashboardAction::ALL[idx] {
            DashboardAction::SelectDistrict => Some(UiEvent::SelectDistrict(prompt_district(
                &dashboard,
            )?)),
            DashboardAction::SelectPeriod => {
                Some(UiEvent::SelectPeriod(prompt_period(&dashboard)?))
            }
            DashboardAction::ToggleLayer => prompt_toggle(&dashboard)?.map(UiEvent::ToggleLayer),
            DashboardAction::Hover => prompt_feature(&dashboard, "Hover over which feature?")?
                .map(|(layer, feature)| UiEvent::Map(MapEvent::Hover { layer, feature })),
            DashboardAction::Leave => dashboard
                .store()
                .state()
                .layers
                .active_layers()
                .first()
                .map(|&layer| UiEvent::Map(MapEvent::Leave { layer })),
            DashboardAction::Click => prompt_feature(&dashboard, "Click which feature?")?
                .map(|(layer, feature)| UiEvent::Map(MapEvent::Click { layer, feature })),
            DashboardAction::ResetFilters => Some(UiEvent::ResetFilters),
            DashboardAction::Reload => {
                dashboard.reload(&api, spinner.as_ref()).await;
                None
            }
            DashboardAction::Quit => break,
        };

        if let Some(event) = event {
            let outcome = dashboard.apply(event);
            if let Some(tooltip) = outcome.tooltip {
                println!("{tooltip}");
                println!();
            }
            if outcome.change.is_empty() {
                log::debug!("Interaction left the filters unchanged");
            }
        }
    }

    Ok(())
}

fn prompt_district(dashboard: &Dashboard) -> Result<String, dialoguer::Error> {
    let current = &dashboard.store().state().district;
    let labels: Vec<&str> = DISTRICT_OPTIONS.iter().map(|o| o.label).collect();
    let default = DISTRICT_OPTIONS
        .iter()
        .position(|o| o.value.eq_ignore_ascii_case(current))
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("District")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(DISTRICT_OPTIONS[idx].value.to_string())
}

fn prompt_period(dashboard: &Dashboard) -> Result<String, dialoguer::Error> {
    let current = dashboard.store().state().period;
    let labels: Vec<&str> = Period::all().iter().map(|p| p.label()).collect();
    let default = Period::all().iter().position(|p| *p == current).unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Period")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(Period::all()[idx].to_string())
}

/// Asks which layer to toggle. Locked toggles are refused here, before
/// anything reaches the store.
fn prompt_toggle(dashboard: &Dashboard) -> Result<Option<Layer>, dialoguer::Error> {
    let filters = dashboard.filters();
    let labels: Vec<String> = filters
        .toggles
        .iter()
        .map(|t| {
            let checkbox = if t.checked { "[x]" } else { "[ ]" };
            let locked = if t.disabled { " (locked)" } else { "" };
            format!("{checkbox} {}{locked}", t.label)
        })
        .collect();

    let idx = Select::new()
        .with_prompt("Toggle which layer?")
        .items(&labels)
        .default(0)
        .interact()?;

    let toggle = &filters.toggles[idx];
    if toggle.disabled {
        println!("{} is the last visible layer and cannot be turned off.", toggle.label);
        println!();
        return Ok(None);
    }

    Ok(Some(toggle.layer))
}

/// Asks for a visible layer (when more than one is on), then one of its
/// features. Returns `None` when the layer has no features.
fn prompt_feature(
    dashboard: &Dashboard,
    prompt: &str,
) -> Result<Option<(Layer, usize)>, dialoguer::Error> {
    let visible = dashboard.store().state().layers.active_layers();
    let Some(&first) = visible.first() else {
        return Ok(None);
    };

    let layer = if visible.len() == 1 {
        first
    } else {
        let labels: Vec<&str> = visible.iter().map(|l| l.legend_label()).collect();
        let idx = Select::new()
            .with_prompt("Which layer?")
            .items(&labels)
            .default(0)
            .interact()?;
        visible[idx]
    };

    let Some(map_layer) = dashboard.map().layer(layer) else {
        return Ok(None);
    };
    let names: Vec<&str> = map_layer.features().iter().map(|f| f.name()).collect();
    if names.is_empty() {
        println!("The {} layer has no features.", layer.legend_label());
        return Ok(None);
    }

    let feature = Select::new()
        .with_prompt(prompt)
        .items(&names)
        .default(0)
        .interact()?;

    Ok(Some((layer, feature)))
}
