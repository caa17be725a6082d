#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the Saarthi Net dashboard.
//!
//! `saarthi_net show` fetches the three district datasets once and prints
//! the dashboard. `saarthi_net serve` runs the demo backend. Without a
//! subcommand (or with `interactive`) a menu-driven session lets the user
//! change filters, toggle layers and poke at the map.
//!
//! Logging goes through [`saarthi_net_cli_utils::init_logger`] so the
//! loading spinner and log lines share the terminal cleanly.

mod interactive;

use clap::{Parser, Subcommand};
use dialoguer::Select;
use saarthi_net_api::{ApiConfig, HttpDashboardApi};
use saarthi_net_cli_utils::IndicatifSpinner;
use saarthi_net_dashboard::Dashboard;
use saarthi_net_dashboard::render::render_dashboard;
use saarthi_net_dashboard_models::{FilterDefaults, Layer, LayerState};
use saarthi_net_store::{FilterStore, InitialFilterState};

#[derive(Parser)]
#[command(name = "saarthi_net", about = "District insights for migration and digital inclusion")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the dashboard once and print it
    Show {
        /// District identifier (e.g. "patna"), or "all"
        #[arg(long)]
        district: Option<String>,

        /// Time window: 7d, 30d, 90d or 1y
        #[arg(long)]
        period: Option<String>,

        /// Comma-separated visible layers (migration, peri-urban, digital-risk)
        #[arg(long, value_delimiter = ',')]
        layers: Vec<String>,
    },
    /// Run the demo backend serving the dashboard endpoints
    Serve,
    /// Explore the dashboard from a menu
    Interactive,
}

/// Top-level choices when no subcommand is given.
enum Tool {
    Dashboard,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Dashboard, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Explore the dashboard",
            Self::Server => "Start the demo backend",
        }
    }
}

/// Parses `--layers` values into a layer set. Unknown names are skipped
/// with a warning; an empty list keeps the defaults.
fn parse_layers(values: &[String]) -> Option<LayerState> {
    if values.is_empty() {
        return None;
    }

    let mut layers = LayerState::new(false, false, false);
    for value in values {
        match value.trim().parse::<Layer>() {
            Ok(layer) => layers.set(layer, true),
            Err(_) => log::warn!("Ignoring unknown layer '{value}'"),
        }
    }
    Some(layers)
}

async fn show(
    multi: &saarthi_net_cli_utils::MultiProgress,
    district: Option<String>,
    period: Option<String>,
    layers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::from_env();
    let api = HttpDashboardApi::new(&config)?;
    let store = FilterStore::with_initial(
        FilterDefaults::default(),
        InitialFilterState {
            district,
            period,
            layers: parse_layers(layers),
            focused_district: None,
        },
    );
    let mut dashboard = Dashboard::new(store, &config)?;

    log::info!(
        "Fetching {} from {}",
        dashboard.store().request_key(),
        api.base_url()
    );
    let spinner = IndicatifSpinner::new(multi);
    dashboard.refresh(&api, spinner.as_ref()).await;
    let failed = dashboard.queries().error_count();
    if failed > 0 {
        log::warn!("{failed} dataset(s) fell back to placeholder data");
    }

    println!("{}", render_dashboard(&dashboard));

    Ok(())
}

async fn serve(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    // actix-web brings its own runtime, so it runs on a blocking thread
    // instead of nesting inside the tokio one.
    tokio::task::spawn_blocking(move || {
        let system = actix_web::rt::System::new();
        if interactive {
            system.block_on(saarthi_net_server::interactive::run())
        } else {
            system.block_on(saarthi_net_server::run_server(
                saarthi_net_server::ServerConfig::from_env(),
            ))
        }
    })
    .await??;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = saarthi_net_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Show {
            district,
            period,
            layers,
        }) => show(&multi, district, period, &layers).await?,
        Some(Commands::Serve) => serve(false).await?,
        Some(Commands::Interactive) => interactive::run(&multi, FilterDefaults::demo()).await?,
        None => {
            println!("Saarthi Net");
            println!();

            let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

            let idx = Select::new()
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact()?;

            match Tool::ALL[idx] {
                Tool::Dashboard => interactive::run(&multi, FilterDefaults::demo()).await?,
                Tool::Server => serve(true).await?,
            }
        }
    }

    Ok(())
}
