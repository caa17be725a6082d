#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web demo backend for the Saarthi Net dashboard.
//!
//! Serves `/api/migration`, `/api/peri-urban`, and `/api/digital-risk`
//! from district records embedded at compile time
//! (`fixtures/districts.toml`), plus `/api/health`. The responses follow
//! the same wire contract the dashboard's fetch layer expects from a real
//! backend.

pub mod fixtures;
mod handlers;
pub mod interactive;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};

use crate::fixtures::DistrictFixtures;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Errors starting the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The embedded fixture file does not match the record schema.
    #[error("Invalid district fixtures: {0}")]
    Fixtures(#[from] toml::de::Error),

    /// Binding or running the HTTP server failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// District records served by the data endpoints.
    pub fixtures: DistrictFixtures,
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/migration", web::get().to(handlers::migration))
            .route("/peri-urban", web::get().to(handlers::peri_urban))
            .route("/digital-risk", web::get().to(handlers::digital_risk)),
    );
}

/// Listener address for the demo server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `BIND_ADDR` and `PORT`, keeping the default for anything
    /// missing or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an explicit variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let bind_addr = lookup("BIND_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.bind_addr);
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT '{raw}', using {}", defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };

        Self { bind_addr, port }
    }
}

/// Starts the demo API server.
///
/// Loads the embedded fixtures and serves them on `config`. The caller
/// is responsible for initializing logging and providing the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the fixtures fail to parse, or if the HTTP
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    log::info!("Loading district fixtures...");
    let fixtures = DistrictFixtures::embedded()?;
    log::info!("Loaded {} district records", fixtures.len());

    let state = web::Data::new(AppState { fixtures });
    let ServerConfig { bind_addr, port } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_without_env() {
        assert_eq!(ServerConfig::from_lookup(|_| None), ServerConfig::default());
    }

    #[test]
    fn config_reads_env_and_ignores_bad_port() {
        let config = ServerConfig::from_lookup(|name| match name {
            "BIND_ADDR" => Some(" 0.0.0.0 ".to_string()),
            "PORT" => Some("http".to_string()),
            _ => None,
        });

        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
