//! Interactive mode for the demo backend.
//!
//! Shows which districts the embedded fixtures cover, then prompts for
//! the listener address before starting the server.

use dialoguer::{Confirm, Input};

use crate::fixtures::DistrictFixtures;
use crate::{ServerConfig, ServerError};

/// Prompts for a [`ServerConfig`] (pre-filled from `BIND_ADDR`/`PORT`)
/// and runs the server with it.
///
/// # Errors
///
/// Returns [`ServerError`] if the fixtures fail to parse or the server
/// fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Saarthi Net Demo Backend");
    println!();

    let fixtures = DistrictFixtures::embedded()?;
    let districts = fixtures.district_ids().collect::<Vec<_>>();
    println!("Serving districts: {}", districts.join(", "));
    println!();

    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or(defaults.bind_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let config = ServerConfig { bind_addr, port };

    if !Confirm::new()
        .with_prompt(format!("Start server on {}:{}?", config.bind_addr, config.port))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    crate::run_server(config).await
}
