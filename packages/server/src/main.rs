#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the Saarthi Net demo backend.

#[actix_web::main]
async fn main() -> Result<(), saarthi_net_server::ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    saarthi_net_server::run_server(saarthi_net_server::ServerConfig::from_env()).await
}
